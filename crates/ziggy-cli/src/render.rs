use std::io::{self, IsTerminal};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use ziggy_installer::DownloadObserver;

const STATUS_MARKER: &str = ">>";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum StatusLevel {
    Info,
    Warn,
    Error,
}

pub(crate) fn current_output_style() -> OutputStyle {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    if no_color || !io::stdout().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub(crate) fn print_status(self, level: StatusLevel, message: &str) {
        let line = render_status_line(self.style, level, message);
        match level {
            StatusLevel::Error => eprintln!("{line}"),
            StatusLevel::Info | StatusLevel::Warn => println!("{line}"),
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    pub(crate) fn download_progress(self) -> TerminalDownloadProgress {
        let progress_bar = match self.style {
            OutputStyle::Plain => ProgressBar::hidden(),
            OutputStyle::Rich => {
                let progress_bar = ProgressBar::no_length();
                if let Ok(style) = ProgressStyle::with_template(
                    "{spinner:.cyan.bold} {msg} [{bar:24.cyan/blue}] {bytes:>10}/{total_bytes:10} {bytes_per_sec}",
                ) {
                    progress_bar.set_style(style.progress_chars("=>-"));
                }
                progress_bar
            }
        };
        TerminalDownloadProgress {
            style: self.style,
            progress_bar,
        }
    }
}

pub(crate) struct TerminalDownloadProgress {
    style: OutputStyle,
    progress_bar: ProgressBar,
}

impl DownloadObserver for TerminalDownloadProgress {
    fn started(&self, artifact: &str, total_bytes: Option<u64>) {
        if let Some(total) = total_bytes {
            self.progress_bar.set_length(total);
        }
        self.progress_bar.set_message(artifact.to_string());
        self.progress_bar
            .enable_steady_tick(Duration::from_millis(80));
    }

    fn advanced(&self, bytes: u64) {
        self.progress_bar.inc(bytes);
    }

    fn finished(&self) {
        self.progress_bar.finish_and_clear();
        if let Some(line) = render_download_line(
            self.style,
            self.progress_bar.position(),
            self.progress_bar.elapsed(),
        ) {
            println!("{line}");
        }
    }
}

pub(crate) fn render_status_line(style: OutputStyle, level: StatusLevel, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("{STATUS_MARKER} {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(level_style(level), STATUS_MARKER)),
    }
}

pub(crate) fn render_download_line(
    style: OutputStyle,
    bytes: u64,
    elapsed: Duration,
) -> Option<String> {
    if style == OutputStyle::Plain {
        return None;
    }
    Some(format!(
        "{} downloaded {} in {}",
        colorize(level_style(StatusLevel::Info), STATUS_MARKER),
        HumanBytes(bytes),
        format_elapsed(elapsed)
    ))
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

fn level_style(level: StatusLevel) -> Style {
    let color = match level {
        StatusLevel::Info => AnsiColor::Green,
        StatusLevel::Warn => AnsiColor::Yellow,
        StatusLevel::Error => AnsiColor::Red,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
