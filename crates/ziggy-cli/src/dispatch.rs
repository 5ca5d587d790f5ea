use std::io;

use anyhow::{Context, Result};
use ziggy_catalog::{catalog_source_for, HttpFetcher};
use ziggy_core::{ConfigOverrides, ZiggyConfig};
use ziggy_installer::HttpArchiveInstaller;

use crate::command_flows::{
    run_destroy_command, run_install_command, run_list_installed_command,
    run_list_supported_command, run_primary_command, run_show_primary_command,
    run_upgrade_command, InstallOutcome, PrimaryOutcome, Session, UpgradeOutcome,
};
use crate::completion::write_completions_script;
use crate::render::{StatusLevel, TerminalRenderer};
use crate::{Cli, Commands, ListMode};

pub(crate) const EXIT_OK: u8 = 0;
pub(crate) const EXIT_WARN: u8 = 1;

pub(crate) fn run_cli(cli: Cli) -> Result<u8> {
    let renderer = TerminalRenderer::current();

    match cli.command {
        Commands::Version => {
            renderer.print_status(
                StatusLevel::Info,
                &format!("ziggy {}", env!("CARGO_PKG_VERSION")),
            );
            return Ok(EXIT_OK);
        }
        Commands::Completions { shell } => {
            write_completions_script(shell, &mut io::stdout())?;
            return Ok(EXIT_OK);
        }
        _ => {}
    }

    let overrides = ConfigOverrides {
        timeout_secs: cli.timeout,
        ..ConfigOverrides::from_env()
    };
    let config = ZiggyConfig::load(&overrides).context("failed to load configuration")?;
    let session = Session::new(&config);

    match cli.command {
        Commands::List {
            mode: ListMode::Installed,
        } => {
            let entries = run_list_installed_command(&session)?;
            renderer.print_lines(&entries);
            Ok(EXIT_OK)
        }
        Commands::List {
            mode: ListMode::Supported,
        } => {
            let catalog = catalog_source_for(&config)?;
            let versions = run_list_supported_command(&session, catalog.as_ref())?;
            renderer.print_lines(&versions);
            Ok(EXIT_OK)
        }
        Commands::Primary { version: None } => match run_show_primary_command(&session)? {
            Some(entry) => {
                renderer.print_status(StatusLevel::Info, &entry);
                Ok(EXIT_OK)
            }
            None => {
                renderer.print_status(StatusLevel::Warn, "Primary Compiler Not Set");
                Ok(EXIT_WARN)
            }
        },
        Commands::Primary {
            version: Some(version),
        } => match run_primary_command(&session, &version)? {
            PrimaryOutcome::Activated { entry } => {
                renderer.print_status(StatusLevel::Info, &format!("{entry} is now primary"));
                Ok(EXIT_OK)
            }
            PrimaryOutcome::AlreadyActive { entry } => {
                renderer.print_status(StatusLevel::Warn, &format!("{entry} is already primary"));
                Ok(EXIT_WARN)
            }
        },
        Commands::Install { version } => {
            let catalog = catalog_source_for(&config)?;
            let installer = build_installer(&config, &session, renderer)?;
            match run_install_command(&session, &version, catalog.as_ref(), &installer)? {
                InstallOutcome::Installed { entry } => {
                    renderer.print_status(StatusLevel::Info, &format!("Installed {entry}"));
                    Ok(EXIT_OK)
                }
                InstallOutcome::AlreadyInstalled { entry } => {
                    renderer.print_status(
                        StatusLevel::Warn,
                        &format!("{entry} is already installed"),
                    );
                    Ok(EXIT_WARN)
                }
            }
        }
        Commands::Upgrade => {
            let catalog = catalog_source_for(&config)?;
            let installer = build_installer(&config, &session, renderer)?;
            match run_upgrade_command(&session, catalog.as_ref(), &installer)? {
                UpgradeOutcome::UpToDate { entry } => {
                    renderer.print_status(
                        StatusLevel::Info,
                        &format!("{entry} is already the newest development build"),
                    );
                }
                UpgradeOutcome::Upgraded {
                    entry,
                    replaced,
                    activated,
                    deactivated,
                } => {
                    renderer.print_status(StatusLevel::Info, &format!("Upgraded to {entry}"));
                    for old in &replaced {
                        renderer.print_status(StatusLevel::Info, &format!("Removed {old}"));
                    }
                    if activated {
                        renderer
                            .print_status(StatusLevel::Info, &format!("{entry} is now primary"));
                    } else if deactivated {
                        renderer.print_status(
                            StatusLevel::Warn,
                            "Primary Compiler Not Set; run `ziggy primary master` to use the new build",
                        );
                    }
                }
            }
            Ok(EXIT_OK)
        }
        Commands::Destroy { version } => {
            let outcome = run_destroy_command(&session, &version)?;
            renderer.print_status(StatusLevel::Info, &format!("Destroyed {}", outcome.entry));
            if outcome.was_active {
                renderer.print_status(StatusLevel::Warn, "Primary Compiler Not Set");
            }
            Ok(EXIT_OK)
        }
        Commands::Version | Commands::Completions { .. } => Ok(EXIT_OK),
    }
}

fn build_installer(
    config: &ZiggyConfig,
    session: &Session<'_>,
    renderer: TerminalRenderer,
) -> Result<HttpArchiveInstaller> {
    let fetcher = HttpFetcher::from_config(config)?;
    Ok(HttpArchiveInstaller::new(
        fetcher,
        session.layout.clone(),
        Box::new(renderer.download_progress()),
    ))
}
