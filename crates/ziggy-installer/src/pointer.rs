use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use ziggy_core::{Os, PlatformKey, Result, ZiggyError};

use crate::layout::StoreLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Missing,
    Symlink(PathBuf),
    /// Something that is not a symlink occupies the path.
    Other,
}

/// OS primitive behind the active pointer.
pub trait LinkProvider {
    fn link_state(&self, link: &Path) -> io::Result<LinkState>;
    fn create_link(&self, target: &Path, link: &Path) -> io::Result<()>;
    fn remove_link(&self, link: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PosixLinkProvider;

impl LinkProvider for PosixLinkProvider {
    fn link_state(&self, link: &Path) -> io::Result<LinkState> {
        read_link_state(link)
    }

    fn create_link(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }

        #[cfg(not(unix))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "POSIX symlinks are not available on this host",
            ))
        }
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        fs::remove_file(link)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsLinkProvider;

impl LinkProvider for WindowsLinkProvider {
    fn link_state(&self, link: &Path) -> io::Result<LinkState> {
        read_link_state(link)
    }

    fn create_link(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_file(target, link)
        }

        #[cfg(not(windows))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Windows file symlinks are not available on this host",
            ))
        }
    }

    fn remove_link(&self, link: &Path) -> io::Result<()> {
        fs::remove_file(link)
    }
}

fn read_link_state(link: &Path) -> io::Result<LinkState> {
    match fs::symlink_metadata(link) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::read_link(link).map(LinkState::Symlink)
        }
        Ok(_) => Ok(LinkState::Other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LinkState::Missing),
        Err(err) => Err(err),
    }
}

pub fn link_provider_for(os: Os) -> Box<dyn LinkProvider> {
    match os {
        Os::Windows => Box::new(WindowsLinkProvider),
        Os::Darwin | Os::Linux | Os::FreeBsd => Box::new(PosixLinkProvider),
    }
}

/// The single link naming the installed entry that answers to `zig`.
pub struct ActivePointer {
    link_path: PathBuf,
    layout: StoreLayout,
    executable: &'static str,
    provider: Box<dyn LinkProvider>,
}

impl ActivePointer {
    pub fn new(link_path: impl Into<PathBuf>, layout: StoreLayout, platform: PlatformKey) -> Self {
        Self::with_provider(
            link_path,
            layout,
            platform.executable_name(),
            link_provider_for(platform.os),
        )
    }

    pub fn with_provider(
        link_path: impl Into<PathBuf>,
        layout: StoreLayout,
        executable: &'static str,
        provider: Box<dyn LinkProvider>,
    ) -> Self {
        Self {
            link_path: absolute_or_given(link_path.into()),
            layout: StoreLayout::new(absolute_or_given(layout.root().to_path_buf())),
            executable,
            provider,
        }
    }

    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    pub fn target_for(&self, entry: &str) -> PathBuf {
        self.layout.entry_executable(entry, self.executable)
    }

    /// The entry the link names, whether or not its target still exists.
    pub fn linked_entry(&self) -> Result<Option<String>> {
        Ok(self
            .read_target()?
            .and_then(|target| self.entry_of(&target)))
    }

    /// The active entry; a missing or dangling link reads as no entry.
    pub fn current(&self) -> Result<Option<String>> {
        let Some(target) = self.read_target()? else {
            return Ok(None);
        };
        if !target.exists() {
            debug!(link = %self.link_path.display(), target = %target.display(), "active pointer is dangling");
            return Ok(None);
        }
        Ok(self.entry_of(&target))
    }

    /// Points the link at `entry`. An existing link is removed first; if
    /// creating the new one then fails the pointer is left unset.
    pub fn set(&self, entry: &str) -> Result<()> {
        let target = self.target_for(entry);
        if !target.is_file() {
            return Err(ZiggyError::InstallVerificationFailed {
                entry: entry.to_string(),
                path: target,
            });
        }
        let link_failed = |source| ZiggyError::LinkFailed {
            link: self.link_path.clone(),
            target: target.clone(),
            source,
        };

        if let Some(parent) = self.link_path.parent() {
            fs::create_dir_all(parent).map_err(link_failed)?;
        }
        match self.provider.link_state(&self.link_path).map_err(link_failed)? {
            LinkState::Missing => {}
            LinkState::Symlink(_) => {
                self.provider
                    .remove_link(&self.link_path)
                    .map_err(link_failed)?;
            }
            LinkState::Other => {
                return Err(link_failed(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "refusing to replace a file that is not a symlink",
                )));
            }
        }

        self.provider
            .create_link(&target, &self.link_path)
            .map_err(link_failed)?;
        debug!(link = %self.link_path.display(), target = %target.display(), "active pointer set");
        Ok(())
    }

    /// Removes the link. Returns whether one was removed.
    pub fn clear(&self) -> Result<bool> {
        let state = self
            .provider
            .link_state(&self.link_path)
            .map_err(|err| self.io_error("failed to inspect", err))?;
        match state {
            LinkState::Missing => Ok(false),
            LinkState::Symlink(_) => {
                self.provider
                    .remove_link(&self.link_path)
                    .map_err(|err| self.io_error("failed to remove", err))?;
                debug!(link = %self.link_path.display(), "active pointer cleared");
                Ok(true)
            }
            LinkState::Other => {
                warn!(link = %self.link_path.display(), "not clearing a path that is not a symlink");
                Ok(false)
            }
        }
    }

    fn read_target(&self) -> Result<Option<PathBuf>> {
        let state = self
            .provider
            .link_state(&self.link_path)
            .map_err(|err| self.io_error("failed to inspect", err))?;
        Ok(match state {
            LinkState::Symlink(target) if target.is_relative() => Some(
                self.link_path
                    .parent()
                    .map(|parent| parent.join(&target))
                    .unwrap_or(target),
            ),
            LinkState::Symlink(target) => Some(target),
            LinkState::Missing | LinkState::Other => None,
        })
    }

    // `<store>/<entry>/<executable>` is the only shape the pointer ever takes;
    // anything else was not created by ziggy.
    fn entry_of(&self, target: &Path) -> Option<String> {
        let entry_dir = target.parent()?;
        if entry_dir.parent()? != self.layout.root() {
            return None;
        }
        entry_dir.file_name()?.to_str().map(str::to_string)
    }

    fn io_error(&self, action: &str, err: io::Error) -> ZiggyError {
        ZiggyError::io(
            format!("{action} active pointer {}", self.link_path.display()),
            err,
        )
    }
}

// The link stores its target verbatim and the OS resolves a relative target
// against the link's own directory.
fn absolute_or_given(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
