use std::collections::BTreeSet;
use std::fs;
use std::io;

use tracing::{debug, info};
use ziggy_core::{EntryName, Result, VersionRequest, ZiggyError};

use crate::layout::{is_hidden, StoreLayout};
use crate::pointer::ActivePointer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub entry: String,
    pub was_active: bool,
}

/// The set of installed entries, read straight from disk on every call.
#[derive(Debug, Clone)]
pub struct InstallStore {
    layout: StoreLayout,
}

impl InstallStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn list(&self) -> Result<BTreeSet<String>> {
        let root = self.layout.root();
        let read_dir = match fs::read_dir(root) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(err) => {
                return Err(ZiggyError::io(
                    format!("failed to read store {}", root.display()),
                    err,
                ))
            }
        };

        let mut entries = BTreeSet::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|err| {
                ZiggyError::io(format!("failed to read store {}", root.display()), err)
            })?;
            let Some(name) = dir_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_hidden(&name) || !dir_entry.path().is_dir() {
                continue;
            }
            entries.insert(name);
        }
        Ok(entries)
    }

    /// First installed entry (in name order) whose version component
    /// satisfies `request`.
    pub fn has(&self, request: &VersionRequest) -> Result<Option<String>> {
        Ok(self.list()?.into_iter().find(|name| {
            EntryName::parse(name).is_some_and(|parsed| request.matches(&parsed.version))
        }))
    }

    pub fn add(&self, entry: &str) -> Result<()> {
        let path = self.layout.entry_dir(entry);
        if !path.is_dir() {
            return Err(ZiggyError::InstallVerificationFailed {
                entry: entry.to_string(),
                path,
            });
        }
        info!(entry, "recorded installed entry");
        Ok(())
    }

    /// Deletes `entry`, clearing `pointer` first when it targets that entry
    /// so the link never dangles into a removed directory.
    pub fn remove(&self, entry: &str, pointer: &ActivePointer) -> Result<RemoveOutcome> {
        let path = self.layout.entry_dir(entry);
        if is_hidden(entry) || !path.is_dir() {
            return Err(ZiggyError::NotInstalled {
                version: entry.to_string(),
            });
        }

        let was_active = pointer.linked_entry()?.as_deref() == Some(entry);
        if was_active {
            pointer.clear()?;
        }

        fs::remove_dir_all(&path).map_err(|err| {
            ZiggyError::io(format!("failed to remove {}", path.display()), err)
        })?;
        debug!(entry, was_active, "removed installed entry");
        Ok(RemoveOutcome {
            entry: entry.to_string(),
            was_active,
        })
    }
}
