use std::fs;
use std::path::{Path, PathBuf};

use ziggy_core::{Result, ZiggyError};

const TMP_DIR_NAME: &str = ".tmp";
const LOCK_FILE_NAME: &str = ".ziggy.lock";

/// Paths inside the store root. Installed entries are the non-hidden
/// directories directly under the root; everything ziggy keeps for itself
/// starts with a dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_dir(&self, entry: &str) -> PathBuf {
        self.root.join(entry)
    }

    pub fn entry_executable(&self, entry: &str, executable: &str) -> PathBuf {
        self.entry_dir(entry).join(executable)
    }

    pub fn archive_path(&self, artifact_name: &str) -> PathBuf {
        self.root.join(artifact_name)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR_NAME)
    }

    pub fn partial_download_path(&self, artifact_name: &str) -> PathBuf {
        self.tmp_dir().join(format!("{artifact_name}.part"))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.tmp_dir()] {
            fs::create_dir_all(&dir).map_err(|err| {
                ZiggyError::io(format!("failed to create {}", dir.display()), err)
            })?;
        }
        Ok(())
    }
}

pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
