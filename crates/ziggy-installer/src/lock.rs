use std::fs::{self, File, OpenOptions};

use fs4::fs_std::FileExt;
use tracing::debug;
use ziggy_core::{Result, ZiggyError};

use crate::layout::StoreLayout;

/// Advisory exclusive lock over the store and the active pointer, held
/// until dropped.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    pub fn acquire(layout: &StoreLayout) -> Result<Self> {
        let lock_path = layout.lock_path();
        let lock_failed = |source| ZiggyError::LockFailed {
            path: lock_path.clone(),
            source,
        };

        fs::create_dir_all(layout.root()).map_err(lock_failed)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(lock_failed)?;
        file.lock_exclusive().map_err(lock_failed)?;
        debug!(path = %lock_path.display(), "acquired store lock");
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
