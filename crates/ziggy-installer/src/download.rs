use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};
use ziggy_catalog::HttpFetcher;
use ziggy_core::{Result, ZiggyError};
use ziggy_resolver::ArtifactReference;

use crate::artifact::unpack_into_store;
use crate::layout::StoreLayout;

const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads a resolved artifact and materializes it as an entry directory
/// in the store, returning the entry name. Recording the entry is left to
/// the caller.
pub trait ArchiveInstaller {
    fn fetch_and_unpack(&self, artifact: &ArtifactReference) -> Result<String>;
}

pub trait DownloadObserver {
    fn started(&self, artifact: &str, total_bytes: Option<u64>);
    fn advanced(&self, bytes: u64);
    fn finished(&self);
}

pub struct HttpArchiveInstaller {
    fetcher: HttpFetcher,
    layout: StoreLayout,
    observer: Box<dyn DownloadObserver>,
}

impl HttpArchiveInstaller {
    pub fn new(fetcher: HttpFetcher, layout: StoreLayout, observer: Box<dyn DownloadObserver>) -> Self {
        Self {
            fetcher,
            layout,
            observer,
        }
    }

    fn download(&self, artifact: &ArtifactReference, part_path: &Path) -> Result<()> {
        let url = artifact.download_url.as_str();
        let download_failed = |message: String| ZiggyError::DownloadFailed {
            url: url.to_string(),
            message,
        };

        // The fetcher has already retried transport failures by this point.
        let mut response = self.fetcher.get(url).map_err(|err| match err {
            ZiggyError::Connection { message, .. } => download_failed(message),
            other => other,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(format!("HTTP {status}")));
        }

        let mut out = File::create(part_path).map_err(|err| {
            ZiggyError::io(format!("failed to create {}", part_path.display()), err)
        })?;
        self.observer
            .started(&artifact.artifact_name, response.content_length());

        let mut buffer = vec![0_u8; CHUNK_SIZE];
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|err| download_failed(format!("failed to read response body: {err}")))?;
            if read == 0 {
                break;
            }
            out.write_all(&buffer[..read]).map_err(|err| {
                ZiggyError::io(format!("failed to write {}", part_path.display()), err)
            })?;
            self.observer.advanced(read as u64);
        }
        out.flush().map_err(|err| {
            ZiggyError::io(format!("failed to write {}", part_path.display()), err)
        })?;
        self.observer.finished();
        Ok(())
    }
}

impl ArchiveInstaller for HttpArchiveInstaller {
    fn fetch_and_unpack(&self, artifact: &ArtifactReference) -> Result<String> {
        self.layout.ensure_base_dirs()?;
        let part_path = self.layout.partial_download_path(&artifact.artifact_name);
        let archive_path = self.layout.archive_path(&artifact.artifact_name);

        info!(url = %artifact.download_url, "downloading");
        if let Err(err) = self.download(artifact, &part_path) {
            let _ = fs::remove_file(&part_path);
            return Err(err);
        }
        fs::rename(&part_path, &archive_path).map_err(|err| {
            ZiggyError::io(
                format!(
                    "failed to move downloaded archive into store: {}",
                    archive_path.display()
                ),
                err,
            )
        })?;
        debug!(path = %archive_path.display(), "archive stored");

        unpack_into_store(
            &self.layout,
            &archive_path,
            artifact.archive,
            &artifact.entry_name,
        )?;
        Ok(artifact.entry_name.clone())
    }
}
