use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use xz2::read::XzDecoder;
use zip::ZipArchive;
use ziggy_core::{ArchiveType, Result, ZiggyError};

use crate::layout::StoreLayout;

/// Extracts `archive_path` into the store as `<root>/<entry_name>`. The
/// archive and the staging directory are deleted whether or not extraction
/// succeeds.
///
/// Upstream archives wrap everything in one top-level directory; that
/// directory becomes the entry. An existing entry directory is never
/// overwritten.
pub fn unpack_into_store(
    layout: &StoreLayout,
    archive_path: &Path,
    archive: ArchiveType,
    entry_name: &str,
) -> Result<PathBuf> {
    let unpacked = unpack_staged(layout, archive_path, archive, entry_name);
    if let Err(err) = fs::remove_file(archive_path) {
        warn!(path = %archive_path.display(), error = %err, "failed to remove downloaded archive");
    }
    let dst = unpacked?;
    debug!(entry = entry_name, path = %dst.display(), "unpacked entry");
    Ok(dst)
}

fn unpack_staged(
    layout: &StoreLayout,
    archive_path: &Path,
    archive: ArchiveType,
    entry_name: &str,
) -> Result<PathBuf> {
    let dst = layout.entry_dir(entry_name);
    if dst.exists() {
        return Err(ZiggyError::io(
            format!("failed to install {entry_name}"),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dst.display()),
            ),
        ));
    }

    let staging = make_tmp_dir(layout, "unpack")?;
    let moved = extract_archive(archive_path, archive, &staging)
        .and_then(|()| payload_root(&staging))
        .and_then(|payload| promote(&payload, &dst));
    match fs::remove_dir_all(&staging) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %staging.display(), error = %err, "failed to remove staging dir"),
    }
    moved.map(|()| dst)
}

fn extract_archive(archive_path: &Path, archive: ArchiveType, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .map_err(|err| ZiggyError::io(format!("failed to create {}", dst.display()), err))?;
    let extract_failed = |message: String| ZiggyError::ExtractFailed {
        archive: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path)
        .map_err(|err| extract_failed(format!("failed to open archive: {err}")))?;
    match archive {
        ArchiveType::TarXz => extract_tar_xz(file, dst).map_err(|err| extract_failed(err.to_string())),
        ArchiveType::Zip => extract_zip(file, dst).map_err(extract_failed),
    }
}

fn extract_tar_xz(file: File, dst: &Path) -> io::Result<()> {
    let decoder = XzDecoder::new(BufReader::new(file));
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive.unpack(dst)
}

fn extract_zip(file: File, dst: &Path) -> std::result::Result<(), String> {
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|err| format!("invalid zip archive: {err}"))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| format!("failed to read zip entry {index}: {err}"))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(format!("zip entry escapes destination: {}", entry.name()));
        };
        let out_path = dst.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|err| format!("failed to create {}: {err}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
        }
        let mut out = File::create(&out_path)
            .map_err(|err| format!("failed to create {}: {err}", out_path.display()))?;
        io::copy(&mut entry, &mut out)
            .map_err(|err| format!("failed to write {}: {err}", out_path.display()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .map_err(|err| format!("failed to set mode on {}: {err}", out_path.display()))?;
        }
    }
    Ok(())
}

fn payload_root(staging: &Path) -> Result<PathBuf> {
    let read_err = |err| ZiggyError::io(format!("failed to read {}", staging.display()), err);
    let mut children = Vec::new();
    for entry in fs::read_dir(staging).map_err(read_err)? {
        children.push(entry.map_err(read_err)?.path());
    }

    match children.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Ok(staging.to_path_buf()),
    }
}

fn make_tmp_dir(layout: &StoreLayout, prefix: &str) -> Result<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let dir = layout
        .tmp_dir()
        .join(format!("{prefix}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir)
        .map_err(|err| ZiggyError::io(format!("failed creating tmp dir: {}", dir.display()), err))?;
    Ok(dir)
}

// Staging lives under the store root, so the move is a single rename and an
// entry directory appears complete or not at all.
fn promote(payload: &Path, dst: &Path) -> Result<()> {
    fs::rename(payload, dst).map_err(|err| {
        ZiggyError::io(
            format!("failed to move {} into the store", dst.display()),
            err,
        )
    })
}
