use crate::archive::{self, ArchiveKind};
use crate::error::{FlowError, Result};
use crate::fileutil::{copy_dir, file_exists, set_mode, DIR_MODE};
use crate::project::ProjectDescriptor;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Replaces the contents of an upload directory with the given source.
///
/// `source` may be a directory, a tar(.gz) archive or a zip archive; the
/// kind is sniffed from the file itself. `extract_path` selects a directory
/// inside an archive to use as the import root. An existing destination is
/// deleted first and is not restored if the import fails.
pub fn import_files(
    project: &ProjectDescriptor,
    upload_dir: &str,
    source: &Path,
    extract_path: &str,
) -> Result<()> {
    let dest = project.host_upload_dir_full_path(upload_dir);
    let parent = dest.parent().unwrap_or(&project.app_root).to_path_buf();

    if !file_exists(&parent) {
        return Err(FlowError::Precondition {
            path: dest,
            message: format!("parent directory {} does not exist", parent.display()),
        });
    }

    set_mode(&parent, DIR_MODE).map_err(|source| FlowError::Permission {
        path: parent.clone(),
        source,
    })?;

    if file_exists(&dest) {
        debug!(dest = %dest.display(), "removing existing upload directory");
        remove_existing(&dest).map_err(|source| FlowError::Cleanup {
            path: dest.clone(),
            source,
        })?;
    }

    match ArchiveKind::detect(source) {
        Some(kind) if kind.is_tar() => archive::untar(source, &dest, extract_path)?,
        Some(_) => archive::unzip(source, &dest, extract_path)?,
        None => copy_dir(source, &dest)?,
    }

    info!(source = %source.display(), dest = %dest.display(), "imported files");
    Ok(())
}

fn remove_existing(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
