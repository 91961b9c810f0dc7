//! Tar and zip extraction for files imports.
//!
//! Both extractors accept an optional `sub_path`: only entries below that
//! directory inside the archive are extracted, re-rooted at the destination.

use crate::error::{FlowError, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [b'P', b'K', 0x03, 0x04];
const ZIP_EMPTY_MAGIC: [u8; 4] = [b'P', b'K', 0x05, 0x06];
const USTAR_OFFSET: usize = 257;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Tar,
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Sniffs the file header first and only falls back to the file name
    /// when the content is inconclusive. Directories are never archives.
    pub fn detect(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        Self::from_header(path).or_else(|| Self::from_extension(path))
    }

    fn from_header(path: &Path) -> Option<Self> {
        let mut header = Vec::with_capacity(512);
        File::open(path)
            .ok()?
            .take(512)
            .read_to_end(&mut header)
            .ok()?;

        if header.starts_with(&ZIP_MAGIC) || header.starts_with(&ZIP_EMPTY_MAGIC) {
            Some(Self::Zip)
        } else if header.starts_with(&GZIP_MAGIC) {
            Some(Self::TarGz)
        } else if header.len() >= USTAR_OFFSET + 5
            && &header[USTAR_OFFSET..USTAR_OFFSET + 5] == b"ustar"
        {
            Some(Self::Tar)
        } else {
            None
        }
    }

    fn from_extension(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    pub fn is_tar(self) -> bool {
        matches!(self, Self::Tar | Self::TarGz)
    }
}

pub fn untar(src: &Path, dest: &Path, sub_path: &str) -> Result<()> {
    let file = File::open(src).map_err(|e| FlowError::io("open", src, e))?;
    let reader: Box<dyn Read> = match ArchiveKind::detect(src) {
        Some(ArchiveKind::TarGz) => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    };

    let prefix = normalize_sub_path(sub_path);
    let fail = |e: io::Error| FlowError::extraction(src, dest, e.to_string());

    fs::create_dir_all(dest).map_err(|e| FlowError::io("create directory", dest, e))?;

    let mut archive = tar::Archive::new(reader);
    let mut matched = prefix.is_none();
    for entry in archive.entries().map_err(fail)? {
        let mut entry = entry.map_err(fail)?;
        let entry_path = entry.path().map_err(fail)?.into_owned();

        let Some(relative) = relative_target(&entry_path, prefix.as_deref())
            .map_err(|message| FlowError::extraction(src, dest, message))?
        else {
            continue;
        };
        matched = true;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            debug!(entry = %entry_path.display(), "skipping link entry");
            continue;
        }

        let target = dest.join(&relative);
        ensure_no_link_ancestor(dest, &relative)
            .map_err(|message| FlowError::extraction(src, dest, message))?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FlowError::io("create directory", parent, e))?;
        }
        debug!(entry = %entry_path.display(), target = %target.display(), "extracting tar entry");
        entry.unpack(&target).map_err(fail)?;
    }

    ensure_matched(matched, src, dest, sub_path)
}

pub fn unzip(src: &Path, dest: &Path, sub_path: &str) -> Result<()> {
    let file = File::open(src).map_err(|e| FlowError::io("open", src, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| FlowError::extraction(src, dest, e.to_string()))?;

    let prefix = normalize_sub_path(sub_path);
    fs::create_dir_all(dest).map_err(|e| FlowError::io("create directory", dest, e))?;

    let mut matched = prefix.is_none();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| FlowError::extraction(src, dest, e.to_string()))?;
        let entry_path = PathBuf::from(entry.name());

        let Some(relative) = relative_target(&entry_path, prefix.as_deref())
            .map_err(|message| FlowError::extraction(src, dest, message))?
        else {
            continue;
        };
        matched = true;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(&relative);
        ensure_no_link_ancestor(dest, &relative)
            .map_err(|message| FlowError::extraction(src, dest, message))?;
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| FlowError::io("create directory", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FlowError::io("create directory", parent, e))?;
        }
        debug!(entry = %entry_path.display(), target = %target.display(), "extracting zip entry");
        let mut out = File::create(&target).map_err(|e| FlowError::io("create", &target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| FlowError::extraction(src, dest, e.to_string()))?;

        if let Some(mode) = entry.unix_mode() {
            // owner must keep read/write access to imported files
            crate::fileutil::set_mode(&target, (mode & 0o777) | 0o600).map_err(|source| {
                FlowError::Permission {
                    path: target.clone(),
                    source,
                }
            })?;
        }
    }

    ensure_matched(matched, src, dest, sub_path)
}

fn normalize_sub_path(sub_path: &str) -> Option<PathBuf> {
    let trimmed = sub_path.trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        None
    } else {
        Some(crate::fileutil::clean_path(Path::new(trimmed)))
    }
}

/// Maps an archive entry to its path relative to the destination.
///
/// `Ok(None)` means the entry lies outside the requested sub path.
fn relative_target(
    entry: &Path,
    prefix: Option<&Path>,
) -> std::result::Result<Option<PathBuf>, String> {
    let mut normalized = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            _ => return Err(format!("unsafe entry path {}", entry.display())),
        }
    }

    match prefix {
        None => Ok(Some(normalized)),
        Some(prefix) => Ok(normalized.strip_prefix(prefix).ok().map(Path::to_path_buf)),
    }
}

/// Rejects targets whose path inside `dest` passes through a symlink, so
/// writes cannot be redirected outside the destination.
fn ensure_no_link_ancestor(dest: &Path, relative: &Path) -> std::result::Result<(), String> {
    let mut current = dest.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(format!("entry path {} passes through a symlink", relative.display()));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    Ok(())
}

fn ensure_matched(matched: bool, src: &Path, dest: &Path, sub_path: &str) -> Result<()> {
    if matched {
        Ok(())
    } else {
        Err(FlowError::extraction(
            src,
            dest,
            format!("extraction path {} not found in archive", sub_path),
        ))
    }
}
