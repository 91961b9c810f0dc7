use crate::error::{FlowError, Result};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const DIR_MODE: u32 = 0o755;

/// True when anything, including a dangling symlink, occupies `path`.
pub fn file_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Reports whether any line of the file contains `needle`.
pub fn fgrep_string_in_file(path: &Path, needle: &str) -> io::Result<bool> {
    let reader = BufReader::new(fs::File::open(path)?);
    for line in reader.split(b'\n') {
        let line = line?;
        if String::from_utf8_lossy(&line).contains(needle) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Lexically normalizes a path, folding `.` and `..` without touching the disk.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_mode(path: &Path, _mode: u32) -> io::Result<()> {
    fs::metadata(path).map(|_| ())
}

/// Makes `dir` writable, creating it and any missing ancestors when absent.
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    match set_mode(dir, DIR_MODE) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "creating missing directory");
            fs::create_dir_all(dir).map_err(|e| FlowError::io("create directory", dir, e))?;
            set_mode(dir, DIR_MODE).map_err(|source| FlowError::Permission {
                path: dir.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(FlowError::Permission {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Recursively copies the contents of `src` into `dst`, creating `dst`.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).map_err(|e| FlowError::io("read", src, e))?;
    if !metadata.is_dir() {
        return Err(FlowError::io(
            "copy",
            src,
            io::Error::new(io::ErrorKind::InvalidInput, "source is not a directory"),
        ));
    }

    fs::create_dir_all(dst).map_err(|e| FlowError::io("create directory", dst, e))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            FlowError::io("walk", path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                FlowError::io(
                    "copy",
                    entry.path(),
                    io::Error::new(io::ErrorKind::InvalidInput, "entry outside source"),
                )
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| FlowError::io("create directory", &target, e))?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| FlowError::io("copy", entry.path(), e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src).map_err(|e| FlowError::io("read link", src, e))?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| FlowError::io("create symlink", dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| FlowError::io("copy", src, e))
}
