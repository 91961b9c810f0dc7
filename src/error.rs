use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum FlowError {
    /// A directory the operation relies on is missing and will not be created.
    Precondition { path: PathBuf, message: String },
    Permission { path: PathBuf, source: io::Error },
    Io {
        operation: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    SignatureCheck { path: PathBuf, source: io::Error },
    Cleanup { path: PathBuf, source: io::Error },
    Extraction {
        archive: PathBuf,
        destination: PathBuf,
        message: String,
    },
    Template { name: String, message: String },
    Config { path: PathBuf, message: String },
    UnknownAppType(String),
}

impl FlowError {
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn extraction(
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        message: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            archive: archive.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition { path, message } => {
                write!(f, "unable to import to {}: {}", path.display(), message)
            }
            Self::Permission { path, source } => {
                write!(f, "failed to set permissions on {}: {}", path.display(), source)
            }
            Self::Io {
                operation,
                path,
                source,
            } => write!(f, "failed to {} {}: {}", operation, path.display(), source),
            Self::SignatureCheck { path, source } => write!(
                f,
                "failed to check {} for the managed-file signature: {}",
                path.display(),
                source
            ),
            Self::Cleanup { path, source } => {
                write!(f, "failed to cleanup {} before import: {}", path.display(), source)
            }
            Self::Extraction {
                archive,
                destination,
                message,
            } => write!(
                f,
                "failed to extract provided archive {} into {}: {}",
                archive.display(),
                destination.display(),
                message
            ),
            Self::Template { name, message } => {
                write!(f, "failed to render template {}: {}", name, message)
            }
            Self::Config { path, message } => {
                write!(f, "invalid configuration in {}: {}", path.display(), message)
            }
            Self::UnknownAppType(app_type) => write!(f, "unknown project type '{}'", app_type),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Permission { source, .. }
            | Self::Io { source, .. }
            | Self::SignatureCheck { source, .. }
            | Self::Cleanup { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
