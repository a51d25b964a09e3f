use std::path::{Path, PathBuf};
use thiserror::Error;

use super::codec::CodecError;

/// Errors reported by [`FileConfig`](super::FileConfig) operations.
///
/// Whatever went wrong underneath (a codec, the file system, or a
/// caller-supplied hook), it surfaces as one of these three variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to access config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse { path: PathBuf, source: CodecError },
}

/// The kind of a [`ConfigError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Io,
    Parse,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::NotFound { .. } => ErrorKind::NotFound,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Parse { .. } => ErrorKind::Parse,
        }
    }

    /// The file the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::NotFound { path }
            | ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. } => path,
        }
    }

    pub(crate) fn from_read(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    pub(crate) fn parse(path: &Path, source: impl Into<CodecError>) -> Self {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let config_err = ConfigError::from_read(Path::new("a.toml"), err);

        assert_eq!(config_err.kind(), ErrorKind::NotFound);
        assert_eq!(config_err.path(), Path::new("a.toml"));
    }

    #[test]
    fn test_other_read_errors_map_to_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let config_err = ConfigError::from_read(Path::new("a.toml"), err);

        assert_eq!(config_err.kind(), ErrorKind::Io);
        assert!(config_err.to_string().contains("denied"));
    }

    #[test]
    fn test_parse_error_keeps_cause() {
        let config_err = ConfigError::parse(Path::new("a.json"), "unexpected token");

        assert_eq!(config_err.kind(), ErrorKind::Parse);
        let source = std::error::Error::source(&config_err).unwrap();
        assert_eq!(source.to_string(), "unexpected token");
    }
}
