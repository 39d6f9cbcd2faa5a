//! Error type shared by every fallible operation in the crate.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised while configuring policies or scanning values.
///
/// `Canceled` and `PatternTimeout` are outcomes of a scan, never a "no match":
/// callers that treat them as clean input will leak sensitive text.
#[derive(Debug, Error)]
pub enum Error {
    /// An option value outside its enumerated range.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },

    /// A word list or homophone file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A homophone context line without exactly two fields.
    #[error("malformed line {line} in {}: {content:?}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A guarded property was changed after pattern words were registered.
    #[error("cannot change `{property}` after pattern words have been registered")]
    InvalidState { property: &'static str },

    /// The caller's cancellation token fired before the scan completed.
    #[error("operation canceled")]
    Canceled,

    /// A pattern kept matching past its configured timeout.
    #[error("pattern `{pattern}` exceeded its match timeout of {timeout:?}")]
    PatternTimeout { pattern: String, timeout: Duration },

    /// A pattern word failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The traversal worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Reading a file failed for a reason other than it being missing.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`Error::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fails with [`Error::Canceled`] once `token` has fired.
pub(crate) fn ensure_active(token: Option<&CancellationToken>) -> Result<()> {
    match token {
        Some(token) if token.is_cancelled() => Err(Error::Canceled),
        _ => Ok(()),
    }
}

/// Reads a UTF-8 file, mapping a missing path to [`Error::NotFound`].
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = read_to_string(std::path::Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn canceled_is_distinct() {
        assert!(Error::Canceled.is_canceled());
        assert!(!Error::InvalidState { property: "ignore_case" }.is_canceled());
    }

    #[test]
    fn fired_token_fails_the_check() {
        let token = CancellationToken::new();
        assert!(ensure_active(None).is_ok());
        assert!(ensure_active(Some(&token)).is_ok());
        token.cancel();
        assert!(ensure_active(Some(&token)).unwrap_err().is_canceled());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = Error::InvalidState {
            property: "pattern_timeout",
        };
        assert_eq!(
            err.to_string(),
            "cannot change `pattern_timeout` after pattern words have been registered"
        );
    }
}
