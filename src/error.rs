//! Error types for logwall.
//!
//! Only `SourceUnavailable` and `Config` can stop startup. Filter and export
//! failures are recovered where they happen: the filter prompt stays open with
//! the message inline, and export failures land in the status line.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogwallError {
    /// A log file is missing or unreadable when its source is opened
    #[error("cannot follow {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// None of the requested or default log files could be opened
    #[error("no readable log files found")]
    NoSources,

    /// The filter pattern did not compile
    #[error("invalid filter: {0}")]
    FilterSyntax(#[from] regex::Error),

    /// Writing the bookmark file failed
    #[error("failed to write {path}: {source}")]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but could not be read or parsed
    #[error("invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl LogwallError {
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LogwallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_syntax_wraps_regex_error() {
        let err: LogwallError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, LogwallError::FilterSyntax(_)));
        assert!(err.to_string().starts_with("invalid filter:"));
    }

    #[test]
    fn export_io_names_the_path() {
        let err = LogwallError::ExportIo {
            path: PathBuf::from("/nope/bookmarks.txt"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope/bookmarks.txt"));
    }
}
