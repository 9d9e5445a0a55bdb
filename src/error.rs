// src/error.rs

use crate::model::RevisionId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("original and translation paths are the same: {}", .0.display())]
    SamePath(PathBuf),

    #[error("'{0}' is not a known language tag")]
    LanguageTag(String),

    #[error("original path is neither a file nor a directory: {}", .0.display())]
    NotFileOrDirectory(PathBuf),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("{} is outside of the repository working directory {}", .path.display(), .workdir.display())]
    OutsideWorkdir { path: PathBuf, workdir: PathBuf },

    #[error("no {0} given, neither on the command line nor in the configuration")]
    MissingSetting(&'static str),

    #[error("'{0}' is not formatted as TAG:PATH")]
    TargetFormat(String),

    #[error("repository has no working directory")]
    BareRepository,

    #[error("worker could not open the repository: {0}")]
    WorkerRepository(String),

    #[error("{} has no matching change in revision {revision}", .path.display())]
    HistoryInconsistency { path: PathBuf, revision: RevisionId },

    #[error("{} has no content to compare", .path.display())]
    MissingContent { path: PathBuf },

    #[error("no diff entry for {} between {base} and {head}", .path.display())]
    IncomparableRevisions {
        path: PathBuf,
        base: RevisionId,
        head: RevisionId,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors that only invalidate the pair being classified. Everything else
    /// aborts the whole tracking pass.
    pub fn is_pair_local(&self) -> bool {
        matches!(
            self,
            Error::HistoryInconsistency { .. }
                | Error::MissingContent { .. }
                | Error::IncomparableRevisions { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_local_errors() {
        let missing = Error::MissingContent {
            path: PathBuf::from("docs/a.md"),
        };
        assert!(missing.is_pair_local());

        let same = Error::SamePath(PathBuf::from("docs"));
        assert!(!same.is_pair_local());

        let git = Error::Git(git2::Error::from_str("corrupt object"));
        assert!(!git.is_pair_local());
    }
}
