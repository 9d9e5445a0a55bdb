// src/resolver.rs

use crate::error::{Error, Result};
use crate::history::{ChangeRecord, GitHistory};
use crate::model::{ChangeKind, RevisionId, RevisionedFile};
use git2::Delta;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves `path` as of `from`: the revision that last changed it, what that
/// change was, and where the resulting content lives.
///
/// A path renamed away resolves to the latest state of its destination,
/// keeping the requested path as rename source.
///
/// A path with no trace in the history is a normal outcome and comes back as
/// an untracked file. Only store failures and a change record that doesn't
/// match the walk are errors.
pub fn resolve(history: &GitHistory, path: &Path, from: RevisionId) -> Result<RevisionedFile> {
    let Some(revision) = history.last_change(path, from)? else {
        debug!("{} has no trace up to {}", path.display(), from.short());
        return Ok(RevisionedFile::untracked(path));
    };
    let committed_at = history.committed_at(revision)?;

    let inconsistency = || Error::HistoryInconsistency {
        path: path.to_path_buf(),
        revision,
    };
    let record = history
        .change_record(revision, path)?
        .ok_or_else(inconsistency)?;

    if record.status == Delta::Deleted {
        debug!("{} deleted in {}", path.display(), revision.short());
        return Ok(RevisionedFile::deleted(path, revision, committed_at));
    }

    let (resolved_path, kind) = classify_change(path, &record).ok_or_else(inconsistency)?;
    if resolved_path != path {
        // Renamed away: the destination may have changed or moved again since.
        debug!(
            "{} renamed to {} in {}",
            path.display(),
            resolved_path.display(),
            revision.short()
        );
        return Ok(resolve(history, &resolved_path, from)?.renamed_from(path));
    }

    // Rename deltas don't always carry the new blob; read it from the tree.
    let blob = match record.blob {
        Some(blob) => Some(blob),
        None => history.blob_at(revision, &resolved_path)?,
    };
    let content = blob.ok_or_else(inconsistency)?;

    debug!(
        "{} last changed in {} ({:?})",
        resolved_path.display(),
        revision.short(),
        kind
    );
    Ok(RevisionedFile::present(
        resolved_path,
        revision,
        committed_at,
        kind,
        content.into(),
    ))
}

fn classify_change(path: &Path, record: &ChangeRecord) -> Option<(PathBuf, ChangeKind)> {
    match record.status {
        Delta::Added => Some((path.to_path_buf(), ChangeKind::Created)),
        Delta::Copied => Some((path.to_path_buf(), ChangeKind::Copied)),
        Delta::Renamed => {
            let from = record.old_path.clone()?;
            let to = record.new_path.clone()?;
            Some((to.clone(), ChangeKind::Renamed { from, to }))
        }
        _ => Some((path.to_path_buf(), ChangeKind::Modified)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: Delta, old: Option<&str>, new: Option<&str>) -> ChangeRecord {
        ChangeRecord {
            status,
            old_path: old.map(PathBuf::from),
            new_path: new.map(PathBuf::from),
            blob: None,
        }
    }

    #[test]
    fn test_rename_moves_path_to_destination() {
        let rename = record(Delta::Renamed, Some("en/a.md"), Some("en/b.md"));
        let (path, kind) = classify_change(Path::new("en/a.md"), &rename).unwrap();
        assert_eq!(path, PathBuf::from("en/b.md"));
        assert_eq!(
            kind,
            ChangeKind::Renamed {
                from: PathBuf::from("en/a.md"),
                to: PathBuf::from("en/b.md"),
            }
        );
    }

    #[test]
    fn test_rename_without_paths_is_rejected() {
        let rename = record(Delta::Renamed, None, Some("en/b.md"));
        assert!(classify_change(Path::new("en/b.md"), &rename).is_none());
    }

    #[test]
    fn test_other_changes_keep_requested_path() {
        let added = record(Delta::Added, None, Some("en/a.md"));
        assert_eq!(
            classify_change(Path::new("en/a.md"), &added),
            Some((PathBuf::from("en/a.md"), ChangeKind::Created))
        );

        let modified = record(Delta::Modified, Some("en/a.md"), Some("en/a.md"));
        assert_eq!(
            classify_change(Path::new("en/a.md"), &modified),
            Some((PathBuf::from("en/a.md"), ChangeKind::Modified))
        );

        let copied = record(Delta::Copied, Some("en/a.md"), Some("en/c.md"));
        assert_eq!(
            classify_change(Path::new("en/c.md"), &copied),
            Some((PathBuf::from("en/c.md"), ChangeKind::Copied))
        );
    }
}
