// src/diff.rs

use crate::error::{Error, Result};
use crate::history::GitHistory;
use crate::model::{DiffResult, RevisionId, RevisionedFile};
use tracing::debug;

/// Diffs `head` against `base`, looking the entry up under `head`'s path in
/// the tree diff between their last-change revisions.
///
/// Both files must carry content. A missing diff entry means the two files
/// aren't comparable (usually a wrongly chosen base) and is an error, not an
/// empty diff.
pub fn diff(history: &GitHistory, base: &RevisionedFile, head: &RevisionedFile) -> Result<DiffResult> {
    let base_revision = content_revision(base)?;
    let head_revision = content_revision(head)?;

    let literal = history
        .patch_text(base_revision, head_revision, head.path())?
        .ok_or_else(|| Error::IncomparableRevisions {
            path: head.path().to_path_buf(),
            base: base_revision,
            head: head_revision,
        })?;

    let patch = DiffResult::from_literal(literal);
    debug!(
        "{} {}..{}: +{} -{}",
        head.path().display(),
        base_revision.short(),
        head_revision.short(),
        patch.additions(),
        patch.deletions()
    );
    Ok(patch)
}

fn content_revision(file: &RevisionedFile) -> Result<RevisionId> {
    file.revision_content()
        .map(|(revision, _)| revision)
        .ok_or_else(|| Error::MissingContent {
            path: file.path().to_path_buf(),
        })
}
