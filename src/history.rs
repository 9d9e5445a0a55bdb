// src/history.rs

use crate::error::{Error, Result};
use crate::model::{ContentRef, RevisionId};
use chrono::{DateTime, Utc};
use git2::{
    Commit, Delta, Diff, DiffDelta, DiffFindOptions, DiffOptions, Oid, Patch, Repository, Tree,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a revision did to a path, compared against its first parent
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub status: Delta,
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    /// Blob of the new side; `None` when the diff left it unset
    pub blob: Option<Oid>,
}

/// Read-only access to the git repository holding originals and translations
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    pub fn open(repo_path: &Path) -> Result<Self> {
        let repo = Repository::open(repo_path)?;
        debug!("Opened repository at {}", repo_path.display());
        Ok(GitHistory { repo })
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(Error::BareRepository)
    }

    /// Peels a revision spec (`HEAD`, a branch, a commit id...) to its commit
    pub fn resolve_revision(&self, spec: &str) -> Result<RevisionId> {
        let commit = self.repo.revparse_single(spec)?.peel_to_commit()?;
        Ok(commit.id().into())
    }

    /// Branch shorthand when `spec` names a branch (or is `HEAD` on a
    /// branch), `spec` unchanged otherwise
    pub fn revision_name(&self, spec: &str) -> Result<String> {
        let reference = if spec == "HEAD" {
            Some(self.repo.head()?)
        } else {
            self.repo.revparse_ext(spec)?.1
        };
        let name = reference
            .filter(|r| r.is_branch())
            .and_then(|r| r.shorthand().map(String::from))
            .unwrap_or_else(|| spec.to_string());
        Ok(name)
    }

    pub fn committed_at(&self, revision: RevisionId) -> Result<DateTime<Utc>> {
        let commit = self.repo.find_commit(revision.oid())?;
        Ok(DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default())
    }

    /// Nearest ancestor of `from` (inclusive) that altered `path`.
    ///
    /// Walks like `git log -1 -- path`: a commit whose blob for `path` is
    /// identical in one of its parents is skipped and the walk follows that
    /// parent.
    pub fn last_change(&self, path: &Path, from: RevisionId) -> Result<Option<RevisionId>> {
        let mut commit = self.repo.find_commit(from.oid())?;
        loop {
            let entry = entry_of(&commit.tree()?, path);
            if commit.parent_count() == 0 {
                return Ok(entry.map(|_| commit.id().into()));
            }

            let mut same_parent: Option<Commit> = None;
            for parent in commit.parents() {
                if entry_of(&parent.tree()?, path) == entry {
                    same_parent = Some(parent);
                    break;
                }
            }

            match same_parent {
                Some(parent) => commit = parent,
                None => return Ok(Some(commit.id().into())),
            }
        }
    }

    /// Change made to `path` by `revision` relative to its first parent, or to
    /// the empty tree for a root commit.
    pub fn change_record(&self, revision: RevisionId, path: &Path) -> Result<Option<ChangeRecord>> {
        let commit = self.repo.find_commit(revision.oid())?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let current_tree = commit.tree()?;
        let diff = self.tree_diff(parent_tree.as_ref(), &current_tree, true)?;

        let mut renamed_away = None;
        for delta in diff.deltas() {
            let old_path = delta.old_file().path();
            let new_path = delta.new_file().path();
            match delta.status() {
                Delta::Deleted | Delta::Renamed if old_path == Some(path) => {
                    if renamed_away.is_none() {
                        renamed_away = Some(to_record(&delta));
                    }
                }
                Delta::Deleted => {}
                _ if new_path == Some(path) => return Ok(Some(to_record(&delta))),
                _ => {}
            }
        }
        Ok(renamed_away)
    }

    /// Blob of `path` in the tree of `revision`
    pub fn blob_at(&self, revision: RevisionId, path: &Path) -> Result<Option<Oid>> {
        let tree = self.repo.find_commit(revision.oid())?.tree()?;
        Ok(entry_of(&tree, path))
    }

    pub fn read(&self, content: ContentRef) -> Result<Vec<u8>> {
        let blob = self.repo.find_blob(content.oid())?;
        Ok(blob.content().to_vec())
    }

    /// True if `ancestor` is `descendant` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: RevisionId, descendant: RevisionId) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self
            .repo
            .graph_descendant_of(descendant.oid(), ancestor.oid())?)
    }

    /// Literal diff of `path` between two revisions: hunk headers and hunk
    /// lines only. `None` when the diff has no entry leading to `path`.
    pub fn patch_text(
        &self,
        base: RevisionId,
        head: RevisionId,
        path: &Path,
    ) -> Result<Option<String>> {
        let base_tree = self.repo.find_commit(base.oid())?.tree()?;
        let head_tree = self.repo.find_commit(head.oid())?.tree()?;
        let diff = self.tree_diff(Some(&base_tree), &head_tree, false)?;

        let index = diff.deltas().position(|delta| {
            delta.status() != Delta::Deleted && delta.new_file().path() == Some(path)
        });
        let Some(index) = index else {
            return Ok(None);
        };
        let Some(mut patch) = Patch::from_diff(&diff, index)? else {
            return Ok(None);
        };

        let mut text = String::new();
        patch.print(&mut |_delta, _hunk, line| {
            let content = String::from_utf8_lossy(line.content());
            match line.origin() {
                '+' | '-' | ' ' => {
                    text.push(line.origin());
                    text.push_str(&content);
                }
                // Hunk headers and end-of-file newline notices
                'H' | '=' | '>' | '<' => text.push_str(&content),
                _ => {}
            }
            true
        })?;
        Ok(Some(text))
    }

    fn tree_diff(&self, old: Option<&Tree>, new: &Tree, copies: bool) -> Result<Diff<'_>> {
        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_filemode(true);

        let mut diff = self
            .repo
            .diff_tree_to_tree(old, Some(new), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        find_opts.copies(copies);
        diff.find_similar(Some(&mut find_opts))?;
        Ok(diff)
    }
}

fn entry_of(tree: &Tree, path: &Path) -> Option<Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

fn to_record(delta: &DiffDelta<'_>) -> ChangeRecord {
    let blob = Some(delta.new_file().id()).filter(|id| !id.is_zero());
    ChangeRecord {
        status: delta.status(),
        old_path: delta.old_file().path().map(Path::to_path_buf),
        new_path: delta.new_file().path().map(Path::to_path_buf),
        blob,
    }
}
