// src/classifier.rs

use crate::diff;
use crate::error::Result;
use crate::history::GitHistory;
use crate::mapper::TrackedPair;
use crate::marker;
use crate::model::*;
use crate::resolver;
use tracing::debug;

/// Decides the status of mapped pairs against one revision of the history.
///
/// Rules are checked in order and the first match wins:
/// 1. neither side has a trace: not classified
/// 2. original absent or deleted: Orphan
/// 3. translation absent or deleted: To Create
/// 4. translation flagged as not started: To Initialize
/// 5. original's last change is the translation's or one of its ancestors:
///    Up-To-Date
/// 6. otherwise: To Update
pub struct StatusClassifier<'a> {
    history: &'a GitHistory,
    revision: RevisionId,
    branch: &'a str,
}

impl<'a> StatusClassifier<'a> {
    pub fn new(history: &'a GitHistory, revision: RevisionId, branch: &'a str) -> Self {
        StatusClassifier {
            history,
            revision,
            branch,
        }
    }

    /// `Ok(None)` when neither file ever existed in the history.
    pub fn classify(&self, pair: &TrackedPair) -> Result<Option<TranslationRecord>> {
        let original = resolver::resolve(self.history, &pair.original, self.revision)?;
        let translation = TranslationFile::new(
            resolver::resolve(self.history, &pair.translation, self.revision)?,
            pair.language,
        );

        if !original.exists_in_history() && !translation.exists_in_history() {
            return Ok(None);
        }

        let state = self.decide(&translation, &original)?;
        debug!(
            "{} [{}] is {}",
            translation.path().display(),
            translation.language_tag(),
            state.status()
        );
        Ok(Some(TranslationRecord::new(
            translation,
            original,
            self.branch,
            state,
        )))
    }

    fn decide(&self, translation: &TranslationFile, original: &RevisionedFile) -> Result<TrackState> {
        let Some((original_revision, original_content)) = original.revision_content() else {
            let surplus_lines = match translation.content() {
                Some(content) => count_lines(&self.history.read(content)?),
                None => 0,
            };
            return Ok(TrackState::Orphan {
                original_was_deleted: original.is_deleted(),
                surplus_lines,
            });
        };

        let Some((translation_revision, translation_content)) = translation.revision_content()
        else {
            return Ok(TrackState::ToCreate {
                missing_lines: count_lines(&self.history.read(original_content)?),
            });
        };

        if marker::has_not_started_marker(&self.history.read(translation_content)?) {
            return Ok(TrackState::ToInitialize {
                missing_lines: count_lines(&self.history.read(original_content)?),
            });
        }

        if self
            .history
            .is_ancestor(original_revision, translation_revision)?
        {
            return Ok(TrackState::UpToDate);
        }

        self.to_update(translation, original, translation_revision)
    }

    fn to_update(
        &self,
        translation: &TranslationFile,
        original: &RevisionedFile,
        translation_revision: RevisionId,
    ) -> Result<TrackState> {
        // Look the original up under the name it had back then.
        let base_path = original.rename_source().unwrap_or(original.path());
        let base_original = resolver::resolve(self.history, base_path, translation_revision)?;

        // Same content again (e.g. a reverted edit): nothing to diff.
        let patch = if base_original.content().is_some()
            && base_original.content() == original.content()
        {
            DiffResult::default()
        } else {
            diff::diff(self.history, &base_original, original)?
        };

        let requires_rename = translation.path().file_name() != original.path().file_name();
        Ok(TrackState::ToUpdate {
            base_original,
            patch,
            requires_rename,
        })
    }
}
