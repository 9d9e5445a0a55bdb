// src/model.rs

use crate::language::LanguageTag;
use chrono::{DateTime, Utc};
use git2::Oid;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Identifies a commit in the tracked history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisionId(Oid);

impl RevisionId {
    pub fn oid(&self) -> Oid {
        self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> String {
        let mut hex = self.0.to_string();
        hex.truncate(7);
        hex
    }
}

impl From<Oid> for RevisionId {
    fn from(oid: Oid) -> Self {
        RevisionId(oid)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RevisionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Handle on the bytes of a file at some revision. Two handles are equal iff
/// the contents are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentRef(Oid);

impl ContentRef {
    pub fn oid(&self) -> Oid {
        self.0
    }
}

impl From<Oid> for ContentRef {
    fn from(oid: Oid) -> Self {
        ContentRef(oid)
    }
}

/// How the last change touched a file that still has content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Copied,
    Renamed { from: PathBuf, to: PathBuf },
    Modified,
}

/// Where a path stands as of the revision it was resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    /// Nothing reachable from the revision ever touched the path
    Untracked,
    Deleted {
        revision: RevisionId,
        committed_at: DateTime<Utc>,
    },
    Present {
        revision: RevisionId,
        committed_at: DateTime<Utc>,
        kind: ChangeKind,
        content: ContentRef,
    },
}

/// One path as of one point in history.
///
/// `path` is the path the file lives at after its last change, which differs
/// from the requested path when that change renamed it away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionedFile {
    path: PathBuf,
    state: FileState,
}

impl RevisionedFile {
    pub fn untracked(path: impl Into<PathBuf>) -> Self {
        RevisionedFile {
            path: path.into(),
            state: FileState::Untracked,
        }
    }

    pub fn deleted(
        path: impl Into<PathBuf>,
        revision: RevisionId,
        committed_at: DateTime<Utc>,
    ) -> Self {
        RevisionedFile {
            path: path.into(),
            state: FileState::Deleted {
                revision,
                committed_at,
            },
        }
    }

    pub fn present(
        path: impl Into<PathBuf>,
        revision: RevisionId,
        committed_at: DateTime<Utc>,
        kind: ChangeKind,
        content: ContentRef,
    ) -> Self {
        RevisionedFile {
            path: path.into(),
            state: FileState::Present {
                revision,
                committed_at,
                kind,
                content,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists_in_history(&self) -> bool {
        !matches!(self.state, FileState::Untracked)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.state, FileState::Deleted { .. })
    }

    pub fn is_newly_created(&self) -> bool {
        matches!(self.kind(), Some(ChangeKind::Created))
    }

    pub fn is_copy(&self) -> bool {
        matches!(self.kind(), Some(ChangeKind::Copied))
    }

    pub fn is_rename(&self) -> bool {
        matches!(self.kind(), Some(ChangeKind::Renamed { .. }))
    }

    pub fn rename_source(&self) -> Option<&Path> {
        match self.kind() {
            Some(ChangeKind::Renamed { from, .. }) => Some(from),
            _ => None,
        }
    }

    pub fn rename_dest(&self) -> Option<&Path> {
        match self.kind() {
            Some(ChangeKind::Renamed { to, .. }) => Some(to),
            _ => None,
        }
    }

    pub fn last_change_revision(&self) -> Option<RevisionId> {
        match self.state {
            FileState::Untracked => None,
            FileState::Deleted { revision, .. } | FileState::Present { revision, .. } => {
                Some(revision)
            }
        }
    }

    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            FileState::Untracked => None,
            FileState::Deleted { committed_at, .. }
            | FileState::Present { committed_at, .. } => Some(committed_at),
        }
    }

    /// Set iff the file is present with content
    pub fn content(&self) -> Option<ContentRef> {
        match self.state {
            FileState::Present { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Last-change revision and content, for a file present with content
    pub fn revision_content(&self) -> Option<(RevisionId, ContentRef)> {
        match self.state {
            FileState::Present {
                revision, content, ..
            } => Some((revision, content)),
            _ => None,
        }
    }

    /// Marks a present file as reached from `source` through renames. Its
    /// revision and content stay those of its own last change.
    pub(crate) fn renamed_from(mut self, source: &Path) -> Self {
        if let FileState::Present { kind, .. } = &mut self.state {
            *kind = ChangeKind::Renamed {
                from: source.to_path_buf(),
                to: self.path.clone(),
            };
        }
        self
    }

    fn kind(&self) -> Option<&ChangeKind> {
        match &self.state {
            FileState::Present { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct FileModel<'a> {
    path: Cow<'a, str>,
    filename: Option<Cow<'a, str>>,
    directory: Option<Cow<'a, str>>,
    no_trace: bool,
    commit: Option<RevisionId>,
    committed_at: Option<DateTime<Utc>>,
    new_file: bool,
    copied_file: bool,
    renamed_file: bool,
    rename_from: Option<Cow<'a, str>>,
    rename_to: Option<Cow<'a, str>>,
    deleted_file: bool,
}

impl Serialize for RevisionedFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FileModel {
            path: self.path.to_string_lossy(),
            filename: self.path.file_name().map(|name| name.to_string_lossy()),
            directory: self.path.parent().map(|dir| dir.to_string_lossy()),
            no_trace: !self.exists_in_history(),
            commit: self.last_change_revision(),
            committed_at: self.committed_at(),
            new_file: self.is_newly_created(),
            copied_file: self.is_copy(),
            renamed_file: self.is_rename(),
            rename_from: self.rename_source().map(|p| p.to_string_lossy()),
            rename_to: self.rename_dest().map(|p| p.to_string_lossy()),
            deleted_file: self.is_deleted(),
        }
        .serialize(serializer)
    }
}

/// A revisioned file known to hold a translation in a registered language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationFile {
    #[serde(flatten)]
    file: RevisionedFile,
    #[serde(flatten)]
    language: LanguageTag,
}

impl TranslationFile {
    pub fn new(file: RevisionedFile, language: LanguageTag) -> Self {
        TranslationFile { file, language }
    }

    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn language_tag(&self) -> &'static str {
        self.language.tag()
    }

    pub fn language_name(&self) -> &'static str {
        self.language.name()
    }
}

impl Deref for TranslationFile {
    type Target = RevisionedFile;

    fn deref(&self) -> &RevisionedFile {
        &self.file
    }
}

/// Literal diff between two revisions of a file, with its marker counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    #[serde(rename = "diff")]
    literal_diff: String,
    additions: usize,
    deletions: usize,
    changes: usize,
}

impl DiffResult {
    /// Counts every line start marked `+` or `-` in the diff text. The text
    /// begins with a hunk header, which is never counted.
    pub fn from_literal(literal_diff: String) -> Self {
        let additions = literal_diff.matches("\n+").count();
        let deletions = literal_diff.matches("\n-").count();
        DiffResult {
            literal_diff,
            additions,
            deletions,
            changes: additions + deletions,
        }
    }

    pub fn literal_diff(&self) -> &str {
        &self.literal_diff
    }

    pub fn additions(&self) -> usize {
        self.additions
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    pub fn changes(&self) -> usize {
        self.changes
    }
}

/// Number of line terminators plus one, whatever the trailing byte is
pub fn count_lines(content: &[u8]) -> usize {
    content.iter().filter(|&&b| b == b'\n').count() + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    ToCreate,
    ToInitialize,
    ToUpdate,
    UpToDate,
    Orphan,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::ToCreate,
        Status::ToInitialize,
        Status::ToUpdate,
        Status::UpToDate,
        Status::Orphan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToCreate => "To Create",
            Status::ToInitialize => "To Initialize",
            Status::ToUpdate => "To Update",
            Status::UpToDate => "Up-To-Date",
            Status::Orphan => "Orphan",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Status-specific evidence carried by a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum TrackState {
    /// The translation is absent or was deleted
    #[serde(rename = "To Create")]
    ToCreate { missing_lines: usize },
    /// The translation exists but is flagged as not started
    #[serde(rename = "To Initialize")]
    ToInitialize { missing_lines: usize },
    /// The original changed since the revision the translation is based on
    #[serde(rename = "To Update")]
    ToUpdate {
        base_original: RevisionedFile,
        patch: DiffResult,
        requires_rename: bool,
    },
    #[serde(rename = "Up-To-Date")]
    UpToDate,
    /// The original is absent or was deleted while the translation exists
    #[serde(rename = "Orphan")]
    Orphan {
        original_was_deleted: bool,
        surplus_lines: usize,
    },
}

impl TrackState {
    pub fn status(&self) -> Status {
        match self {
            TrackState::ToCreate { .. } => Status::ToCreate,
            TrackState::ToInitialize { .. } => Status::ToInitialize,
            TrackState::ToUpdate { .. } => Status::ToUpdate,
            TrackState::UpToDate => Status::UpToDate,
            TrackState::Orphan { .. } => Status::Orphan,
        }
    }
}

/// Classification of one translation/original pair for one tracking pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationRecord {
    translation: TranslationFile,
    original: RevisionedFile,
    branch: String,
    #[serde(flatten)]
    state: TrackState,
}

impl TranslationRecord {
    pub fn new(
        translation: TranslationFile,
        original: RevisionedFile,
        branch: impl Into<String>,
        state: TrackState,
    ) -> Self {
        TranslationRecord {
            translation,
            original,
            branch: branch.into(),
            state,
        }
    }

    pub fn translation(&self) -> &TranslationFile {
        &self.translation
    }

    pub fn original(&self) -> &RevisionedFile {
        &self.original
    }

    /// Branch or revision name the pass was run against
    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }
}
