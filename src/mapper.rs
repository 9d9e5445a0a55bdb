// src/mapper.rs

use crate::error::{Error, Result};
use crate::language::LanguageTag;
use glob::{MatchOptions, Pattern};
use std::collections::btree_map::{BTreeMap, Entry};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A translation file mapped to its original, both relative to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPair {
    pub translation: PathBuf,
    pub language: LanguageTag,
    pub original: PathBuf,
}

/// `(translation path, language) -> original path`, iterated in key order.
/// The first entry written for a key is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping {
    map: BTreeMap<(PathBuf, LanguageTag), PathBuf>,
}

impl PathMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and keeps the existing entry when the key is taken
    pub fn insert(&mut self, translation: PathBuf, language: LanguageTag, original: PathBuf) -> bool {
        match self.map.entry((translation, language)) {
            Entry::Vacant(entry) => {
                debug!(
                    "Mapped translation file '{}' [{}] to original file '{}'",
                    entry.key().0.display(),
                    language,
                    original.display()
                );
                entry.insert(original);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Adds the entries of `other` whose keys aren't mapped yet
    pub fn merge(&mut self, other: PathMapping) {
        for ((translation, language), original) in other.map {
            self.insert(translation, language, original);
        }
    }

    pub fn get(&self, translation: &Path, language: LanguageTag) -> Option<&Path> {
        self.map
            .get(&(translation.to_path_buf(), language))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = TrackedPair> + '_ {
        self.map
            .iter()
            .map(|((translation, language), original)| TrackedPair {
                translation: translation.clone(),
                language: *language,
                original: original.clone(),
            })
    }
}

/// Maps translation files under `translation_root` to originals under
/// `original_root`.
///
/// Roots are relative to `workdir` (or absolute inside it) and globs are
/// matched against repository-relative paths. A file original maps 1:1. For a
/// directory, originals passing `filter_globs` and not `ignore_globs` are
/// mapped into the translation root, then translation files already on disk
/// passing `filter_globs` are mapped back into the original root.
pub fn build(
    workdir: &Path,
    translation_root: &Path,
    original_root: &Path,
    language: LanguageTag,
    filter_globs: &[String],
    ignore_globs: &[String],
) -> Result<PathMapping> {
    let translation_root = relative_to(workdir, translation_root)?;
    let original_root = relative_to(workdir, original_root)?;
    if translation_root == original_root {
        return Err(Error::SamePath(original_root));
    }

    let mut mapping = PathMapping::new();
    let abs_original = workdir.join(&original_root);
    if abs_original.is_file() {
        mapping.insert(translation_root, language, original_root);
    } else if abs_original.is_dir() {
        let filters = compile(filter_globs)?;
        let ignores = compile(ignore_globs)?;
        debug!(
            "Seeking files in {} filtered with {:?} and ignoring {:?}",
            original_root.display(),
            filter_globs,
            ignore_globs
        );

        for original in fetch_files(workdir, &original_root, &filters, &ignores)? {
            let translation = replace_root(&original, &original_root, &translation_root);
            mapping.insert(translation, language, original);
        }
        for translation in fetch_files(workdir, &translation_root, &filters, &[])? {
            let original = replace_root(&translation, &translation_root, &original_root);
            mapping.insert(translation, language, original);
        }
    } else {
        return Err(Error::NotFileOrDirectory(original_root));
    }

    Ok(mapping)
}

/// Repository-relative form of `path`, without `.` components
pub fn relative_to(workdir: &Path, path: &Path) -> Result<PathBuf> {
    let relative = if path.is_absolute() {
        path.strip_prefix(workdir)
            .map_err(|_| Error::OutsideWorkdir {
                path: path.to_path_buf(),
                workdir: workdir.to_path_buf(),
            })?
    } else {
        path
    };
    Ok(relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

fn compile(globs: &[String]) -> Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|glob| {
            Pattern::new(glob).map_err(|source| Error::Pattern {
                pattern: glob.clone(),
                source,
            })
        })
        .collect()
}

fn fetch_files(
    workdir: &Path,
    root: &Path,
    filters: &[Pattern],
    ignores: &[Pattern],
) -> Result<Vec<PathBuf>> {
    let abs_root = workdir.join(root);
    if !abs_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&abs_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = relative_to(workdir, entry.path())?;
        let any_match = |patterns: &[Pattern]| {
            patterns
                .iter()
                .any(|pattern| pattern.matches_path_with(&path, MATCH_OPTIONS))
        };
        if any_match(filters) && !any_match(ignores) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Dot files and dot directories, `.git` included
fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn replace_root(path: &Path, root: &Path, new_root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(suffix) if suffix.as_os_str().is_empty() => new_root.to_path_buf(),
        Ok(suffix) => new_root.join(suffix),
        Err(_) => path.to_path_buf(),
    }
}
