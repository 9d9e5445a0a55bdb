// src/tracker.rs

use crate::classifier::StatusClassifier;
use crate::error::{Error, Result};
use crate::history::GitHistory;
use crate::language::LanguageTag;
use crate::mapper::{self, PathMapping, TrackedPair};
use crate::model::{RevisionId, TranslationRecord};
use glob::Pattern;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};

/// A translation root and the language its files are written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTarget {
    pub language: LanguageTag,
    pub path: PathBuf,
}

impl TranslationTarget {
    pub fn new(tag: &str, path: impl Into<PathBuf>) -> Result<Self> {
        Ok(TranslationTarget {
            language: LanguageTag::parse(tag)?,
            path: path.into(),
        })
    }
}

/// Parses `TAG:PATH`, splitting on the first colon
impl FromStr for TranslationTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((tag, path)) if !tag.is_empty() && !path.is_empty() => {
                TranslationTarget::new(tag, path)
            }
            _ => Err(Error::TargetFormat(s.to_string())),
        }
    }
}

/// A pair whose classification failed without affecting the others
#[derive(Debug)]
pub struct PairFailure {
    pub pair: TrackedPair,
    pub error: Error,
}

/// Outcome of one tracking pass, in mapping order
#[derive(Debug)]
pub struct TrackingReport {
    pub revision: RevisionId,
    pub branch: String,
    pub records: Vec<TranslationRecord>,
    /// Pairs where neither file ever existed in the history
    pub skipped: Vec<TrackedPair>,
    pub failures: Vec<PairFailure>,
}

impl TrackingReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Outcome {
    Classified(TranslationRecord),
    Skipped,
    Failed(Error),
}

pub struct TranslationTracker {
    repo_path: PathBuf,
    history: GitHistory,
    mapping: PathMapping,
    parallel: bool,
}

impl TranslationTracker {
    pub fn open(repo_path: &Path) -> Result<Self> {
        let history = GitHistory::open(repo_path)?;
        history.workdir()?;
        Ok(TranslationTracker {
            repo_path: repo_path.to_path_buf(),
            history,
            mapping: PathMapping::new(),
            parallel: false,
        })
    }

    /// Classify pairs on the rayon pool, one repository handle per worker
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    pub fn history(&self) -> &GitHistory {
        &self.history
    }

    /// Registers the translations under `translation_root` written in `tag`.
    /// Pairs already registered keep their original.
    pub fn put(
        &mut self,
        translation_root: &Path,
        original_root: &Path,
        tag: &str,
        ignore_globs: &[String],
        filter_globs: &[String],
    ) -> Result<()> {
        let language = LanguageTag::parse(tag)?;
        self.put_language(translation_root, original_root, language, ignore_globs, filter_globs)
    }

    /// Registers every target against one original root. Each translation
    /// root is ignored on the original side so nested translation
    /// directories are never taken for originals.
    pub fn put_all(
        &mut self,
        original_root: &Path,
        targets: &[TranslationTarget],
        filter_globs: &[String],
        ignore_globs: &[String],
    ) -> Result<()> {
        let workdir = self.history.workdir()?.to_path_buf();
        let mut ignore = ignore_globs.to_vec();
        for target in targets {
            let root = mapper::relative_to(&workdir, &target.path)?;
            ignore.push(format!("{}/**/*", Pattern::escape(&root.to_string_lossy())));
        }

        for target in targets {
            self.put_language(&target.path, original_root, target.language, &ignore, filter_globs)?;
        }
        info!(
            "Registered {} translation files in {} languages",
            self.mapping.len(),
            targets.len()
        );
        Ok(())
    }

    fn put_language(
        &mut self,
        translation_root: &Path,
        original_root: &Path,
        language: LanguageTag,
        ignore_globs: &[String],
        filter_globs: &[String],
    ) -> Result<()> {
        let mapping = mapper::build(
            self.history.workdir()?,
            translation_root,
            original_root,
            language,
            filter_globs,
            ignore_globs,
        )?;
        self.mapping.merge(mapping);
        Ok(())
    }

    pub fn track(&self, revision: &str) -> Result<TrackingReport> {
        self.track_with_progress(revision, &ProgressBar::hidden())
    }

    /// Classifies every registered pair against `revision`.
    ///
    /// Pair-local errors land in the report's failures; anything else aborts
    /// the pass.
    pub fn track_with_progress(&self, revision: &str, bar: &ProgressBar) -> Result<TrackingReport> {
        let branch = self.history.revision_name(revision)?;
        let revision = self.history.resolve_revision(revision)?;
        let pairs: Vec<TrackedPair> = self.mapping.pairs().collect();
        info!(
            "Tracking {} translation files on {} ({})",
            pairs.len(),
            branch,
            revision.short()
        );

        bar.set_length(pairs.len() as u64);
        let outcomes: Vec<Result<Outcome>> = if self.parallel {
            let repo_path = self.repo_path.as_path();
            pairs
                .par_iter()
                .progress_with(bar.clone())
                .map_init(
                    || GitHistory::open(repo_path),
                    |history, pair| match history {
                        Ok(history) => classify_pair(history, revision, &branch, pair),
                        Err(err) => Err(Error::WorkerRepository(err.to_string())),
                    },
                )
                .collect()
        } else {
            pairs
                .iter()
                .map(|pair| {
                    let outcome = classify_pair(&self.history, revision, &branch, pair);
                    bar.inc(1);
                    outcome
                })
                .collect()
        };
        bar.finish_and_clear();

        let report = collect_report(revision, branch, pairs, outcomes)?;
        info!(
            "Classified {} translation files ({} skipped, {} failed)",
            report.records.len(),
            report.skipped.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

/// Sorts outcomes into the report, keeping mapping order. The first fatal
/// error aborts.
fn collect_report(
    revision: RevisionId,
    branch: String,
    pairs: Vec<TrackedPair>,
    outcomes: Vec<Result<Outcome>>,
) -> Result<TrackingReport> {
    let mut report = TrackingReport {
        revision,
        branch,
        records: Vec::new(),
        skipped: Vec::new(),
        failures: Vec::new(),
    };
    for (pair, outcome) in pairs.into_iter().zip(outcomes) {
        match outcome? {
            Outcome::Classified(record) => report.records.push(record),
            Outcome::Skipped => {
                warn!(
                    "Neither {} nor its original {} exist in the history of {}, skipping. Are they committed?",
                    pair.translation.display(),
                    pair.original.display(),
                    report.branch
                );
                report.skipped.push(pair);
            }
            Outcome::Failed(error @ Error::HistoryInconsistency { .. }) => {
                warn!(
                    "Skipping {} [{}]: {}",
                    pair.translation.display(),
                    pair.language,
                    error
                );
                report.failures.push(PairFailure { pair, error });
            }
            Outcome::Failed(error) => {
                error!(
                    "Could not classify {} [{}]: {}",
                    pair.translation.display(),
                    pair.language,
                    error
                );
                report.failures.push(PairFailure { pair, error });
            }
        }
    }
    Ok(report)
}

fn classify_pair(
    history: &GitHistory,
    revision: RevisionId,
    branch: &str,
    pair: &TrackedPair,
) -> Result<Outcome> {
    match StatusClassifier::new(history, revision, branch).classify(pair) {
        Ok(Some(record)) => Ok(Outcome::Classified(record)),
        Ok(None) => Ok(Outcome::Skipped),
        Err(err) if err.is_pair_local() => Ok(Outcome::Failed(err)),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Oid;

    fn pair(name: &str) -> TrackedPair {
        TrackedPair {
            translation: PathBuf::from(format!("fr/{}", name)),
            language: LanguageTag::parse("fr").unwrap(),
            original: PathBuf::from(format!("en/{}", name)),
        }
    }

    fn revision() -> RevisionId {
        RevisionId::from(Oid::from_bytes(&[7; 20]).unwrap())
    }

    #[test]
    fn test_inconsistent_pair_is_reported_as_failure() {
        let pairs = vec![pair("a.md"), pair("b.md"), pair("c.md")];
        let outcomes = vec![
            Ok(Outcome::Skipped),
            Ok(Outcome::Failed(Error::HistoryInconsistency {
                path: PathBuf::from("en/b.md"),
                revision: revision(),
            })),
            Ok(Outcome::Failed(Error::MissingContent {
                path: PathBuf::from("en/c.md"),
            })),
        ];

        let report = collect_report(revision(), "main".to_string(), pairs, outcomes).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.skipped, vec![pair("a.md")]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].pair, pair("b.md"));
        assert!(matches!(
            report.failures[0].error,
            Error::HistoryInconsistency { .. }
        ));
        assert_eq!(report.failures[1].pair, pair("c.md"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_fatal_outcome_aborts_report() {
        let pairs = vec![pair("a.md"), pair("b.md")];
        let outcomes = vec![
            Ok(Outcome::Skipped),
            Err(Error::Git(git2::Error::from_str("corrupt object"))),
        ];
        assert!(matches!(
            collect_report(revision(), "main".to_string(), pairs, outcomes),
            Err(Error::Git(_))
        ));
    }


    #[test]
    fn test_parse_target() {
        let target: TranslationTarget = "zh-TW:docs/zh-TW".parse().unwrap();
        assert_eq!(target.language.tag(), "zh-TW");
        assert_eq!(target.path, PathBuf::from("docs/zh-TW"));
    }

    #[test]
    fn test_parse_target_splits_on_first_colon() {
        let target: TranslationTarget = "fr:C:/docs/fr".parse().unwrap();
        assert_eq!(target.language.tag(), "fr");
        assert_eq!(target.path, PathBuf::from("C:/docs/fr"));
    }

    #[test]
    fn test_parse_target_errors() {
        assert!(matches!(
            "docs/fr".parse::<TranslationTarget>(),
            Err(Error::TargetFormat(_))
        ));
        assert!(matches!(
            ":docs/fr".parse::<TranslationTarget>(),
            Err(Error::TargetFormat(_))
        ));
        assert!(matches!(
            "xx-nope:docs".parse::<TranslationTarget>(),
            Err(Error::LanguageTag(_))
        ));
    }
}
