// src/cli.rs

use clap::Parser;
use std::path::PathBuf;
use translation_tracker::config::TrackerConfig;
use translation_tracker::tracker::TranslationTarget;

/// Reports which translations are missing, not started, outdated, up to date
/// or orphaned, judging from the git history.
///
/// Paths are relative to the repository root.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Original file or directory
    pub original: Option<PathBuf>,

    /// Translation roots, e.g. `fr:docs/fr`
    #[arg(value_name = "TAG:PATH")]
    pub targets: Vec<TranslationTarget>,

    /// Path to the git repository [default: .]
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// Configuration file [default: ./Translations.toml when present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Revision to track against [default: HEAD]
    #[arg(long)]
    pub revision: Option<String>,

    /// Only map files matching this glob (repeatable) [default: **/*]
    #[arg(long)]
    pub filter: Vec<String>,

    /// Never treat files matching this glob as originals (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Only output translations whose file name matches this glob (repeatable)
    #[arg(long)]
    pub select: Vec<String>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Classify files on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Tracing filter, overrides TRACKER_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Command-line values override the configuration file
    pub fn apply(&self, mut config: TrackerConfig) -> TrackerConfig {
        if let Some(repo) = &self.repo {
            config.repository = repo.clone();
        }
        if let Some(revision) = &self.revision {
            config.revision = revision.clone();
        }
        if let Some(original) = &self.original {
            config.original = Some(original.clone());
        }
        if !self.filter.is_empty() {
            config.filter = self.filter.clone();
        }
        if !self.ignore.is_empty() {
            config.ignore = self.ignore.clone();
        }
        config.parallel |= self.parallel;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_positional_targets() {
        let args =
            Args::try_parse_from(["translation-tracker", "docs", "fr:docs/fr", "zh-TW:docs/zh-TW"])
                .unwrap();
        assert_eq!(args.original, Some(PathBuf::from("docs")));
        assert_eq!(args.targets.len(), 2);
        assert_eq!(args.targets[1].language.tag(), "zh-TW");
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert!(Args::try_parse_from(["translation-tracker", "docs", "xx-YY:docs/xx"]).is_err());
        assert!(Args::try_parse_from(["translation-tracker", "docs", "docs/fr"]).is_err());
    }

    #[test]
    fn test_arguments_override_config() {
        let args = Args::try_parse_from([
            "translation-tracker",
            "--revision",
            "v1.0",
            "--filter",
            "**/*.md",
            "--parallel",
        ])
        .unwrap();
        let config = args.apply(TrackerConfig {
            original: Some(PathBuf::from("docs")),
            ignore: vec!["docs/old/**/*".to_string()],
            ..TrackerConfig::default()
        });

        assert_eq!(config.revision, "v1.0");
        assert_eq!(config.filter, vec!["**/*.md".to_string()]);
        assert_eq!(config.ignore, vec!["docs/old/**/*".to_string()]);
        assert_eq!(config.original, Some(PathBuf::from("docs")));
        assert!(config.parallel);
    }
}
