// src/config.rs

use crate::error::Result;
use crate::tracker::TranslationTarget;
use config::{Config, File as ConfigFile, FileFormat, Source};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the current directory, with any extension `config` knows
pub const DEFAULT_CONFIG_NAME: &str = "Translations";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    pub tag: String,
    pub path: PathBuf,
}

/// Settings of a tracking run. `original` and the translation paths are
/// relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    pub repository: PathBuf,
    pub revision: String,
    pub original: Option<PathBuf>,
    #[serde(default)]
    pub translations: Vec<TargetConfig>,
    pub filter: Vec<String>,
    pub ignore: Vec<String>,
    pub parallel: bool,
}

impl TrackerConfig {
    /// Loads `path`, or the optional `Translations.toml` when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => ConfigFile::from(path).required(true),
            None => ConfigFile::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        Self::from_source(source)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Self::from_source(ConfigFile::from_str(text, FileFormat::Toml))
    }

    fn from_source<S: Source + Send + Sync + 'static>(source: S) -> Result<Self> {
        let config = Config::builder()
            .set_default("repository", ".")?
            .set_default("revision", "HEAD")?
            .set_default("filter", vec!["**/*"])?
            .set_default("ignore", Vec::<String>::new())?
            .set_default("parallel", false)?
            .add_source(source)
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Translation targets with their tags checked against the registry
    pub fn targets(&self) -> Result<Vec<TranslationTarget>> {
        self.translations
            .iter()
            .map(|target| TranslationTarget::new(&target.tag, &target.path))
            .collect()
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            repository: PathBuf::from("."),
            revision: "HEAD".to_string(),
            original: None,
            translations: Vec::new(),
            filter: vec!["**/*".to_string()],
            ignore: Vec::new(),
            parallel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::from_toml("").unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_full_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("Translations.toml");
        fs::write(
            &path,
            r#"
repository = "/srv/docs"
revision = "main"
original = "docs"
filter = ["**/*.md"]
ignore = ["docs/drafts/**/*"]
parallel = true

[[translations]]
tag = "fr"
path = "docs/fr"

[[translations]]
tag = "zh-TW"
path = "docs/zh-TW"
"#,
        )
        .unwrap();

        let config = TrackerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.repository, PathBuf::from("/srv/docs"));
        assert_eq!(config.revision, "main");
        assert_eq!(config.original, Some(PathBuf::from("docs")));
        assert_eq!(config.filter, vec!["**/*.md".to_string()]);
        assert_eq!(config.ignore, vec!["docs/drafts/**/*".to_string()]);
        assert!(config.parallel);

        let targets = config.targets().unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].language.tag(), "zh-TW");
        assert_eq!(targets[1].path, PathBuf::from("docs/zh-TW"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let tmp = tempdir().unwrap();
        let err = TrackerConfig::load(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_tag() {
        let config = TrackerConfig::from_toml(
            r#"
[[translations]]
tag = "klingon"
path = "docs/tlh"
"#,
        )
        .unwrap();
        assert!(matches!(config.targets(), Err(Error::LanguageTag(_))));
    }
}
