// src/lib.rs

//! Tracks the synchronization state of translation files against their
//! originals from the git history of a documentation repository.

pub mod classifier;
pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod language;
pub mod mapper;
pub mod marker;
pub mod model;
pub mod report;
pub mod resolver;
pub mod tracker;

pub use error::{Error, Result};
pub use language::LanguageTag;
pub use model::{
    DiffResult, RevisionId, RevisionedFile, Status, TrackState, TranslationFile, TranslationRecord,
};
pub use tracker::{TrackingReport, TranslationTarget, TranslationTracker};
