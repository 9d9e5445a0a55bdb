// src/main.rs

mod cli;
mod logging;

use clap::Parser;
use cli::Args;
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use translation_tracker::config::TrackerConfig;
use translation_tracker::report::{self, StatusSummary};
use translation_tracker::tracker::TranslationTracker;
use translation_tracker::{Error, Result};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logger(args.log_level.as_deref());
    let start_time = Instant::now();

    match run(&args) {
        Ok(true) => {
            info!("Tracking finished in {:.2?}", start_time.elapsed());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            error!("Some translation files could not be classified");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Error tracking translations: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the pass completed with failed pairs
fn run(args: &Args) -> Result<bool> {
    let config = args.apply(TrackerConfig::load(args.config.as_deref())?);
    let original = config
        .original
        .clone()
        .ok_or(Error::MissingSetting("original path"))?;
    let targets = if args.targets.is_empty() {
        config.targets()?
    } else {
        args.targets.clone()
    };
    if targets.is_empty() {
        return Err(Error::MissingSetting("translation targets"));
    }

    let mut tracker = TranslationTracker::open(&config.repository)?.with_parallel(config.parallel);
    tracker.put_all(&original, &targets, &config.filter, &config.ignore)?;

    let bar = ProgressBar::new(tracker.mapping().len() as u64);
    let report = tracker.track_with_progress(&config.revision, &bar)?;
    let committed_at = tracker.history().committed_at(report.revision)?;
    info!(
        "{} ({}) committed {}",
        report.branch,
        report.revision.short(),
        committed_at.to_rfc2822()
    );

    let selected = report::select(&report.records, &args.select)?;
    info!("{}", StatusSummary::from_records(selected.iter().copied()));

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            report::write_json(selected, &mut writer)?;
            writer.flush()?;
            info!("Report written to {}", path.display());
        }
        None => report::write_json(selected, io::stdout().lock())?,
    }

    Ok(report.is_complete())
}
