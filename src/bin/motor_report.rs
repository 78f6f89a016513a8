//! Batch pipeline: drafts + catalog from disk → ranked analysis artifacts.
//!
//! Usage: `motor-report [CONFIG_PATH]` (falls back to the usual config resolution).

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use motor_match::catalog::load_catalog_from;
use motor_match::config::AppConfig;
use motor_match::logging;
use motor_match::report::{load_drafts_from, run_analysis, write_artifacts};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let config = match std::env::args().nth(1) {
        Some(p) => AppConfig::load_from(&PathBuf::from(p))?,
        None => AppConfig::load_default()?,
    };

    // 1) Inputs
    if config.inputs.drafts.is_empty() {
        bail!("no requirement drafts configured ([inputs] drafts)");
    }
    let Some(catalog_path) = config.inputs.catalog.as_ref() else {
        bail!("no catalog configured ([inputs] catalog)");
    };
    let drafts = load_drafts_from(&config.inputs.drafts, config.consolidation.unknown_fields)?;
    let catalog = load_catalog_from(catalog_path)?;

    // 2) Consolidate + rank
    let report =
        run_analysis(&drafts, &catalog, config.ranking.parallel).context("analysis failed")?;

    // 3) Artifacts
    let (consolidated, analysis) = write_artifacts(&config.output.dir, &report)?;
    info!(
        consolidated = %consolidated.display(),
        analysis = %analysis.display(),
        "artifacts written"
    );

    // 4) Console summary
    println!(
        "Analyzed {} catalog items ({} failed); requirements digest {}",
        report.metadata.analyzed, report.metadata.failed, report.metadata.requirements_digest
    );
    if !report.requirements.missing_fields.is_empty() {
        println!("Missing requirement fields: {}", report.requirements.missing_fields.len());
    }
    if !report.requirements.conflicts.is_empty() {
        println!("Conflicting fields resolved: {}", report.requirements.conflicts.len());
    }
    for row in report.ranking.iter().take(config.ranking.summary_rows) {
        println!(
            "{:>3}. {:<20} {:<16} {:>3} pts  {:?}",
            row.position, row.code, row.manufacturer, row.score, row.classification
        );
    }
    if let Some(top) = &report.summary.top {
        println!("Recommended: {} ({}), {} pts", top.code, top.manufacturer, top.score);
    } else {
        println!("No scorable candidates.");
    }
    Ok(())
}
