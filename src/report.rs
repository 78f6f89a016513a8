// src/report.rs
//! Analysis artifacts: the full pipeline result as a serializable report, plus
//! the JSON file helpers the batch binary uses.
//!
//! Files written under the output directory:
//! - `consolidated_requirements.json`
//! - `match_analysis.json`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::CatalogLoad;
use crate::ranking::{CandidateFailure, RankSummary, RankedReport, RankingOrchestrator, ScoredCandidate};
use crate::requirements::{
    ConsolidatedRequirementSet, ConsolidationEngine, RawDraft, RequirementDraft,
    RequirementProfile, UnknownFieldPolicy,
};
use crate::scoring::Classification;

pub const CONSOLIDATED_FILE: &str = "consolidated_requirements.json";
pub const ANALYSIS_FILE: &str = "match_analysis.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub source_documents: Vec<String>,
    /// SHA-256 prefix of the consolidated set's JSON.
    pub requirements_digest: String,
    pub analyzed: usize,
    pub failed: usize,
}

/// One line of the human-facing ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub position: usize,
    pub code: String,
    pub manufacturer: String,
    pub score: u32,
    pub classification: Classification,
    pub base_price: Option<f64>,
    /// `None` when either the budget or the price is unknown.
    pub within_budget: Option<bool>,
    pub lead_time_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub summary: RankSummary,
    pub requirements: ConsolidatedRequirementSet,
    pub ranking: Vec<RankingRow>,
    pub failures: Vec<CandidateFailure>,
    pub candidates: Vec<ScoredCandidate>,
}

impl AnalysisReport {
    pub fn build(
        requirements: ConsolidatedRequirementSet,
        ranked: RankedReport,
    ) -> serde_json::Result<Self> {
        Self::build_at(requirements, ranked, Utc::now())
    }

    pub fn build_at(
        requirements: ConsolidatedRequirementSet,
        ranked: RankedReport,
        generated_at: DateTime<Utc>,
    ) -> serde_json::Result<Self> {
        let budget = RequirementProfile::from_consolidated(&requirements).budget;
        let ranking = ranked
            .candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let base_price = c.catalog_item.commercial.base_price;
                RankingRow {
                    position: i + 1,
                    code: c.catalog_item.code.clone(),
                    manufacturer: c.catalog_item.manufacturer.clone(),
                    score: c.breakdown.total_score,
                    classification: c.breakdown.classification,
                    base_price,
                    within_budget: budget.zip(base_price).map(|(b, p)| p <= b),
                    lead_time_days: c.catalog_item.commercial.lead_time_days,
                }
            })
            .collect();

        let metadata = ReportMetadata {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at,
            source_documents: requirements.source_documents.clone(),
            requirements_digest: requirements_digest(&requirements)?,
            analyzed: ranked.candidates.len() + ranked.failures.len(),
            failed: ranked.failures.len(),
        };

        Ok(Self {
            metadata,
            summary: ranked.summary,
            requirements,
            ranking,
            failures: ranked.failures,
            candidates: ranked.candidates,
        })
    }
}

/// Consolidate → rank → report, with catalog-load rejections folded in.
///
/// Domain failures stay downcastable to [`crate::error::MatchError`].
pub fn run_analysis(
    drafts: &[RequirementDraft],
    catalog: &CatalogLoad,
    parallel: bool,
) -> Result<AnalysisReport> {
    let requirements = ConsolidationEngine::default().consolidate(drafts)?;
    for path in &requirements.missing_fields {
        warn!(target: "consolidation", field = %path, "requirement not supplied by any draft");
    }

    let mut ranked = RankingOrchestrator::new(&requirements)
        .parallel(parallel)
        .rank(&catalog.items);
    ranked.merge_failures(catalog.rejected.iter().cloned());

    AnalysisReport::build(requirements, ranked).context("building analysis report")
}

/// First 16 hex chars of SHA-256 over the set's JSON (maps are ordered).
pub fn requirements_digest(set: &ConsolidatedRequirementSet) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(set)?;
    let digest = Sha256::digest(&bytes);
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        let _ = write!(&mut out, "{b:02x}");
    }
    Ok(out)
}

/// Pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output dir {}", parent.display()))?;
    }
    let body = serde_json::to_vec_pretty(value).context("serializing report JSON")?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(target: "report", path = %path.display(), "artifact written");
    Ok(())
}

/// Both artifacts under `dir`; returns their paths.
pub fn write_artifacts(dir: &Path, report: &AnalysisReport) -> Result<(PathBuf, PathBuf)> {
    let consolidated = dir.join(CONSOLIDATED_FILE);
    let analysis = dir.join(ANALYSIS_FILE);
    write_json(&consolidated, &report.requirements)?;
    write_json(&analysis, report)?;
    Ok((consolidated, analysis))
}

/// Read draft files in order. A file holds one draft object or an array of them.
pub fn load_drafts_from(
    paths: &[PathBuf],
    policy: UnknownFieldPolicy,
) -> Result<Vec<RequirementDraft>> {
    let mut drafts = Vec::new();
    for path in paths {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading draft {}", path.display()))?;
        let root: Value = serde_json::from_str(&content)
            .with_context(|| format!("parsing draft JSON {}", path.display()))?;
        let raws: Vec<RawDraft> = if root.is_array() {
            serde_json::from_value(root)
        } else {
            serde_json::from_value(root).map(|d| vec![d])
        }
        .with_context(|| format!("draft shape in {}", path.display()))?;

        for raw in raws {
            let draft = RequirementDraft::from_raw(raw, policy)
                .with_context(|| format!("validating draft in {}", path.display()))?;
            drafts.push(draft);
        }
    }
    info!(target: "report", files = paths.len(), drafts = drafts.len(), "drafts loaded");
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog_value;
    use crate::error::MatchError;
    use serde_json::json;

    fn drafts() -> Vec<RequirementDraft> {
        vec![serde_json::from_value(json!({
            "source_id": "spec.pdf",
            "sections": {
                "electrical": { "power_kw": 15.0, "voltage_v": 380 },
                "commercial": { "budget": 11000.0 }
            },
            "confidence": { "electrical": 0.9, "commercial": 0.8 }
        }))
        .unwrap()]
    }

    fn catalog() -> CatalogLoad {
        parse_catalog_value(json!([
            { "code": "CHEAP", "manufacturer": "WEG",
              "electrical": { "power_kw": 15.0, "rated_voltages": [380], "efficiency_class": "IE3", "inverter_ready": true },
              "mechanical": { "rpm": 1750 }, "operational": { "ip_rating": "IP55" },
              "commercial": { "lead_time_days": 10, "availability": "in_stock", "warranty_months": 24, "base_price": 9000.0 } },
            { "code": "PRICEY", "manufacturer": "ABB",
              "electrical": { "power_kw": 15.0, "rated_voltages": [380], "efficiency_class": "IE3", "inverter_ready": true },
              "mechanical": { "rpm": 1750 }, "operational": { "ip_rating": "IP55" },
              "commercial": { "lead_time_days": 20, "availability": "in_stock", "warranty_months": 24, "base_price": 15000.0 } },
            { "code": "BAD", "manufacturer": "X", "electrical": { "efficiency_class": "IE7" } }
        ]))
        .unwrap()
    }

    #[test]
    fn analysis_includes_budget_and_load_failures() {
        let report = run_analysis(&drafts(), &catalog(), false).unwrap();
        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranking[0].code, "CHEAP");
        assert_eq!(report.ranking[0].position, 1);
        assert_eq!(report.ranking[0].within_budget, Some(true));
        assert_eq!(report.ranking[1].within_budget, Some(false));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.metadata.analyzed, 3);
        assert_eq!(report.metadata.failed, 1);
        assert_eq!(report.metadata.source_documents, vec!["spec.pdf"]);
    }

    #[test]
    fn digest_is_stable_and_short() {
        let set = ConsolidationEngine::default().consolidate(&drafts()).unwrap();
        let a = requirements_digest(&set).unwrap();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()), "{a}");
        assert_eq!(a, requirements_digest(&set.clone()).unwrap());
    }

    #[test]
    fn empty_drafts_fail_the_analysis() {
        let err = run_analysis(&[], &catalog(), false).unwrap_err();
        assert_eq!(err.downcast_ref::<MatchError>(), Some(&MatchError::EmptyInput));
    }

    #[test]
    fn digest_changes_with_the_requirements() {
        let set = ConsolidationEngine::default().consolidate(&drafts()).unwrap();
        let mut other = set.clone();
        other.source_documents.push("addendum.pdf".into());
        assert_ne!(
            requirements_digest(&set).unwrap(),
            requirements_digest(&other).unwrap()
        );
    }

    #[test]
    fn report_metadata_carries_the_digest() {
        let set = ConsolidationEngine::default().consolidate(&drafts()).unwrap();
        let expected = requirements_digest(&set).unwrap();
        let ranked = RankingOrchestrator::new(&set).rank(&catalog().items);
        let report = AnalysisReport::build(set, ranked).unwrap();
        assert_eq!(report.metadata.requirements_digest, expected);
    }
}
