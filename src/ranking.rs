// src/ranking.rs
//! # Ranking Orchestrator
//! Scores a whole catalog against one requirement set and orders the result.
//!
//! Items that cannot be scored become [`CandidateFailure`]s; they never abort
//! the batch. Order: score desc → lead time asc → code asc, so the same input
//! set always yields the same report regardless of catalog order.

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::catalog::CatalogItem;
use crate::error::MatchError;
use crate::requirements::ConsolidatedRequirementSet;
use crate::scoring::{Classification, ScoreBreakdown, ScoringEngine};

/// Alternatives shown in the summary.
pub const SUMMARY_ALTERNATIVES: usize = 3;
pub const ALTERNATIVE_MIN_SCORE: u32 = 75;
pub const ADEQUATE_MIN_SCORE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub code: String,
    pub manufacturer: String,
    pub reason: String,
}

impl CandidateFailure {
    pub fn from_error(err: &MatchError) -> Self {
        let (code, manufacturer) = match err {
            MatchError::IncompleteCatalogItem {
                code, manufacturer, ..
            }
            | MatchError::InvalidCatalogEntry {
                code, manufacturer, ..
            } => (code.clone(), manufacturer.clone()),
            _ => (String::from("<unknown>"), String::from("<unknown>")),
        };
        Self {
            code,
            manufacturer,
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub catalog_item: CatalogItem,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn score(&self) -> u32 {
        self.breakdown.total_score
    }

    fn lead_time_days(&self) -> u32 {
        // Scored items always carry one; missing sorts last.
        self.catalog_item.commercial.lead_time_days.unwrap_or(u32::MAX)
    }
}

/// Per-candidate result; failures are values, not exceptions.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Scored(ScoredCandidate),
    Failed(CandidateFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRef {
    pub code: String,
    pub manufacturer: String,
    pub score: u32,
    pub classification: Classification,
}

impl From<&ScoredCandidate> for RankedRef {
    fn from(c: &ScoredCandidate) -> Self {
        Self {
            code: c.catalog_item.code.clone(),
            manufacturer: c.catalog_item.manufacturer.clone(),
            score: c.breakdown.total_score,
            classification: c.breakdown.classification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankSummary {
    pub top: Option<RankedRef>,
    pub alternatives: Vec<RankedRef>,
    pub inadequate_count: usize,
}

impl RankSummary {
    fn of(ranked: &[ScoredCandidate]) -> Self {
        Self {
            top: ranked.first().map(RankedRef::from),
            alternatives: ranked
                .iter()
                .skip(1)
                .take(SUMMARY_ALTERNATIVES)
                .filter(|c| c.score() >= ALTERNATIVE_MIN_SCORE)
                .map(RankedRef::from)
                .collect(),
            inadequate_count: ranked
                .iter()
                .filter(|c| c.score() < ADEQUATE_MIN_SCORE)
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedReport {
    pub candidates: Vec<ScoredCandidate>,
    pub failures: Vec<CandidateFailure>,
    pub summary: RankSummary,
}

impl RankedReport {
    /// Fold catalog-load rejections into the failure list.
    pub fn merge_failures(&mut self, extra: impl IntoIterator<Item = CandidateFailure>) {
        self.failures.extend(extra);
        sort_failures(&mut self.failures);
    }
}

#[derive(Debug, Clone)]
pub struct RankingOrchestrator {
    engine: ScoringEngine,
    parallel: bool,
}

impl RankingOrchestrator {
    pub fn new(requirements: &ConsolidatedRequirementSet) -> Self {
        Self::with_engine(ScoringEngine::new(requirements))
    }

    pub fn with_engine(engine: ScoringEngine) -> Self {
        Self {
            engine,
            parallel: false,
        }
    }

    /// Fan scoring out over rayon (needs the `parallel` feature; serial otherwise).
    pub fn parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn evaluate(&self, item: &CatalogItem) -> CandidateOutcome {
        match self.engine.score(item) {
            Ok(breakdown) => CandidateOutcome::Scored(ScoredCandidate {
                catalog_item: item.clone(),
                breakdown,
            }),
            Err(e) => {
                warn!(target: "ranking", code = %item.code, error = %e, "candidate not scorable");
                CandidateOutcome::Failed(CandidateFailure::from_error(&e))
            }
        }
    }

    pub fn rank(&self, catalog: &[CatalogItem]) -> RankedReport {
        // 1) Score every item once.
        let outcomes = self.evaluate_all(catalog);

        // 2) Split.
        let mut candidates = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Scored(c) => candidates.push(c),
                CandidateOutcome::Failed(f) => failures.push(f),
            }
        }

        // 3) Total order.
        candidates.sort_by(compare_candidates);
        sort_failures(&mut failures);

        counter!("motor_candidates_scored_total").increment(candidates.len() as u64);
        counter!("motor_candidates_failed_total").increment(failures.len() as u64);
        if let Some(top) = candidates.first() {
            gauge!("motor_last_top_score").set(f64::from(top.score()));
        }

        let summary = RankSummary::of(&candidates);
        info!(
            target: "ranking",
            scored = candidates.len(),
            failed = failures.len(),
            top = summary.top.as_ref().map(|t| t.code.as_str()).unwrap_or("-"),
            top_score = summary.top.as_ref().map(|t| t.score).unwrap_or(0),
            "catalog ranked"
        );

        RankedReport {
            candidates,
            failures,
            summary,
        }
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, catalog: &[CatalogItem]) -> Vec<CandidateOutcome> {
        if self.parallel {
            debug!(target: "ranking", items = catalog.len(), "scoring in parallel");
            return catalog.par_iter().map(|item| self.evaluate(item)).collect();
        }
        catalog.iter().map(|item| self.evaluate(item)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, catalog: &[CatalogItem]) -> Vec<CandidateOutcome> {
        if self.parallel {
            debug!(target: "ranking", "built without `parallel`; scoring serially");
        }
        catalog.iter().map(|item| self.evaluate(item)).collect()
    }
}

fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score()
        .cmp(&a.score())
        .then_with(|| a.lead_time_days().cmp(&b.lead_time_days()))
        .then_with(|| a.catalog_item.code.cmp(&b.catalog_item.code))
        .then_with(|| a.catalog_item.manufacturer.cmp(&b.catalog_item.manufacturer))
}

fn sort_failures(failures: &mut [CandidateFailure]) {
    failures.sort_by(|a, b| {
        a.code
            .cmp(&b.code)
            .then_with(|| a.manufacturer.cmp(&b.manufacturer))
            .then_with(|| a.reason.cmp(&b.reason))
    });
}

/// Rank `catalog` against `requirements` (serial).
pub fn rank(requirements: &ConsolidatedRequirementSet, catalog: &[CatalogItem]) -> RankedReport {
    RankingOrchestrator::new(requirements).rank(catalog)
}
