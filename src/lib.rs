// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod ranking;
pub mod report;
pub mod requirements;
pub mod scoring;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::catalog::{CatalogItem, CatalogLoad};
pub use crate::error::MatchError;
pub use crate::ranking::{rank, RankedReport, RankingOrchestrator};
pub use crate::requirements::{consolidate, ConsolidatedRequirementSet, RequirementDraft};
pub use crate::scoring::{score, Classification, ScoreBreakdown, ScoringEngine};
