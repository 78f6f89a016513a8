//! Domain errors for consolidation, scoring and catalog validation.
//!
//! Conflicts and missing requirement fields are NOT errors; they travel as
//! regular output (`conflicts`, `missing_fields`) for human review.

use thiserror::Error;

use crate::scoring::Criterion;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// No drafts supplied to consolidation.
    #[error("at least one requirement draft is required")]
    EmptyInput,

    /// A catalog item lacks a field some criterion needs.
    #[error("catalog item {code} ({manufacturer}) is missing: {}", missing.join(", "))]
    IncompleteCatalogItem {
        code: String,
        manufacturer: String,
        missing: Vec<&'static str>,
    },

    /// An eliminatory criterion has no resolved requirement value.
    /// Never escapes `score`: it is folded into a 0-point criterion.
    #[error("requirement for {criterion} is unspecified")]
    UnscorableRequirement { criterion: Criterion },

    #[error("invalid draft {source_id}: {reason}")]
    InvalidDraft { source_id: String, reason: String },

    #[error("invalid catalog entry {code} ({manufacturer}): {reason}")]
    InvalidCatalogEntry {
        code: String,
        manufacturer: String,
        reason: String,
    },
}

impl MatchError {
    /// Stable machine-readable kind (used in HTTP error bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::EmptyInput => "empty_input",
            MatchError::IncompleteCatalogItem { .. } => "incomplete_catalog_item",
            MatchError::UnscorableRequirement { .. } => "unscorable_requirement",
            MatchError::InvalidDraft { .. } => "invalid_draft",
            MatchError::InvalidCatalogEntry { .. } => "invalid_catalog_entry",
        }
    }

    pub(crate) fn invalid_draft(source_id: &str, reason: impl Into<String>) -> Self {
        MatchError::InvalidDraft {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }
}
