// src/requirements/mod.rs
//! Requirement side of the pipeline: schema, drafts, consolidation and the typed
//! profile the scoring rubric reads.

pub mod consolidate;
pub mod draft;
pub mod profile;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// Re-export convenient types.
pub use crate::requirements::consolidate::{
    consolidate, ConsolidatedRequirementSet, ConsolidationEngine, FieldConflict,
};
pub use crate::requirements::draft::{RawDraft, RequirementDraft, SectionValues, UnknownFieldPolicy};
pub use crate::requirements::profile::RequirementProfile;
pub use crate::requirements::schema::{FieldKind, SCHEMA_VERSION};

/// The six requirement sections produced by the upstream extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Electrical,
    Mechanical,
    Operational,
    Application,
    Protections,
    Commercial,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Electrical,
        Section::Mechanical,
        Section::Operational,
        Section::Application,
        Section::Protections,
        Section::Commercial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Electrical => "electrical",
            Section::Mechanical => "mechanical",
            Section::Operational => "operational",
            Section::Application => "application",
            Section::Protections => "protections",
            Section::Commercial => "commercial",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document's claim about one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
    pub confidence: f64,
    pub source_id: String,
}

/// `"section.field"` path used in `missing_fields` and log lines.
pub fn field_path(section: Section, field: &str) -> String {
    format!("{section}.{field}")
}
