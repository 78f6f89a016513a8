//! Requirement drafts: one source document's confidence-tagged extraction.
//!
//! The wire shape is the raw extractor output ([`RawDraft`]): flat maps per
//! section plus one confidence per section. Validation against the schema turns
//! it into a [`RequirementDraft`], whose sections keep known fields and unknown
//! keys apart. Serializing a draft merges the buckets back, so a draft JSON
//! round-trips losslessly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::{field_path, schema, Section};
use crate::error::MatchError;

/// What to do with keys the schema does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Keep them in the section's `extensions` bucket (logged).
    #[default]
    Extension,
    /// Fail validation of the whole draft.
    Reject,
}

/// Raw extractor output, exactly as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDraft {
    pub source_id: String,
    #[serde(default)]
    pub sections: BTreeMap<Section, BTreeMap<String, Value>>,
    #[serde(default)]
    pub confidence: BTreeMap<Section, f64>,
}

/// Values of one section, split into schema fields and extension keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionValues {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

impl SectionValues {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extensions.is_empty()
    }

    /// Non-null value of a known field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }
}

/// A validated draft. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDraft", into = "RawDraft")]
pub struct RequirementDraft {
    source_id: String,
    sections: BTreeMap<Section, SectionValues>,
    confidence: BTreeMap<Section, f64>,
}

impl RequirementDraft {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn sections(&self) -> &BTreeMap<Section, SectionValues> {
        &self.sections
    }

    pub fn section(&self, section: Section) -> Option<&SectionValues> {
        self.sections.get(&section)
    }

    /// Declared confidence for `section`; drafts lacking it count as 0.
    pub fn confidence(&self, section: Section) -> f64 {
        self.confidence.get(&section).copied().unwrap_or(0.0)
    }

    pub fn declared_confidence(&self) -> &BTreeMap<Section, f64> {
        &self.confidence
    }

    /// Validate a raw draft against the schema.
    pub fn from_raw(raw: RawDraft, policy: UnknownFieldPolicy) -> Result<Self, MatchError> {
        let RawDraft {
            source_id,
            sections: raw_sections,
            confidence,
        } = raw;

        if source_id.trim().is_empty() {
            return Err(MatchError::invalid_draft("<empty>", "source_id must not be empty"));
        }

        for (section, c) in &confidence {
            // NaN fails the range check too.
            if !(0.0..=1.0).contains(c) {
                return Err(MatchError::invalid_draft(
                    &source_id,
                    format!("confidence for {section} must be within [0, 1], got {c}"),
                ));
            }
        }

        let mut sections = BTreeMap::new();
        for (section, raw_fields) in raw_sections {
            let mut values = SectionValues::default();
            for (field, value) in raw_fields {
                match schema::kind_of(section, &field) {
                    Some(kind) => {
                        if !value.is_null() && !kind.accepts(&value) {
                            return Err(MatchError::invalid_draft(
                                &source_id,
                                format!(
                                    "{} expects {}, got {}",
                                    field_path(section, &field),
                                    kind.as_str(),
                                    value
                                ),
                            ));
                        }
                        values.fields.insert(field, value);
                    }
                    None => {
                        let hint = schema::suggest(section, &field);
                        if policy == UnknownFieldPolicy::Reject {
                            let mut reason =
                                format!("unknown field {}", field_path(section, &field));
                            if let Some(h) = hint {
                                reason.push_str(&format!(" (did you mean {h}?)"));
                            }
                            return Err(MatchError::invalid_draft(&source_id, reason));
                        }
                        warn!(
                            target: "consolidation",
                            source_id = %source_id,
                            field = %field_path(section, &field),
                            suggestion = ?hint,
                            "unknown field routed to extensions"
                        );
                        values.extensions.insert(field, value);
                    }
                }
            }
            sections.insert(section, values);
        }

        Ok(Self {
            source_id,
            sections,
            confidence,
        })
    }
}

impl TryFrom<RawDraft> for RequirementDraft {
    type Error = MatchError;

    fn try_from(raw: RawDraft) -> Result<Self, Self::Error> {
        RequirementDraft::from_raw(raw, UnknownFieldPolicy::default())
    }
}

impl From<RequirementDraft> for RawDraft {
    fn from(d: RequirementDraft) -> Self {
        let sections = d
            .sections
            .into_iter()
            .map(|(section, values)| {
                let mut flat = values.fields;
                flat.extend(values.extensions);
                (section, flat)
            })
            .collect();
        RawDraft {
            source_id: d.source_id,
            sections,
            confidence: d.confidence,
        }
    }
}
