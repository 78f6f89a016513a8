//! # Consolidation Engine
//! Merges N validated drafts into one authoritative requirement set.
//!
//! Policy: for every field the highest-confidence non-null claim wins; equal
//! confidences go to the earliest draft. Disagreement never blocks the pipeline,
//! it is recorded in `conflicts` for human review. Fields nobody supplied end up
//! null and listed in `missing_fields`.
//!
//! Pure fold over the inputs; the only side channels are logs and counters.

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::draft::{RawDraft, RequirementDraft, SectionValues, UnknownFieldPolicy};
use super::{field_path, FieldValue, Section};
use crate::error::MatchError;

/// ≥2 drafts supplied structurally different values for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub section: Section,
    pub field: String,
    /// Every contributing claim, in draft order.
    pub candidates: Vec<FieldValue>,
    /// Source whose value was kept.
    pub resolved_from: String,
}

/// The merged requirement record handed to scoring. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRequirementSet {
    #[serde(default)]
    pub source_documents: Vec<String>,
    pub sections: BTreeMap<Section, SectionValues>,
    #[serde(default)]
    pub missing_fields: BTreeSet<String>,
    #[serde(default)]
    pub conflicts: Vec<FieldConflict>,
    #[serde(default)]
    pub section_confidence: BTreeMap<Section, f64>,
}

impl ConsolidatedRequirementSet {
    pub fn section(&self, section: Section) -> Option<&SectionValues> {
        self.sections.get(&section)
    }

    /// Resolved non-null value of a known field.
    pub fn value(&self, section: Section, field: &str) -> Option<&Value> {
        self.section(section).and_then(|s| s.get(field))
    }
}

/// Stateless front door; carries the unknown-field policy for raw input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationEngine {
    policy: UnknownFieldPolicy,
}

impl ConsolidationEngine {
    pub fn new(policy: UnknownFieldPolicy) -> Self {
        Self { policy }
    }

    /// Validate raw extractor output, then consolidate.
    pub fn consolidate_raw(
        &self,
        raw: Vec<RawDraft>,
    ) -> Result<ConsolidatedRequirementSet, MatchError> {
        let drafts = raw
            .into_iter()
            .map(|r| RequirementDraft::from_raw(r, self.policy))
            .collect::<Result<Vec<_>, _>>()?;
        self.consolidate(&drafts)
    }

    pub fn consolidate(
        &self,
        drafts: &[RequirementDraft],
    ) -> Result<ConsolidatedRequirementSet, MatchError> {
        consolidate(drafts)
    }
}

/// Merge an ordered, non-empty sequence of drafts.
pub fn consolidate(drafts: &[RequirementDraft]) -> Result<ConsolidatedRequirementSet, MatchError> {
    let set = match drafts {
        [] => return Err(MatchError::EmptyInput),
        [single] => promote(single),
        many => merge(many),
    };

    counter!("requirement_conflicts_total").increment(set.conflicts.len() as u64);
    counter!("requirement_missing_fields_total").increment(set.missing_fields.len() as u64);
    info!(
        target: "consolidation",
        drafts = drafts.len(),
        conflicts = set.conflicts.len(),
        missing = set.missing_fields.len(),
        "requirements consolidated"
    );
    Ok(set)
}

/// One draft: structural copy in the consolidated shape, no merge work.
fn promote(draft: &RequirementDraft) -> ConsolidatedRequirementSet {
    let mut missing_fields = BTreeSet::new();
    for (section, values) in draft.sections() {
        for (field, value) in values.fields.iter().chain(values.extensions.iter()) {
            if value.is_null() {
                missing_fields.insert(field_path(*section, field));
            }
        }
    }

    ConsolidatedRequirementSet {
        source_documents: vec![draft.source_id().to_string()],
        sections: draft.sections().clone(),
        missing_fields,
        conflicts: Vec::new(),
        section_confidence: Section::ALL
            .iter()
            .map(|s| (*s, draft.confidence(*s)))
            .collect(),
    }
}

fn merge(drafts: &[RequirementDraft]) -> ConsolidatedRequirementSet {
    let mut sections = BTreeMap::new();
    let mut missing_fields = BTreeSet::new();
    let mut conflicts = Vec::new();

    for section in Section::ALL {
        if drafts.iter().all(|d| d.section(section).is_none()) {
            continue;
        }

        let fields = merge_bucket(section, drafts, |v| &v.fields);
        let extensions = merge_bucket(section, drafts, |v| &v.extensions);

        missing_fields.extend(fields.missing.into_iter().chain(extensions.missing));
        conflicts.extend(fields.conflicts.into_iter().chain(extensions.conflicts));
        sections.insert(
            section,
            SectionValues {
                fields: fields.values,
                extensions: extensions.values,
            },
        );
    }

    let n = drafts.len() as f64;
    let section_confidence = Section::ALL
        .iter()
        .map(|s| {
            let sum: f64 = drafts.iter().map(|d| d.confidence(*s)).sum();
            (*s, sum / n)
        })
        .collect();

    ConsolidatedRequirementSet {
        source_documents: drafts.iter().map(|d| d.source_id().to_string()).collect(),
        sections,
        missing_fields,
        conflicts,
        section_confidence,
    }
}

#[derive(Default)]
struct MergedBucket {
    values: BTreeMap<String, Value>,
    missing: Vec<String>,
    conflicts: Vec<FieldConflict>,
}

/// Resolve every key of one bucket (schema fields or extensions) of a section.
fn merge_bucket<F>(section: Section, drafts: &[RequirementDraft], bucket: F) -> MergedBucket
where
    F: Fn(&SectionValues) -> &BTreeMap<String, Value>,
{
    let keys: BTreeSet<&str> = drafts
        .iter()
        .filter_map(|d| d.section(section))
        .flat_map(|v| bucket(v).keys().map(String::as_str))
        .collect();

    let mut out = MergedBucket::default();
    for key in keys {
        // 1) Non-null claims in draft order.
        let claims: Vec<FieldValue> = drafts
            .iter()
            .filter_map(|d| {
                let value = d.section(section).and_then(|v| bucket(v).get(key))?;
                if value.is_null() {
                    return None;
                }
                Some(FieldValue {
                    value: value.clone(),
                    confidence: d.confidence(section),
                    source_id: d.source_id().to_string(),
                })
            })
            .collect();

        // 2) Nobody supplied it.
        let Some(first) = claims.first() else {
            out.values.insert(key.to_string(), Value::Null);
            out.missing.push(field_path(section, key));
            continue;
        };

        // 3) Highest confidence; strict `>` keeps the earliest on ties.
        let best = claims.iter().fold(first, |best, c| {
            if c.confidence > best.confidence {
                c
            } else {
                best
            }
        });
        out.values.insert(key.to_string(), best.value.clone());

        // 4) Structural disagreement is recorded, not resolved away.
        if claims.iter().any(|c| c.value != first.value) {
            debug!(
                target: "consolidation",
                field = %field_path(section, key),
                chosen = %best.value,
                from = %best.source_id,
                candidates = claims.len(),
                "conflicting values"
            );
            out.conflicts.push(FieldConflict {
                section,
                field: key.to_string(),
                resolved_from: best.source_id.clone(),
                candidates: claims,
            });
        }
    }
    out
}
