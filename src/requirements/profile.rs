//! Typed view over a consolidated requirement set: exactly the values the
//! scoring rubric reads, already parsed into closed types.
//!
//! A resolved value of the wrong shape (possible when a consolidated set is
//! deserialized from an external artifact) counts as unspecified. Power, voltage
//! and rotation must also be strictly positive to be usable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::{field_path, ConsolidatedRequirementSet, Section};
use crate::catalog::{EfficiencyClass, IpRating};

/// Rotation tolerance used when no document states one (percent).
pub const DEFAULT_RPM_TOLERANCE_PCT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequirementProfile {
    pub power_kw: Option<f64>,
    pub voltage_v: Option<f64>,
    pub efficiency_min: Option<EfficiencyClass>,
    pub ip_min: Option<IpRating>,
    pub rpm: Option<f64>,
    pub rpm_tolerance_pct: f64,
    pub inverter_required: Option<bool>,
    pub lead_time_max_days: Option<u32>,
    pub warranty_min_months: Option<u32>,
    pub budget: Option<f64>,
}

impl RequirementProfile {
    pub fn from_consolidated(set: &ConsolidatedRequirementSet) -> Self {
        let efficiency_min = parsed::<EfficiencyClass>(set, Section::Electrical, "efficiency_min")
            .or_else(|| parsed(set, Section::Operational, "efficiency"));

        Self {
            power_kw: positive(set, Section::Electrical, "power_kw"),
            voltage_v: positive(set, Section::Electrical, "voltage_v"),
            efficiency_min,
            ip_min: parsed(set, Section::Operational, "ip_rating"),
            rpm: positive(set, Section::Mechanical, "rpm"),
            rpm_tolerance_pct: number(set, Section::Mechanical, "rpm_tolerance_pct")
                .filter(|t| *t >= 0.0)
                .unwrap_or(DEFAULT_RPM_TOLERANCE_PCT),
            inverter_required: typed(set, Section::Electrical, "inverter_ready", Value::as_bool),
            lead_time_max_days: whole(set, Section::Commercial, "lead_time_max_days"),
            warranty_min_months: whole(set, Section::Commercial, "warranty_min_months"),
            budget: positive(set, Section::Commercial, "budget"),
        }
    }
}

fn typed<T>(
    set: &ConsolidatedRequirementSet,
    section: Section,
    field: &str,
    conv: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = set.value(section, field)?;
    let out = conv(value);
    if out.is_none() {
        warn!(
            target: "scoring",
            field = %field_path(section, field),
            %value,
            "requirement value has unexpected shape; treated as unspecified"
        );
    }
    out
}

fn number(set: &ConsolidatedRequirementSet, section: Section, field: &str) -> Option<f64> {
    typed(set, section, field, Value::as_f64)
}

fn positive(set: &ConsolidatedRequirementSet, section: Section, field: &str) -> Option<f64> {
    number(set, section, field).filter(|v| *v > 0.0 && v.is_finite())
}

fn whole(set: &ConsolidatedRequirementSet, section: Section, field: &str) -> Option<u32> {
    typed(set, section, field, |v| {
        v.as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
    })
}

fn parsed<T: std::str::FromStr>(
    set: &ConsolidatedRequirementSet,
    section: Section,
    field: &str,
) -> Option<T> {
    typed(set, section, field, |v| v.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{consolidate, RequirementDraft};
    use serde_json::json;

    fn set(v: Value) -> ConsolidatedRequirementSet {
        let d: RequirementDraft = serde_json::from_value(v).unwrap();
        consolidate(&[d]).unwrap()
    }

    #[test]
    fn reads_typed_values() {
        let s = set(json!({
            "source_id": "spec.pdf",
            "sections": {
                "electrical": { "power_kw": 15.0, "voltage_v": 380, "efficiency_min": "IE3", "inverter_ready": true },
                "mechanical": { "rpm": 1750, "rpm_tolerance_pct": 2.0 },
                "operational": { "ip_rating": "IP55" },
                "commercial": { "lead_time_max_days": 30, "warranty_min_months": 18 }
            }
        }));
        let p = RequirementProfile::from_consolidated(&s);
        assert_eq!(p.power_kw, Some(15.0));
        assert_eq!(p.voltage_v, Some(380.0));
        assert_eq!(p.efficiency_min, Some(EfficiencyClass::IE3));
        assert_eq!(p.ip_min, Some(IpRating::new(5, 5)));
        assert_eq!(p.rpm, Some(1750.0));
        assert_eq!(p.inverter_required, Some(true));
        assert_eq!(p.lead_time_max_days, Some(30));
        assert_eq!(p.warranty_min_months, Some(18));
    }

    #[test]
    fn efficiency_falls_back_to_operational_section() {
        let s = set(json!({
            "source_id": "memo.pdf",
            "sections": { "operational": { "efficiency": "IE2" } }
        }));
        let p = RequirementProfile::from_consolidated(&s);
        assert_eq!(p.efficiency_min, Some(EfficiencyClass::IE2));
        assert_eq!(p.rpm_tolerance_pct, DEFAULT_RPM_TOLERANCE_PCT);
    }

    #[test]
    fn non_positive_power_counts_as_unspecified() {
        let s = set(json!({
            "source_id": "memo.pdf",
            "sections": { "electrical": { "power_kw": 0.0 }, "mechanical": { "rpm": -5 } }
        }));
        let p = RequirementProfile::from_consolidated(&s);
        assert_eq!(p.power_kw, None);
        assert_eq!(p.rpm, None);
    }
}
