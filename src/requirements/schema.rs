//! Explicit requirement schema: the enumerated field list of every section with
//! its declared semantic kind.
//!
//! Drafts are validated against this table. Keys that are not listed here are
//! either routed to the section's `extensions` bucket or rejected, depending on
//! [`UnknownFieldPolicy`](super::UnknownFieldPolicy).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::Section;
use crate::catalog::{EfficiencyClass as Efficiency, IpRating};

/// Bumped whenever a field is added, renamed or changes kind.
pub const SCHEMA_VERSION: u32 = 1;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGEST_MIN_SIMILARITY: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Integer,
    Text,
    Bool,
    TextList,
    EfficiencyClass,
    IpCode,
}

impl FieldKind {
    /// Whether a non-null value has the shape this kind declares.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value
                .as_f64()
                .is_some_and(|n| n.fract() == 0.0 && n.is_finite()),
            FieldKind::Text => value.is_string(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::TextList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::EfficiencyClass => value
                .as_str()
                .is_some_and(|s| Efficiency::from_str(s).is_ok()),
            FieldKind::IpCode => value.as_str().is_some_and(|s| IpRating::from_str(s).is_ok()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
            FieldKind::TextList => "text list",
            FieldKind::EfficiencyClass => "efficiency class (IE1..IE4)",
            FieldKind::IpCode => "IP code (e.g. IP55)",
        }
    }
}

use FieldKind::{Bool, EfficiencyClass, Integer, IpCode, Number, Text, TextList};

const ELECTRICAL: &[(&str, FieldKind)] = &[
    ("power_kw", Number),
    ("power_cv", Number),
    ("power_hp", Number),
    ("voltage_v", Number),
    ("voltage_tolerance_pct", Number),
    ("rated_current_a", Number),
    ("frequency_hz", Number),
    ("phases", Integer),
    ("power_factor", Number),
    ("power_factor_desired", Number),
    ("insulation_class", Text),
    ("temperature_rise_class", Text),
    ("efficiency_min", EfficiencyClass),
    ("efficiency_desired", EfficiencyClass),
    ("starting_category", Text),
    ("starting_method", Text),
    ("inverter_ready", Bool),
    ("insulation_resistance_min_mohm", Number),
];

const MECHANICAL: &[(&str, FieldKind)] = &[
    ("rpm", Number),
    ("rpm_tolerance_rpm", Number),
    ("rpm_tolerance_pct", Number),
    ("poles", Integer),
    ("rated_torque_nm", Number),
    ("starting_torque_pct", Number),
    ("max_torque_pct", Number),
    ("mounting_type", Text),
    ("iec_mounting", Text),
    ("coupling_type", Text),
    ("rotation_direction", Text),
    ("shaft_height_mm", Number),
    ("iec_frame", Text),
    ("shaft_type", Text),
    ("bearing_type", Text),
    ("weight_kg", Number),
    ("dimensions_mm", Text),
];

const OPERATIONAL: &[(&str, FieldKind)] = &[
    ("ip_rating", IpCode),
    ("efficiency", EfficiencyClass),
    ("duty_cycle", Text),
    ("ambient_temp_min_c", Number),
    ("ambient_temp_max_c", Number),
    ("ambient_temp_nominal_c", Number),
    ("humidity_max_pct", Number),
    ("condensing_humidity", Bool),
    ("altitude_max_m", Number),
    ("cooling_type", Text),
    ("vibration_class", Text),
    ("vibration_standard", Text),
    ("noise_max_dba", Number),
    ("noise_reference", Text),
];

const APPLICATION: &[(&str, FieldKind)] = &[
    ("pump_type", Text),
    ("pump_manufacturer", Text),
    ("pump_model", Text),
    ("fluid", Text),
    ("fluid_description", Text),
    ("flow_m3h", Number),
    ("head_m", Number),
    ("discharge_pressure_bar", Number),
    ("fluid_temp_min_c", Number),
    ("fluid_temp_max_c", Number),
    ("operating_regime", Text),
    ("environment", Text),
    ("environment_description", Text),
    ("special_conditions", Text),
    ("standards", TextList),
];

const PROTECTIONS: &[(&str, FieldKind)] = &[
    ("thermal_protection_type", Text),
    ("thermal_protection_count", Integer),
    ("thermal_protection_location", Text),
    ("terminal_box_position", Text),
    ("terminal_box_ip", Text),
    ("grounding_terminal", Bool),
];

const COMMERCIAL: &[(&str, FieldKind)] = &[
    ("warranty_min_months", Integer),
    ("warranty_desired_months", Integer),
    ("lead_time_max_days", Integer),
    ("lead_time_desired_days", Integer),
    ("budget", Number),
    ("inmetro_certification", Bool),
];

/// All known fields of a section, in declaration order.
pub fn fields(section: Section) -> &'static [(&'static str, FieldKind)] {
    match section {
        Section::Electrical => ELECTRICAL,
        Section::Mechanical => MECHANICAL,
        Section::Operational => OPERATIONAL,
        Section::Application => APPLICATION,
        Section::Protections => PROTECTIONS,
        Section::Commercial => COMMERCIAL,
    }
}

/// Declared kind of `section.field`, `None` for unknown keys.
pub fn kind_of(section: Section, field: &str) -> Option<FieldKind> {
    fields(section)
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, kind)| *kind)
}

/// Closest known field name for an unknown key (typo hint for logs/errors).
pub fn suggest(section: Section, unknown: &str) -> Option<&'static str> {
    let needle = unknown.trim().to_ascii_lowercase();
    fields(section)
        .iter()
        .map(|(name, _)| (*name, strsim::jaro_winkler(&needle, name)))
        .filter(|(_, sim)| *sim >= SUGGEST_MIN_SIMILARITY)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_section_has_unique_field_names() {
        for s in Section::ALL {
            let mut names: Vec<_> = fields(s).iter().map(|(n, _)| *n).collect();
            let len = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), len, "duplicate field in {s}");
        }
    }

    #[test]
    fn kinds_accept_expected_shapes() {
        assert!(FieldKind::Number.accepts(&json!(15.0)));
        assert!(!FieldKind::Number.accepts(&json!("15 kW")));
        assert!(FieldKind::Integer.accepts(&json!(30)));
        assert!(FieldKind::Integer.accepts(&json!(30.0)));
        assert!(!FieldKind::Integer.accepts(&json!(30.5)));
        assert!(FieldKind::TextList.accepts(&json!(["IEC 60034-1", "NBR 17094"])));
        assert!(!FieldKind::TextList.accepts(&json!([1, 2])));
        assert!(FieldKind::EfficiencyClass.accepts(&json!("ie3")));
        assert!(!FieldKind::EfficiencyClass.accepts(&json!("IE7")));
        assert!(FieldKind::IpCode.accepts(&json!("IP55")));
        assert!(!FieldKind::IpCode.accepts(&json!("waterproof")));
    }

    #[test]
    fn suggests_close_field_names_only() {
        assert_eq!(suggest(Section::Electrical, "power_kww"), Some("power_kw"));
        assert_eq!(suggest(Section::Commercial, "warranty_min_month"), Some("warranty_min_months"));
        assert_eq!(suggest(Section::Electrical, "colour"), None);
    }
}
