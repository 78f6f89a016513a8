// src/scoring/mod.rs
//! # Scoring Engine
//! Deterministic 100-point rubric: one catalog item against one consolidated
//! requirement set → [`ScoreBreakdown`]. No I/O, safe to share across threads.
//!
//! Eliminatory criteria (power, voltage, protection) award 0 when unmet but do
//! not veto the total. An unspecified requirement for them yields 0 points and
//! the observation "requirement unspecified" instead of failing the candidate.

pub mod rubric;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

use crate::catalog::{Availability, CatalogItem, EfficiencyClass, IpRating};
use crate::error::MatchError;
use crate::requirements::{ConsolidatedRequirementSet, RequirementProfile};

pub const UNSPECIFIED: &str = "requirement unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Power,
    Voltage,
    Efficiency,
    Protection,
    Rotation,
    Inverter,
    LeadTime,
    Availability,
    Warranty,
}

impl Criterion {
    pub const ALL: [Criterion; 9] = [
        Criterion::Power,
        Criterion::Voltage,
        Criterion::Efficiency,
        Criterion::Protection,
        Criterion::Rotation,
        Criterion::Inverter,
        Criterion::LeadTime,
        Criterion::Availability,
        Criterion::Warranty,
    ];

    pub fn max_points(self) -> u32 {
        match self {
            Criterion::Power => rubric::POWER_MAX,
            Criterion::Voltage => rubric::VOLTAGE_MAX,
            Criterion::Efficiency => rubric::EFFICIENCY_MAX,
            Criterion::Protection => rubric::PROTECTION_MAX,
            Criterion::Rotation => rubric::ROTATION_MAX,
            Criterion::Inverter => rubric::INVERTER_MAX,
            Criterion::LeadTime => rubric::LEAD_TIME_MAX,
            Criterion::Availability => rubric::AVAILABILITY_MAX,
            Criterion::Warranty => rubric::WARRANTY_MAX,
        }
    }

    /// Failing it awards 0 (but never zeroes the total).
    pub fn is_eliminatory(self) -> bool {
        matches!(
            self,
            Criterion::Power | Criterion::Voltage | Criterion::Protection
        )
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Criterion::Power => "power",
            Criterion::Voltage => "voltage",
            Criterion::Efficiency => "efficiency",
            Criterion::Protection => "protection",
            Criterion::Rotation => "rotation",
            Criterion::Inverter => "inverter",
            Criterion::LeadTime => "lead_time",
            Criterion::Availability => "availability",
            Criterion::Warranty => "warranty",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Recommended,
    Alternative,
    Conditional,
    NotRecommended,
}

/// Result of one criterion, with the compared values for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub points_awarded: u32,
    pub points_max: u32,
    pub meets_requirement: bool,
    pub observation: String,
    pub required: Value,
    pub offered: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Always the 9 criteria, in rubric order.
    pub criteria: Vec<CriterionScore>,
    pub total_score: u32,
    pub classification: Classification,
}

impl ScoreBreakdown {
    fn from_criteria(criteria: Vec<CriterionScore>) -> Self {
        let total_score = criteria.iter().map(|c| c.points_awarded).sum();
        Self {
            classification: rubric::classify(total_score),
            criteria,
            total_score,
        }
    }

    pub fn get(&self, criterion: Criterion) -> Option<&CriterionScore> {
        self.criteria.iter().find(|c| c.criterion == criterion)
    }

    pub fn points(&self, criterion: Criterion) -> u32 {
        self.get(criterion).map_or(0, |c| c.points_awarded)
    }

    /// Every criterion reached its maximum.
    pub fn is_perfect(&self) -> bool {
        self.criteria.iter().all(|c| c.points_awarded == c.points_max)
    }
}

/// Item values the rubric reads, all present.
struct ItemView<'a> {
    power_kw: f64,
    voltages: &'a [f64],
    voltage_tolerance_pct: f64,
    efficiency: EfficiencyClass,
    inverter_ready: bool,
    rpm: f64,
    ip: IpRating,
    lead_time_days: u32,
    availability: Availability,
    warranty_months: u32,
}

impl<'a> ItemView<'a> {
    fn of(item: &'a CatalogItem) -> Result<Self, MatchError> {
        let e = &item.electrical;
        let c = &item.commercial;
        match (
            e.power_kw,
            e.efficiency_class,
            e.inverter_ready,
            item.mechanical.rpm,
            item.operational.ip_rating,
            c.lead_time_days,
            c.availability,
            c.warranty_months,
        ) {
            (
                Some(power_kw),
                Some(efficiency),
                Some(inverter_ready),
                Some(rpm),
                Some(ip),
                Some(lead_time_days),
                Some(availability),
                Some(warranty_months),
            ) if !e.rated_voltages.is_empty() => Ok(Self {
                power_kw,
                voltages: &e.rated_voltages,
                voltage_tolerance_pct: e.voltage_tolerance_pct.unwrap_or(0.0).max(0.0),
                efficiency,
                inverter_ready,
                rpm,
                ip,
                lead_time_days,
                availability,
                warranty_months,
            }),
            _ => Err(MatchError::IncompleteCatalogItem {
                code: item.code.clone(),
                manufacturer: item.manufacturer.clone(),
                missing: item.missing_scoring_fields(),
            }),
        }
    }
}

/// Scores catalog items against one requirement set. The profile is resolved once.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    profile: RequirementProfile,
}

impl ScoringEngine {
    pub fn new(requirements: &ConsolidatedRequirementSet) -> Self {
        Self::from_profile(RequirementProfile::from_consolidated(requirements))
    }

    pub fn from_profile(profile: RequirementProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &RequirementProfile {
        &self.profile
    }

    pub fn score(&self, item: &CatalogItem) -> Result<ScoreBreakdown, MatchError> {
        let v = ItemView::of(item)?;

        let criteria = vec![
            self.power(v.power_kw)
                .unwrap_or_else(|_| unscorable(Criterion::Power, json!(v.power_kw), None)),
            self.voltage(v.voltages, v.voltage_tolerance_pct)
                .unwrap_or_else(|_| unscorable(Criterion::Voltage, json!(v.voltages), None)),
            self.efficiency(v.efficiency),
            self.protection(v.ip)
                .unwrap_or_else(|_| {
                    unscorable(Criterion::Protection, json!(v.ip.to_string()), None)
                }),
            self.rotation(v.rpm).unwrap_or_else(|_| {
                unscorable(Criterion::Rotation, json!(v.rpm), Some(rubric::ROTATION_FLOOR))
            }),
            self.inverter(v.inverter_ready),
            self.lead_time(v.lead_time_days),
            availability(v.availability),
            self.warranty(v.warranty_months),
        ];

        let breakdown = ScoreBreakdown::from_criteria(criteria);
        debug!(
            target: "scoring",
            code = %item.code,
            total = breakdown.total_score,
            classification = ?breakdown.classification,
            "candidate scored"
        );
        Ok(breakdown)
    }

    fn power(&self, offered: f64) -> Result<CriterionScore, MatchError> {
        let required = self.profile.power_kw.ok_or(MatchError::UnscorableRequirement {
            criterion: Criterion::Power,
        })?;
        let dev = (offered - required).abs() / required;
        let points = rubric::power_points(dev);
        Ok(CriterionScore {
            criterion: Criterion::Power,
            points_awarded: points,
            points_max: rubric::POWER_MAX,
            meets_requirement: points > 0,
            observation: format!(
                "{offered} kW offered vs {required} kW required ({:.2}% deviation)",
                dev * 100.0
            ),
            required: json!(required),
            offered: json!(offered),
            deviation_pct: Some(pct(dev)),
        })
    }

    fn voltage(&self, rated: &[f64], tolerance_pct: f64) -> Result<CriterionScore, MatchError> {
        let required = self.profile.voltage_v.ok_or(MatchError::UnscorableRequirement {
            criterion: Criterion::Voltage,
        })?;
        let hit = rated
            .iter()
            .find(|v| (**v - required).abs() <= **v * tolerance_pct / 100.0);
        let observation = match hit {
            Some(v) => format!("{required} V served by rated {v} V (±{tolerance_pct}%)"),
            None => format!("{required} V not among rated voltages {rated:?}"),
        };
        Ok(CriterionScore {
            criterion: Criterion::Voltage,
            points_awarded: if hit.is_some() { rubric::VOLTAGE_MAX } else { 0 },
            points_max: rubric::VOLTAGE_MAX,
            meets_requirement: hit.is_some(),
            observation,
            required: json!(required),
            offered: json!(rated),
            deviation_pct: None,
        })
    }

    fn efficiency(&self, offered: EfficiencyClass) -> CriterionScore {
        let meets = self.profile.efficiency_min.is_none_or(|min| offered >= min);
        let observation = match self.profile.efficiency_min {
            Some(min) if meets => format!("{offered} meets minimum {min}"),
            Some(min) => format!("{offered} below minimum {min}"),
            None => format!("{offered}; no minimum class specified"),
        };
        CriterionScore {
            criterion: Criterion::Efficiency,
            points_awarded: rubric::efficiency_points(offered),
            points_max: rubric::EFFICIENCY_MAX,
            meets_requirement: meets,
            observation,
            required: self
                .profile
                .efficiency_min
                .map_or(Value::Null, |c| json!(c.to_string())),
            offered: json!(offered.to_string()),
            deviation_pct: None,
        }
    }

    fn protection(&self, offered: IpRating) -> Result<CriterionScore, MatchError> {
        let required = self.profile.ip_min.ok_or(MatchError::UnscorableRequirement {
            criterion: Criterion::Protection,
        })?;
        let points = rubric::protection_points(offered, required);
        let observation = match points {
            rubric::PROTECTION_MAX => format!("{offered} covers {required}"),
            0 => format!("{offered} below {required}"),
            _ => format!("{offered} below {required}, partial credit"),
        };
        Ok(CriterionScore {
            criterion: Criterion::Protection,
            points_awarded: points,
            points_max: rubric::PROTECTION_MAX,
            meets_requirement: points == rubric::PROTECTION_MAX,
            observation,
            required: json!(required.to_string()),
            offered: json!(offered.to_string()),
            deviation_pct: None,
        })
    }

    fn rotation(&self, offered: f64) -> Result<CriterionScore, MatchError> {
        let required = self.profile.rpm.ok_or(MatchError::UnscorableRequirement {
            criterion: Criterion::Rotation,
        })?;
        let tolerance = self.profile.rpm_tolerance_pct;
        let dev = (offered - required).abs() / required;
        let meets = dev * 100.0 <= tolerance;
        Ok(CriterionScore {
            criterion: Criterion::Rotation,
            points_awarded: rubric::rotation_points(dev),
            points_max: rubric::ROTATION_MAX,
            meets_requirement: meets,
            observation: format!(
                "{offered} rpm vs {required} rpm ({:.2}% deviation, tolerance ±{tolerance}%)",
                dev * 100.0
            ),
            required: json!(required),
            offered: json!(offered),
            deviation_pct: Some(pct(dev)),
        })
    }

    fn inverter(&self, ready: bool) -> CriterionScore {
        let required = self.profile.inverter_required.unwrap_or(false);
        let observation = match (ready, required) {
            (true, _) => "inverter-duty ready".to_string(),
            (false, true) => "inverter operation required but not supported".to_string(),
            (false, false) => "not inverter-duty ready; not required".to_string(),
        };
        CriterionScore {
            criterion: Criterion::Inverter,
            points_awarded: rubric::inverter_points(ready),
            points_max: rubric::INVERTER_MAX,
            meets_requirement: ready || !required,
            observation,
            required: json!(self.profile.inverter_required),
            offered: json!(ready),
            deviation_pct: None,
        }
    }

    fn lead_time(&self, days: u32) -> CriterionScore {
        let max = self.profile.lead_time_max_days;
        let observation = match max {
            Some(m) if days > m => format!("{days} days exceeds maximum of {m} days"),
            Some(m) => format!("{days} days within maximum of {m} days"),
            None => format!("{days} days"),
        };
        CriterionScore {
            criterion: Criterion::LeadTime,
            points_awarded: rubric::lead_time_points(days),
            points_max: rubric::LEAD_TIME_MAX,
            meets_requirement: max.is_none_or(|m| days <= m),
            observation,
            required: json!(max),
            offered: json!(days),
            deviation_pct: None,
        }
    }

    fn warranty(&self, months: u32) -> CriterionScore {
        let min = self.profile.warranty_min_months;
        let observation = match min {
            Some(m) if months < m => format!("{months} months below minimum of {m}"),
            Some(m) => format!("{months} months meets minimum of {m}"),
            None => format!("{months} months"),
        };
        CriterionScore {
            criterion: Criterion::Warranty,
            points_awarded: rubric::warranty_points(months),
            points_max: rubric::WARRANTY_MAX,
            meets_requirement: min.is_none_or(|m| months >= m),
            observation,
            required: json!(min),
            offered: json!(months),
            deviation_pct: None,
        }
    }
}

fn availability(a: Availability) -> CriterionScore {
    CriterionScore {
        criterion: Criterion::Availability,
        points_awarded: rubric::availability_points(a),
        points_max: rubric::AVAILABILITY_MAX,
        meets_requirement: a != Availability::Import,
        observation: match a {
            Availability::InStock => "available from stock".to_string(),
            Availability::Domestic => "domestic supply".to_string(),
            Availability::Import => "imported, no local stock".to_string(),
        },
        required: Value::Null,
        offered: json!(a.to_string()),
        deviation_pct: None,
    }
}

/// Unspecified-requirement policy: unmet, floor points, fixed observation.
fn unscorable(criterion: Criterion, offered: Value, floor: Option<u32>) -> CriterionScore {
    CriterionScore {
        criterion,
        points_awarded: floor.unwrap_or(0),
        points_max: criterion.max_points(),
        meets_requirement: false,
        observation: UNSPECIFIED.to_string(),
        required: Value::Null,
        offered,
        deviation_pct: None,
    }
}

fn pct(dev: f64) -> f64 {
    (dev * 10_000.0).round() / 100.0
}

/// Score one item against a consolidated set (resolves the profile per call;
/// use [`ScoringEngine`] for batches).
pub fn score(
    requirements: &ConsolidatedRequirementSet,
    item: &CatalogItem,
) -> Result<ScoreBreakdown, MatchError> {
    ScoringEngine::new(requirements).score(item)
}
