// src/catalog.rs
//! Motor catalog: typed catalog items, closed enums for the graded properties,
//! and a loader that isolates malformed entries instead of failing the batch.
//!
//! JSON shape (either a bare array or wrapped):
//! {
//!   "products": [
//!     { "code": "W22-15-4P", "manufacturer": "WEG",
//!       "electrical":  { "power_kw": 15.0, "rated_voltages": [380, 440], "efficiency_class": "IE3", "inverter_ready": true },
//!       "mechanical":  { "rpm": 1780 },
//!       "operational": { "ip_rating": "IP55" },
//!       "commercial":  { "lead_time_days": 60, "availability": "import", "warranty_months": 24, "base_price": 10500.0 } }
//!   ]
//! }

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::MatchError;
use crate::ranking::CandidateFailure;

/* ----------------------------
Closed variants
---------------------------- */

/// IEC 60034-30 efficiency class. Ordered: `IE1 < IE2 < IE3 < IE4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EfficiencyClass {
    IE1,
    IE2,
    IE3,
    IE4,
}

impl FromStr for EfficiencyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        match norm.as_str() {
            "IE1" => Ok(EfficiencyClass::IE1),
            "IE2" => Ok(EfficiencyClass::IE2),
            "IE3" => Ok(EfficiencyClass::IE3),
            "IE4" => Ok(EfficiencyClass::IE4),
            _ => Err(format!("unknown efficiency class '{s}'")),
        }
    }
}

impl TryFrom<String> for EfficiencyClass {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EfficiencyClass> for String {
    fn from(c: EfficiencyClass) -> Self {
        c.to_string()
    }
}

impl fmt::Display for EfficiencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EfficiencyClass::IE1 => "IE1",
            EfficiencyClass::IE2 => "IE2",
            EfficiencyClass::IE3 => "IE3",
            EfficiencyClass::IE4 => "IE4",
        };
        f.write_str(s)
    }
}

/// Commercial availability category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    Domestic,
    Import,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Availability::InStock => "in_stock",
            Availability::Domestic => "domestic",
            Availability::Import => "import",
        };
        f.write_str(s)
    }
}

static IP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*IP\s*([0-6X])([0-9X])[A-DHMSW]?\s*$").expect("ip code regex"));

/// Ingress protection code as `(solids, liquids)` digits. `X` parses as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpRating {
    pub solids: u8,
    pub liquids: u8,
}

impl IpRating {
    pub const fn new(solids: u8, liquids: u8) -> Self {
        Self { solids, liquids }
    }

    /// Both digits at least as high as `required`.
    pub fn covers(&self, required: &IpRating) -> bool {
        self.solids >= required.solids && self.liquids >= required.liquids
    }
}

impl FromStr for IpRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = IP_CODE
            .captures(s)
            .ok_or_else(|| format!("unparsable IP code '{s}'"))?;
        let digit = |i: usize| -> u8 {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<u8>().ok())
                .unwrap_or(0)
        };
        Ok(IpRating::new(digit(1), digit(2)))
    }
}

impl TryFrom<String> for IpRating {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpRating> for String {
    fn from(ip: IpRating) -> Self {
        ip.to_string()
    }
}

impl fmt::Display for IpRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP{}{}", self.solids, self.liquids)
    }
}

/* ----------------------------
Catalog item
---------------------------- */

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElectricalSpec {
    #[serde(default)]
    pub power_kw: Option<f64>,
    #[serde(default)]
    pub rated_voltages: Vec<f64>,
    /// Declared tolerance band around every rated voltage, in percent.
    #[serde(default)]
    pub voltage_tolerance_pct: Option<f64>,
    #[serde(default)]
    pub efficiency_class: Option<EfficiencyClass>,
    #[serde(default)]
    pub inverter_ready: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_current_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poles: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MechanicalSpec {
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shaft_height_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationalSpec {
    #[serde(default)]
    pub ip_rating: Option<IpRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulation_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommercialSpec {
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub warranty_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_with_taxes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// One catalog motor. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub code: String,
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub electrical: ElectricalSpec,
    #[serde(default)]
    pub mechanical: MechanicalSpec,
    #[serde(default)]
    pub operational: OperationalSpec,
    #[serde(default)]
    pub commercial: CommercialSpec,
}

impl CatalogItem {
    /// Fields the rubric needs that this item does not declare.
    pub fn missing_scoring_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.electrical.power_kw.is_none() {
            missing.push("electrical.power_kw");
        }
        if self.electrical.rated_voltages.is_empty() {
            missing.push("electrical.rated_voltages");
        }
        if self.electrical.efficiency_class.is_none() {
            missing.push("electrical.efficiency_class");
        }
        if self.electrical.inverter_ready.is_none() {
            missing.push("electrical.inverter_ready");
        }
        if self.mechanical.rpm.is_none() {
            missing.push("mechanical.rpm");
        }
        if self.operational.ip_rating.is_none() {
            missing.push("operational.ip_rating");
        }
        if self.commercial.lead_time_days.is_none() {
            missing.push("commercial.lead_time_days");
        }
        if self.commercial.availability.is_none() {
            missing.push("commercial.availability");
        }
        if self.commercial.warranty_months.is_none() {
            missing.push("commercial.warranty_months");
        }
        missing
    }
}

/* ----------------------------
Loading
---------------------------- */

/// Result of loading a catalog: valid items plus rejected entries.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub items: Vec<CatalogItem>,
    pub rejected: Vec<CandidateFailure>,
}

/// Load a catalog JSON file (bare array or `{"products": [...]}`).
pub fn load_catalog_from(path: &Path) -> Result<CatalogLoad> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading catalog from {}", path.display()))?;
    let root: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing catalog JSON {}", path.display()))?;
    let load = parse_catalog_value(root)?;
    info!(
        target: "catalog",
        path = %path.display(),
        items = load.items.len(),
        rejected = load.rejected.len(),
        "catalog loaded"
    );
    Ok(load)
}

/// Split a catalog document into items, converting every entry on its own.
pub fn parse_catalog_value(root: Value) -> Result<CatalogLoad> {
    let entries = match root {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => match obj.remove("products") {
            Some(Value::Array(entries)) => entries,
            _ => anyhow::bail!("catalog object must contain a \"products\" array"),
        },
        _ => anyhow::bail!("catalog must be an array or an object with \"products\""),
    };
    Ok(parse_entries(entries))
}

/// Deserialize each entry independently; failures never abort the batch.
pub fn parse_entries(entries: Vec<Value>) -> CatalogLoad {
    let mut load = CatalogLoad::default();
    for entry in entries {
        match parse_entry(entry) {
            Ok(item) => load.items.push(item),
            Err(e) => {
                warn!(target: "catalog", error = %e, "catalog entry rejected");
                load.rejected.push(CandidateFailure::from_error(&e));
            }
        }
    }
    load
}

fn parse_entry(entry: Value) -> Result<CatalogItem, MatchError> {
    // Best-effort identity for the failure report.
    let ident = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string()
    };
    let (code, manufacturer) = (ident("code"), ident("manufacturer"));

    let item: CatalogItem =
        serde_json::from_value(entry).map_err(|e| MatchError::InvalidCatalogEntry {
            code: code.clone(),
            manufacturer: manufacturer.clone(),
            reason: e.to_string(),
        })?;

    if item.code.trim().is_empty() {
        return Err(MatchError::InvalidCatalogEntry {
            code,
            manufacturer,
            reason: "empty product code".into(),
        });
    }
    Ok(item)
}
