// tests/scoring_rubric.rs
//
// End-to-end rubric checks: draft JSON → consolidated set → ScoreBreakdown.

use serde_json::{json, Value};

use motor_match::catalog::CatalogItem;
use motor_match::requirements::{consolidate, ConsolidatedRequirementSet, RequirementDraft};
use motor_match::scoring::{score, Classification, Criterion, ScoringEngine, UNSPECIFIED};
use motor_match::MatchError;

fn requirements(sections: Value) -> ConsolidatedRequirementSet {
    let d: RequirementDraft = serde_json::from_value(json!({
        "source_id": "pump-datasheet.pdf",
        "sections": sections,
        "confidence": { "electrical": 0.9, "mechanical": 0.9, "operational": 0.8, "commercial": 0.7 }
    }))
    .unwrap();
    consolidate(&[d]).unwrap()
}

fn pump_requirements() -> ConsolidatedRequirementSet {
    requirements(json!({
        "electrical": { "power_kw": 15.0, "voltage_v": 380, "efficiency_min": "IE3", "inverter_ready": true },
        "mechanical": { "rpm": 1750 },
        "operational": { "ip_rating": "IP55" },
        "commercial": { "lead_time_max_days": 30, "warranty_min_months": 18 }
    }))
}

fn item(v: Value) -> CatalogItem {
    serde_json::from_value(v).unwrap()
}

fn imported_ie3() -> CatalogItem {
    item(json!({
        "code": "W22-15-4P", "manufacturer": "WEG",
        "electrical": { "power_kw": 15.0, "rated_voltages": [380, 440], "efficiency_class": "IE3", "inverter_ready": true },
        "mechanical": { "rpm": 1780 },
        "operational": { "ip_rating": "IP55" },
        "commercial": { "lead_time_days": 60, "availability": "import", "warranty_months": 24 }
    }))
}

#[test]
fn imported_ie3_scores_88_alternative() {
    let b = score(&pump_requirements(), &imported_ie3()).unwrap();

    let expected = [
        (Criterion::Power, 20),
        (Criterion::Voltage, 15),
        (Criterion::Efficiency, 15),
        (Criterion::Protection, 10),
        (Criterion::Rotation, 8),
        (Criterion::Inverter, 10),
        (Criterion::LeadTime, 3),
        (Criterion::Availability, 2),
        (Criterion::Warranty, 5),
    ];
    for (criterion, points) in expected {
        assert_eq!(b.points(criterion), points, "{criterion}");
    }
    assert_eq!(b.total_score, 88);
    assert_eq!(b.classification, Classification::Alternative);
}

#[test]
fn ceiling_is_reached_only_when_every_criterion_is_maxed() {
    let engine = ScoringEngine::new(&pump_requirements());

    let mut best = imported_ie3();
    best.mechanical.rpm = Some(1750.0);
    best.commercial.lead_time_days = Some(7);
    best.commercial.availability = Some(motor_match::catalog::Availability::InStock);
    let b = engine.score(&best).unwrap();
    assert_eq!(b.total_score, 100);
    assert!(b.is_perfect());

    // One point shy anywhere keeps it below 100.
    best.commercial.availability = Some(motor_match::catalog::Availability::Domestic);
    let b = engine.score(&best).unwrap();
    assert_eq!(b.total_score, 99);
    assert!(!b.is_perfect());
    assert_eq!(b.classification, Classification::Recommended);
}

#[test]
fn missing_requirements_follow_the_unspecified_policy() {
    let req = requirements(json!({ "commercial": { "warranty_min_months": 12 } }));
    let b = score(&req, &imported_ie3()).unwrap();

    for c in [Criterion::Power, Criterion::Voltage, Criterion::Protection] {
        let s = b.get(c).unwrap();
        assert_eq!(s.points_awarded, 0, "{c}");
        assert!(!s.meets_requirement);
        assert_eq!(s.observation, UNSPECIFIED);
    }
    assert_eq!(b.points(Criterion::Rotation), 2);
    // Requirement-free tables still score and count as met.
    let eff = b.get(Criterion::Efficiency).unwrap();
    assert_eq!(eff.points_awarded, 15);
    assert!(eff.meets_requirement);
    assert_eq!(b.total_score, 15 + 2 + 10 + 3 + 2 + 5);
}

#[test]
fn breakdown_serializes_with_wire_names() {
    let b = score(&pump_requirements(), &imported_ie3()).unwrap();
    let v = serde_json::to_value(&b).unwrap();
    assert_eq!(v["classification"], "ALTERNATIVE");
    assert_eq!(v["criteria"][6]["criterion"], "lead_time");
    assert_eq!(v["criteria"].as_array().unwrap().len(), 9);
}

#[test]
fn incomplete_item_names_every_gap() {
    let bare = item(json!({ "code": "NX-1", "manufacturer": "Nidec",
        "electrical": { "power_kw": 15.0, "rated_voltages": [380] } }));
    match score(&pump_requirements(), &bare) {
        Err(MatchError::IncompleteCatalogItem { code, missing, .. }) => {
            assert_eq!(code, "NX-1");
            assert_eq!(missing.len(), 7);
            assert!(missing.contains(&"commercial.availability"));
        }
        other => panic!("expected incomplete item, got {other:?}"),
    }
}
