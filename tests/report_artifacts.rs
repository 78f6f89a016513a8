// tests/report_artifacts.rs
//
// Batch pipeline on disk: draft files + catalog file → both JSON artifacts.

use serde_json::{json, Value};
use std::fs;

use motor_match::catalog::load_catalog_from;
use motor_match::report::{
    load_drafts_from, run_analysis, write_artifacts, ANALYSIS_FILE, CONSOLIDATED_FILE,
};
use motor_match::requirements::UnknownFieldPolicy;

#[test]
fn pipeline_writes_both_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();

    // One file with a single draft, one with an array of drafts.
    let memo = dir.join("memo.json");
    fs::write(
        &memo,
        json!({
            "source_id": "memo.pdf",
            "sections": { "electrical": { "power_kw": 15.0, "voltage_v": 380 } },
            "confidence": { "electrical": 0.6 }
        })
        .to_string(),
    )
    .unwrap();
    let pack = dir.join("pack.json");
    fs::write(
        &pack,
        json!([
            { "source_id": "datasheet.pdf",
              "sections": { "electrical": { "power_kw": 18.5 }, "mechanical": { "rpm": 1750 } },
              "confidence": { "electrical": 0.9, "mechanical": 0.9 } },
            { "source_id": "email.txt",
              "sections": { "commercial": { "lead_time_max_days": 30, "budget": 12000.0 } },
              "confidence": { "commercial": 0.5 } }
        ])
        .to_string(),
    )
    .unwrap();

    let catalog_path = dir.join("catalog.json");
    fs::write(
        &catalog_path,
        json!([
            { "code": "W22-18", "manufacturer": "WEG",
              "electrical": { "power_kw": 18.5, "rated_voltages": [380], "efficiency_class": "IE3", "inverter_ready": true },
              "mechanical": { "rpm": 1760 }, "operational": { "ip_rating": "IP55" },
              "commercial": { "lead_time_days": 20, "availability": "domestic", "warranty_months": 18, "base_price": 11800.0 } }
        ])
        .to_string(),
    )
    .unwrap();

    let drafts = load_drafts_from(&[memo, pack], UnknownFieldPolicy::Extension).unwrap();
    assert_eq!(drafts.len(), 3);
    let catalog = load_catalog_from(&catalog_path).unwrap();
    let report = run_analysis(&drafts, &catalog, false).unwrap();

    let out = dir.join("outputs").join("run-1");
    let (consolidated, analysis) = write_artifacts(&out, &report).unwrap();
    assert!(consolidated.ends_with(CONSOLIDATED_FILE));
    assert!(analysis.ends_with(ANALYSIS_FILE));

    let set: Value = serde_json::from_str(&fs::read_to_string(&consolidated).unwrap()).unwrap();
    assert_eq!(set["sections"]["electrical"]["fields"]["power_kw"], json!(18.5));
    assert_eq!(set["conflicts"][0]["field"], "power_kw");

    let a: Value = serde_json::from_str(&fs::read_to_string(&analysis).unwrap()).unwrap();
    assert_eq!(
        a["metadata"]["source_documents"],
        json!(["memo.pdf", "datasheet.pdf", "email.txt"])
    );
    assert_eq!(a["ranking"][0]["code"], "W22-18");
    assert_eq!(a["ranking"][0]["within_budget"], json!(true));
    assert_eq!(a["metadata"]["requirements_digest"].as_str().unwrap().len(), 16);
}

#[test]
fn invalid_draft_file_names_the_file() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("bad.json");
    fs::write(
        &p,
        json!({ "source_id": "bad.pdf", "sections": { "mechanical": { "rpm": "fast" } } })
            .to_string(),
    )
    .unwrap();
    let err = load_drafts_from(&[p], UnknownFieldPolicy::Extension).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("bad.json"), "{msg}");
    assert!(msg.contains("mechanical.rpm"), "{msg}");
}
