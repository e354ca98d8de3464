//! End-to-end conversion of recorded `cypress run` results, per schema version.

mod common;

use chrono::{DateTime, Duration, Utc};
use common::*;
use cypress_xray::conversion::converter::{ConversionOptions, ConversionRecord};
use cypress_xray::conversion::{convert, native_issue_keys};
use cypress_xray::status::{to_vendor_status, Status};

fn utc(text: &str) -> DateTime<Utc> {
    text.parse().unwrap()
}

#[test]
fn test_legacy_keyless_test_conversion() {
    let converter = converter_for("legacy_results.json");
    assert_eq!(converter.name(), "legacy");

    let records = converter.get_conversions(&ConversionOptions::default());
    let first = records[0].as_success().expect("first test converts");
    assert_eq!(first.duration, 244);
    assert_eq!(first.issue_key, None);
    assert_eq!(first.status, Status::Passed);
    assert_eq!(first.started_at, utc("2022-11-28T17:41:15.091Z"));
    assert_eq!(first.title, "xray upload demo should look for paragraph elements");
    assert_eq!(first.spec.filepath, "/home/user/project/cypress/e2e/demo.cy.ts");

    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(value["kind"], "success");
}

#[test]
fn test_legacy_unknown_status_isolated() {
    let converter = converter_for("legacy_results.json");
    let records = converter.get_conversions(&ConversionOptions::default());
    assert_eq!(records.len(), 4);

    let errors: Vec<_> = records
        .iter()
        .filter_map(|r| match r {
            ConversionRecord::Error(f) => Some(f),
            ConversionRecord::Success(_) => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "xray upload demo CYP-40 should break");
    assert_eq!(errors[0].error.to_string(), "Unknown Cypress test status: broken");

    // Siblings after the broken attempt still convert.
    let retried: Vec<_> = records[2..].iter().map(|r| r.as_success().unwrap()).collect();
    assert_eq!(retried[0].status, Status::Failed);
    assert_eq!(retried[1].status, Status::Passed);
    assert_eq!(retried[1].issue_key.as_deref(), Some("CYP-41"));
}

#[test]
fn test_legacy_last_attempt_screenshots() {
    let converter = converter_for("legacy_results.json");
    assert_eq!(converter.get_screenshots("CYP-41", &ConversionOptions::default()).len(), 1);
    assert!(converter.get_screenshots("CYP-41", &ConversionOptions::last_attempt()).is_empty());
    assert!(converter.get_non_attributable_screenshots(&ConversionOptions::default()).is_empty());
}

#[test]
fn test_current_start_time_accumulation() {
    let converter = converter_for("current_results.json");
    assert_eq!(converter.name(), "current");

    let records = converter.get_conversions(&ConversionOptions::last_attempt());
    let t0 = utc("2023-09-09T10:59:28.826Z");
    let starts: Vec<_> = records.iter().map(|r| r.as_success().unwrap().started_at).collect();
    assert_eq!(
        starts,
        vec![t0, t0 + Duration::milliseconds(638), t0 + Duration::milliseconds(638 + 123)]
    );
}

#[test]
fn test_current_every_attempt_converted() {
    let converter = converter_for("current_results.json");
    let records = converter.get_conversions(&ConversionOptions::default());
    assert_eq!(records.len(), 6 + 3 + 2);
    let last = converter.get_conversions(&ConversionOptions::last_attempt());
    let statuses: Vec<_> = last.iter().map(|r| r.as_success().unwrap().status).collect();
    assert_eq!(statuses, vec![Status::Passed, Status::Passed, Status::Failed]);
}

#[test]
fn test_current_retry_suppression() {
    let converter = converter_for("current_results.json");
    assert_eq!(converter.get_screenshots("CYP-1", &ConversionOptions::default()).len(), 5);
    assert!(converter.get_screenshots("CYP-1", &ConversionOptions::last_attempt()).is_empty());
}

#[test]
fn test_current_iteration_disambiguation() {
    let converter = converter_for("current_results.json");
    assert_eq!(converter.get_screenshots("CYP-2", &ConversionOptions::default()).len(), 9);
    assert_eq!(
        converter.get_screenshots("CYP-2", &ConversionOptions::last_attempt()),
        vec![
            screenshot("CYP-2 my screenshot (attempt 3).png"),
            screenshot("CYP-2 my screenshot (attempt 3) (1).png"),
            screenshot("CYP-2 my screenshot (attempt 3) (2).png"),
        ]
    );
}

#[test]
fn test_current_final_failure_kept() {
    let converter = converter_for("current_results.json");
    assert_eq!(
        converter.get_screenshots("CYP-3", &ConversionOptions::last_attempt()),
        vec![screenshot("retries -- CYP-3 broken (failed) (attempt 2).png")]
    );
}

#[test]
fn test_current_screenshots_idempotent() {
    let converter = converter_for("current_results.json");
    let options = ConversionOptions::last_attempt();
    let first = converter.get_screenshots("CYP-2", &options);
    let second = converter.get_screenshots("CYP-2", &options);
    assert_eq!(first, second);
}

#[test]
fn test_current_non_attributable() {
    let converter = converter_for("current_results.json");
    assert_eq!(
        converter.get_non_attributable_screenshots(&ConversionOptions::last_attempt()),
        vec![screenshot("overview.png")]
    );
}

#[test]
fn test_convert_bundles_screenshots_per_key() {
    let converter = converter_for("current_results.json");
    let output = convert(converter.as_ref(), &ConversionOptions::last_attempt());
    assert_eq!(output.conversions.len(), 3);
    assert!(!output.screenshots.contains_key("CYP-1"));
    assert_eq!(output.screenshots["CYP-2"].len(), 3);
    assert_eq!(output.screenshots["CYP-3"].len(), 1);
    assert_eq!(output.non_attributable, vec![screenshot("overview.png")]);

    let summary = output.summary();
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors, 0);
}

#[test]
fn test_native_issue_keys_from_fixture() {
    let converter = converter_for("legacy_results.json");
    assert_eq!(
        native_issue_keys(converter.as_ref(), PROJECT_KEY),
        vec!["CYP-40".to_string(), "CYP-41".to_string()]
    );
}

#[test]
fn test_vendor_status_of_converted_records() {
    let converter = converter_for("current_results.json");
    let records = converter.get_conversions(&ConversionOptions::last_attempt());
    let vendor: Vec<String> = records
        .iter()
        .map(|r| to_vendor_status(r.as_success().unwrap().status, true, None))
        .collect();
    assert_eq!(vendor, vec!["PASSED", "PASSED", "FAILED"]);
}
