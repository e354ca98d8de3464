#![allow(dead_code)]

use std::path::PathBuf;

use cypress_xray::conversion::converter::RunConverter;

pub const PROJECT_KEY: &str = "CYP";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Converter for a results fixture, selected by its Cypress version.
pub fn converter_for(name: &str) -> Box<dyn RunConverter> {
    cypress_xray::conversion::converter_from_json(PROJECT_KEY, &read_fixture(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

pub const SCREENSHOT_DIR: &str = "/home/user/project/cypress/screenshots/retries.cy.ts/";

pub fn screenshot(name: &str) -> String {
    format!("{}{}", SCREENSHOT_DIR, name)
}
