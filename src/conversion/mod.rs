pub mod converter;
pub mod current_converter;
pub mod legacy_converter;
pub mod schema;
pub mod screenshots;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use converter::*;
use current_converter::CurrentRunConverter;
use legacy_converter::LegacyRunConverter;
use schema::RunResults;

use crate::issue_key::extract_issue_key;
use crate::status::Status;
use crate::{Error, Result};

/// Result schema generation, decided by the Cypress major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Cypress 12: per-attempt timings and screenshots.
    Legacy,
    /// Cypress 13 and later.
    Current,
}

impl SchemaVersion {
    pub fn detect(cypress_version: &str) -> Result<Self> {
        let major: u32 = cypress_version
            .trim()
            .trim_start_matches('v')
            .split('.')
            .next()
            .and_then(|m| m.parse().ok())
            .ok_or_else(|| Error::UnsupportedVersion(cypress_version.to_string()))?;
        match major {
            0..=11 => Err(Error::UnsupportedVersion(cypress_version.to_string())),
            12 => Ok(SchemaVersion::Legacy),
            _ => Ok(SchemaVersion::Current),
        }
    }
}

/// Parse `cypress run` results and pick the converter for their schema.
pub fn converter_from_json(project_key: &str, json: &str) -> Result<Box<dyn RunConverter>> {
    let results: RunResults = serde_json::from_str(json)?;
    let version = SchemaVersion::detect(&results.cypress_version)?;
    tracing::debug!("Cypress {} results use the {:?} schema", results.cypress_version, version);
    let converter: Box<dyn RunConverter> = match version {
        SchemaVersion::Legacy => Box::new(LegacyRunConverter::new(
            project_key,
            serde_json::from_value(results.runs)?,
        )),
        SchemaVersion::Current => Box::new(CurrentRunConverter::new(
            project_key,
            serde_json::from_value(results.runs)?,
        )),
    };
    Ok(converter)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub passed: u32,
    pub failed: u32,
    pub pending: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Everything the upload step needs from one conversion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutput {
    pub conversions: Vec<ConversionRecord>,
    pub screenshots: BTreeMap<String, Vec<String>>,
    pub non_attributable: Vec<String>,
}

impl ConversionOutput {
    pub fn summary(&self) -> ConversionSummary {
        let mut summary = ConversionSummary::default();
        for record in &self.conversions {
            match record {
                ConversionRecord::Success(c) => match c.status {
                    Status::Passed => summary.passed += 1,
                    Status::Failed => summary.failed += 1,
                    Status::Pending => summary.pending += 1,
                    Status::Skipped => summary.skipped += 1,
                },
                ConversionRecord::Error(_) => summary.errors += 1,
            }
        }
        summary
    }
}

/// Convert every test and attribute screenshots to each issue key found.
pub fn convert(converter: &dyn RunConverter, options: &ConversionOptions) -> ConversionOutput {
    let conversions = converter.get_conversions(options);

    let mut screenshots = BTreeMap::new();
    let mut queried: HashSet<&str> = HashSet::new();
    for record in &conversions {
        let Some(key) = record.as_success().and_then(|c| c.issue_key.as_deref()) else {
            continue;
        };
        if !queried.insert(key) {
            continue;
        }
        let paths = converter.get_screenshots(key, options);
        if !paths.is_empty() {
            screenshots.insert(key.to_string(), paths);
        }
    }

    for record in &conversions {
        if let ConversionRecord::Error(failure) = record {
            tracing::warn!("Skipping result of '{}': {}", failure.title, failure.error);
        }
    }

    ConversionOutput {
        non_attributable: converter.get_non_attributable_screenshots(options),
        conversions,
        screenshots,
    }
}

/// Issue keys of all native tests, strictly one per title.
///
/// Titles with no key or several keys are skipped; each is reported once.
pub fn native_issue_keys(converter: &dyn RunConverter, project_key: &str) -> Vec<String> {
    let mut ignored: HashSet<String> = HashSet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut keys = Vec::new();
    for title in converter.test_titles() {
        match extract_issue_key(&title, project_key) {
            Ok(key) => {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            Err(e) => {
                if ignored.insert(title.clone()) {
                    tracing::warn!("Skipping test without a unique issue key:\n{}", e);
                }
            }
        }
    }
    keys
}
