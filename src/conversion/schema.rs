//! Input shapes of `cypress run` results, per Cypress major version.
//!
//! Only the fields the converters read are modelled; everything else Cypress
//! emits is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level result object, before the version-specific `runs` are parsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub cypress_version: String,
    #[serde(default)]
    pub runs: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spec {
    pub absolute: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
}

/// Cypress 12 and below: screenshots live inside each attempt.
pub mod legacy {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct RunResult {
        pub spec: Spec,
        pub stats: RunStats,
        #[serde(default)]
        pub tests: Vec<TestResult>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct TestResult {
        pub title: Vec<String>,
        #[serde(default)]
        pub attempts: Vec<AttemptResult>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttemptResult {
        #[serde(default)]
        pub duration: u64,
        pub started_at: DateTime<Utc>,
        pub state: String,
        #[serde(default)]
        pub screenshots: Vec<Screenshot>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Screenshot {
        pub path: String,
    }
}

/// Cypress 13 and above: one duration per test, screenshots listed per run.
pub mod current {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct RunResult {
        pub spec: Spec,
        pub stats: RunStats,
        #[serde(default)]
        pub tests: Vec<TestResult>,
        #[serde(default)]
        pub screenshots: Vec<ScreenshotRecord>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct TestResult {
        pub title: Vec<String>,
        #[serde(default)]
        pub duration: Option<u64>,
        #[serde(default)]
        pub attempts: Vec<AttemptResult>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AttemptResult {
        pub state: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ScreenshotRecord {
        pub path: String,
        #[serde(default)]
        pub test_failure: bool,
    }
}
