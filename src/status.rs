use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Canonical outcome of a single test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Pending,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Pending => "pending",
            Status::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-install replacements for the vendor status names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl StatusOverrides {
    fn get(&self, status: Status) -> Option<&str> {
        match status {
            Status::Passed => self.passed.as_deref(),
            Status::Failed => self.failed.as_deref(),
            Status::Pending => self.pending.as_deref(),
            Status::Skipped => self.skipped.as_deref(),
        }
    }
}

/// Map an attempt state reported by Cypress onto [`Status`]. Exact match only.
pub fn to_canonical_status(state: &str) -> Result<Status> {
    match state {
        "passed" => Ok(Status::Passed),
        "failed" => Ok(Status::Failed),
        "pending" => Ok(Status::Pending),
        "skipped" => Ok(Status::Skipped),
        other => Err(Error::UnknownStatus(other.to_string())),
    }
}

/// Map a canonical status onto the status name Xray expects.
///
/// Skipped tests are reported as failed in both vocabularies; Xray has no
/// built-in skipped status.
pub fn to_vendor_status(
    status: Status,
    cloud: bool,
    overrides: Option<&StatusOverrides>,
) -> String {
    if let Some(name) = overrides.and_then(|o| o.get(status)) {
        return name.to_string();
    }
    let name = match (status, cloud) {
        (Status::Passed, true) => "PASSED",
        (Status::Passed, false) => "PASS",
        (Status::Failed, true) => "FAILED",
        (Status::Failed, false) => "FAIL",
        (Status::Pending, true) => "TO DO",
        (Status::Pending, false) => "TODO",
        (Status::Skipped, true) => "FAILED",
        (Status::Skipped, false) => "FAIL",
    };
    name.to_string()
}
