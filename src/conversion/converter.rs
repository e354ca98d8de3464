use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::issue_key::extract_all_issue_keys;
use crate::status::Status;
use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Convert only the final attempt of each test.
    pub only_last_attempt: bool,
}

impl ConversionOptions {
    pub fn last_attempt() -> Self {
        Self { only_last_attempt: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecInfo {
    pub filepath: String,
}

/// Successfully converted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConversion {
    pub duration: u64,
    pub issue_key: Option<String>,
    pub spec: SpecInfo,
    pub started_at: DateTime<Utc>,
    pub status: Status,
    pub title: String,
}

/// Attempt that could not be converted. Siblings are unaffected.
#[derive(Debug, Serialize)]
pub struct ConversionFailure {
    #[serde(serialize_with = "serialize_error")]
    pub error: Error,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConversionRecord {
    Success(TestConversion),
    Error(ConversionFailure),
}

impl ConversionRecord {
    pub fn title(&self) -> &str {
        match self {
            ConversionRecord::Success(c) => &c.title,
            ConversionRecord::Error(f) => &f.title,
        }
    }

    pub fn as_success(&self) -> Option<&TestConversion> {
        match self {
            ConversionRecord::Success(c) => Some(c),
            ConversionRecord::Error(_) => None,
        }
    }
}

fn serialize_error<S: Serializer>(
    error: &Error,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}

/// Shared contract of the version-specific run converters.
pub trait RunConverter: Send + Sync {
    /// Short schema name: "legacy", "current"
    fn name(&self) -> &str;

    /// One record per (test, selected attempt, issue key). Tests without a key
    /// produce records with a `None` key.
    fn get_conversions(&self, options: &ConversionOptions) -> Vec<ConversionRecord>;

    /// Screenshot paths attributable to `issue_key`, deduplicated in first-seen order.
    fn get_screenshots(&self, issue_key: &str, options: &ConversionOptions) -> Vec<String>;

    /// Screenshot paths that carry no issue key at all.
    fn get_non_attributable_screenshots(&self, options: &ConversionOptions) -> Vec<String>;

    /// Canonical titles of every test, in run order.
    fn test_titles(&self) -> Vec<String>;
}

/// Canonical test title: title fragments joined by a single space.
pub fn canonical_title(fragments: &[String]) -> String {
    fragments.join(" ")
}

/// Issue keys a conversion record is emitted for. A title without keys still
/// yields one record, keyed `None`.
pub fn record_issue_keys(title: &str, project_key: &str) -> Vec<Option<String>> {
    let keys = extract_all_issue_keys(title, project_key);
    if keys.is_empty() {
        vec![None]
    } else {
        keys.into_iter().map(Some).collect()
    }
}

/// Either every attempt or only the final one.
pub fn selected_attempts<'a, T>(attempts: &'a [T], options: &ConversionOptions) -> &'a [T] {
    if options.only_last_attempt && !attempts.is_empty() {
        &attempts[attempts.len() - 1..]
    } else {
        attempts
    }
}

/// Push `path` unless it was already collected.
pub(crate) fn push_unique(
    paths: &mut Vec<String>,
    seen: &mut std::collections::HashSet<String>,
    path: &str,
) {
    if seen.insert(path.to_string()) {
        paths.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_title() {
        let fragments = vec![
            "suite".to_string(),
            "nested".to_string(),
            "CYP-1 works".to_string(),
        ];
        assert_eq!(canonical_title(&fragments), "suite nested CYP-1 works");
    }

    #[test]
    fn test_record_keys_fall_back_to_none() {
        assert_eq!(record_issue_keys("no key", "CYP"), vec![None]);
        assert_eq!(
            record_issue_keys("CYP-1 CYP-2 both", "CYP"),
            vec![Some("CYP-1".to_string()), Some("CYP-2".to_string())]
        );
    }

    #[test]
    fn test_selected_attempts() {
        let attempts = [1, 2, 3];
        assert_eq!(
            selected_attempts(&attempts, &ConversionOptions::default()),
            &[1, 2, 3]
        );
        assert_eq!(
            selected_attempts(&attempts, &ConversionOptions::last_attempt()),
            &[3]
        );
        let empty: [u8; 0] = [];
        assert!(selected_attempts(&empty, &ConversionOptions::last_attempt()).is_empty());
    }

    #[test]
    fn test_selected_attempts_outlive_options() {
        let attempts = vec!["failed".to_string(), "passed".to_string()];
        let last = {
            let options = ConversionOptions::last_attempt();
            selected_attempts(&attempts, &options)
        };
        assert_eq!(last, ["passed".to_string()]);
    }

    #[test]
    fn test_record_serialization() {
        let record = ConversionRecord::Success(TestConversion {
            duration: 244,
            issue_key: None,
            spec: SpecInfo { filepath: "/spec.cy.ts".to_string() },
            started_at: "2022-11-28T17:41:15.091Z".parse().unwrap(),
            status: Status::Passed,
            title: "demo works".to_string(),
        });
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "success");
        assert_eq!(value["issueKey"], serde_json::Value::Null);
        assert_eq!(value["spec"]["filepath"], "/spec.cy.ts");
        assert_eq!(value["status"], "passed");

        let failure = ConversionRecord::Error(ConversionFailure {
            error: Error::UnknownStatus("broken".to_string()),
            title: "demo breaks".to_string(),
        });
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["kind"], "error");
        assert_eq!(value["error"], "Unknown Cypress test status: broken");
        assert_eq!(failure.title(), "demo breaks");
    }
}
