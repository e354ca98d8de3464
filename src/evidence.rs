//! Ad-hoc evidence submitted from inside a running test.

use std::collections::{BTreeMap, HashSet};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::issue_key::extract_all_issue_keys;
use crate::{Error, Result};

/// Raw evidence as handed over by the test.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Evidence task payload: the full title of the submitting test plus its evidence.
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceTask {
    pub test: String,
    pub evidence: Evidence,
}

/// Evidence ready for upload, data base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedEvidence {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub data: String,
}

impl EncodedEvidence {
    pub fn encode(evidence: &Evidence) -> Result<Self> {
        if evidence.filename.trim().is_empty() {
            return Err(Error::Evidence("evidence filename must not be empty".to_string()));
        }
        Ok(Self {
            filename: evidence.filename.clone(),
            content_type: evidence.content_type.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(&evidence.data),
        })
    }
}

/// Evidence gathered per issue key, in submission order.
#[derive(Debug, Default, Serialize)]
pub struct EvidenceCollection {
    evidence: BTreeMap<String, Vec<EncodedEvidence>>,
}

impl EvidenceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue_key: &str, evidence: EncodedEvidence) {
        self.evidence.entry(issue_key.to_string()).or_default().push(evidence);
    }

    pub fn get(&self, issue_key: &str) -> &[EncodedEvidence] {
        self.evidence.get(issue_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn issue_keys(&self) -> impl Iterator<Item = &str> {
        self.evidence.keys().map(String::as_str)
    }
}

/// Resolves evidence tasks to issue keys and stores the encoded payloads.
///
/// Tests whose titles carry no issue key are warned about once per listener.
pub struct EvidenceListener {
    project_key: String,
    collection: EvidenceCollection,
    ignored_tests: HashSet<String>,
}

impl EvidenceListener {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            collection: EvidenceCollection::new(),
            ignored_tests: HashSet::new(),
        }
    }

    /// Attach the task's evidence to every issue key in its test title.
    /// Returns the keys it was attached to.
    pub fn handle(&mut self, task: &EvidenceTask) -> Result<Vec<String>> {
        let keys = extract_all_issue_keys(&task.test, &self.project_key);
        if keys.is_empty() {
            if self.ignored_tests.insert(task.test.clone()) {
                tracing::warn!(
                    "Test: {}\n\n  Evidence cannot be attributed: \
                     no issue key of project {} in title. Add one, e.g. \"{}-123 {}\".",
                    task.test,
                    self.project_key,
                    self.project_key,
                    task.test
                );
            }
            return Ok(keys);
        }

        let encoded = EncodedEvidence::encode(&task.evidence)?;
        for key in &keys {
            tracing::debug!("Adding evidence {} to {}", encoded.filename, key);
            self.collection.add(key, encoded.clone());
        }
        Ok(keys)
    }

    pub fn collection(&self) -> &EvidenceCollection {
        &self.collection
    }

    pub fn into_collection(self) -> EvidenceCollection {
        self.collection
    }

    /// Titles that have been ignored so far.
    pub fn ignored_tests(&self) -> &HashSet<String> {
        &self.ignored_tests
    }
}
