use std::collections::HashSet;

use super::converter::*;
use super::schema::legacy::RunResult;
use crate::issue_key::extract_all_issue_keys;
use crate::status::to_canonical_status;

/// Converter for Cypress 12 results, where every attempt carries its own
/// duration, start time and screenshots.
pub struct LegacyRunConverter {
    project_key: String,
    runs: Vec<RunResult>,
}

impl LegacyRunConverter {
    pub fn new(project_key: impl Into<String>, runs: Vec<RunResult>) -> Self {
        Self {
            project_key: project_key.into(),
            runs,
        }
    }
}

impl RunConverter for LegacyRunConverter {
    fn name(&self) -> &str {
        "legacy"
    }

    fn get_conversions(&self, options: &ConversionOptions) -> Vec<ConversionRecord> {
        let mut records = Vec::new();
        for run in &self.runs {
            for test in &run.tests {
                let title = canonical_title(&test.title);
                for attempt in selected_attempts(&test.attempts, options) {
                    for issue_key in record_issue_keys(&title, &self.project_key) {
                        let record = match to_canonical_status(&attempt.state) {
                            Ok(status) => ConversionRecord::Success(TestConversion {
                                duration: attempt.duration,
                                issue_key,
                                spec: SpecInfo {
                                    filepath: run.spec.absolute.clone(),
                                },
                                started_at: attempt.started_at,
                                status,
                                title: title.clone(),
                            }),
                            Err(error) => ConversionRecord::Error(ConversionFailure {
                                error,
                                title: title.clone(),
                            }),
                        };
                        records.push(record);
                    }
                }
            }
        }
        records
    }

    fn get_screenshots(&self, issue_key: &str, options: &ConversionOptions) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut screenshots = Vec::new();
        for run in &self.runs {
            for test in &run.tests {
                let title = canonical_title(&test.title);
                let keys = extract_all_issue_keys(&title, &self.project_key);
                if !keys.iter().any(|k| k == issue_key) {
                    continue;
                }
                for attempt in selected_attempts(&test.attempts, options) {
                    for screenshot in &attempt.screenshots {
                        push_unique(&mut screenshots, &mut seen, &screenshot.path);
                    }
                }
            }
        }
        screenshots
    }

    // Cypress 12 only reports screenshots inside attempts, so there is nothing
    // outside a test to attribute.
    fn get_non_attributable_screenshots(&self, _options: &ConversionOptions) -> Vec<String> {
        Vec::new()
    }

    fn test_titles(&self) -> Vec<String> {
        self.runs
            .iter()
            .flat_map(|run| run.tests.iter().map(|t| canonical_title(&t.title)))
            .collect()
    }
}
