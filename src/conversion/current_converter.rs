use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::converter::*;
use super::schema::current::{RunResult, ScreenshotRecord};
use super::screenshots::last_attempt_screenshots;
use crate::issue_key::extract_all_issue_keys;
use crate::status::to_canonical_status;

/// Converter for Cypress 13+ results. Tests only report a total duration and
/// screenshots are listed per run, so start times and screenshot ownership
/// are reconstructed.
pub struct CurrentRunConverter {
    project_key: String,
    runs: Vec<RunResult>,
}

impl CurrentRunConverter {
    pub fn new(project_key: impl Into<String>, runs: Vec<RunResult>) -> Self {
        Self {
            project_key: project_key.into(),
            runs,
        }
    }

    /// Start time of every test, indexed like `run.tests`.
    ///
    /// The first test starts with the run; each following test starts when
    /// the previous one ended. A duration that cannot be represented as a
    /// date offset leaves the following start unchanged.
    pub fn test_starts(run: &RunResult) -> Vec<DateTime<Utc>> {
        let mut starts = Vec::with_capacity(run.tests.len());
        let mut next = run.stats.started_at;
        for test in &run.tests {
            starts.push(next);
            let millis = test.duration.unwrap_or(0);
            let end = i64::try_from(millis)
                .ok()
                .and_then(Duration::try_milliseconds)
                .and_then(|elapsed| next.checked_add_signed(elapsed));
            match end {
                Some(end) => next = end,
                None => tracing::warn!(
                    "Duration of {} ms out of range for test '{}', not advancing start time",
                    millis,
                    test.title.join(" ")
                ),
            }
        }
        starts
    }

    fn collect_screenshots(
        &self,
        options: &ConversionOptions,
        keep: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for run in &self.runs {
            let matching: Vec<ScreenshotRecord> = run
                .screenshots
                .iter()
                .filter(|s| keep(&s.path))
                .cloned()
                .collect();
            let selected = if options.only_last_attempt {
                last_attempt_screenshots(&matching, &run.tests, &self.project_key)
            } else {
                matching.into_iter().map(|s| s.path).collect()
            };
            for path in &selected {
                push_unique(&mut paths, &mut seen, path);
            }
        }
        paths
    }
}

impl RunConverter for CurrentRunConverter {
    fn name(&self) -> &str {
        "current"
    }

    fn get_conversions(&self, options: &ConversionOptions) -> Vec<ConversionRecord> {
        let mut records = Vec::new();
        for run in &self.runs {
            let starts = Self::test_starts(run);
            for (test, started_at) in run.tests.iter().zip(starts) {
                let title = canonical_title(&test.title);
                for attempt in selected_attempts(&test.attempts, options) {
                    for issue_key in record_issue_keys(&title, &self.project_key) {
                        let record = match to_canonical_status(&attempt.state) {
                            Ok(status) => ConversionRecord::Success(TestConversion {
                                duration: test.duration.unwrap_or(0),
                                issue_key,
                                spec: SpecInfo {
                                    filepath: run.spec.absolute.clone(),
                                },
                                started_at,
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
        self.collect_screenshots(options, |path| path.contains(issue_key))
    }

    fn get_non_attributable_screenshots(&self, options: &ConversionOptions) -> Vec<String> {
        self.collect_screenshots(options, |path| {
            extract_all_issue_keys(path, &self.project_key).is_empty()
        })
    }

    fn test_titles(&self) -> Vec<String> {
        self.runs
            .iter()
            .flat_map(|run| run.tests.iter().map(|t| canonical_title(&t.title)))
            .collect()
    }
}
