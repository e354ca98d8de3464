//! Last-attempt screenshot resolution for Cypress 13+ runs.
//!
//! Cypress names screenshots after the test that took them. Retries append
//! ` (attempt N)`, and a name that already exists on disk gets a ` (k)`
//! disambiguator, e.g. when the same `it` body runs several times in a loop:
//!
//! ```text
//! demo -- CYP-1 shot.png                  attempt 1, iteration 1
//! demo -- CYP-1 shot (1).png              attempt 1, iteration 2
//! demo -- CYP-1 shot (attempt 2).png      attempt 2, iteration 1
//! demo -- CYP-1 shot (attempt 2) (1).png  attempt 2, iteration 2
//! ```
//!
//! Resolution happens in two phases: every screenshot without an attempt
//! suffix gathers its retries into a family, then the highest attempt of each
//! family is kept. Failure screenshots survive only if they were taken by the
//! test's final recorded attempt.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use super::schema::current::{ScreenshotRecord, TestResult};
use crate::issue_key::extract_all_issue_keys;

fn attempt_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.*) \(attempt (?P<attempt>\d+)\)(?: \((?P<conflict>\d+)\))?$")
            .expect("static pattern")
    })
}

fn conflict_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<name>.*) \((?P<index>\d+)\)$").expect("static pattern"))
}

fn unsafe_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w]").expect("static pattern"))
}

/// Split `dir/name.png` into `("dir/name", ".png")`. Dots in directories are
/// not treated as extensions.
pub fn split_extension(path: &str) -> (&str, &str) {
    let file_start = path.rfind(|c| c == '/' || c == '\\').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => path.split_at(file_start + dot),
        _ => (path, ""),
    }
}

/// Attempt number encoded in a screenshot path, if any.
pub fn attempt_number(path: &str) -> Option<u32> {
    let (stem, _) = split_extension(path);
    attempt_suffix_regex()
        .captures(stem)
        .and_then(|caps| caps["attempt"].parse().ok())
}

/// A screenshot stem split into the name Cypress started from and the
/// suffixes it appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParsedName<'a> {
    name: &'a str,
    attempt: Option<u32>,
    conflict: Option<&'a str>,
}

impl<'a> ParsedName<'a> {
    fn parse(path: &'a str) -> Self {
        let (stem, _) = split_extension(path);
        if let Some(caps) = attempt_suffix_regex().captures(stem) {
            let name = caps.name("name").map_or(stem, |m| m.as_str());
            let attempt = caps.name("attempt").and_then(|m| m.as_str().parse().ok());
            let conflict = caps.name("conflict").map(|m| m.as_str());
            return Self { name, attempt, conflict };
        }
        Self {
            name: stem,
            attempt: None,
            conflict: None,
        }
    }

    /// Family key of a retry, `None` for an initial screenshot.
    fn retry_key(&self) -> Option<FamilyKey<'a>> {
        self.attempt.map(|_| (self.name, self.conflict))
    }
}

type FamilyKey<'a> = (&'a str, Option<&'a str>);

/// Keys under which the retries of an initial screenshot are filed.
///
/// A retry of `name` is `name (attempt N)`. A retry of an iteration
/// `name (k)` is either `name (attempt N) (k)` or, when Cypress treated the
/// disambiguator as part of the title, `name (k) (attempt N)`.
fn initial_keys(stem: &str) -> Vec<FamilyKey<'_>> {
    let mut keys = vec![(stem, None)];
    if let Some(caps) = conflict_suffix_regex().captures(stem) {
        if let (Some(name), Some(index)) = (caps.name("name"), caps.name("index")) {
            keys.push((name.as_str(), Some(index.as_str())));
        }
    }
    keys
}

/// Whether `candidate` is a retry of the screenshot at `initial`.
fn is_retry_of(initial: &str, candidate: &str) -> bool {
    let (initial_stem, _) = split_extension(initial);
    match ParsedName::parse(candidate).retry_key() {
        Some(key) => initial_keys(initial_stem).contains(&key),
        None => false,
    }
}

/// Every retry screenshot of `initial` found in `screenshots`.
pub fn similar_screenshots<'a>(
    initial: &ScreenshotRecord,
    screenshots: &'a [ScreenshotRecord],
) -> Vec<&'a ScreenshotRecord> {
    screenshots
        .iter()
        .filter(|s| is_retry_of(&initial.path, &s.path))
        .collect()
}

/// Highest-attempt member of a family. Members without an attempt number rank
/// lowest; ties keep input order.
pub fn representative<'a>(family: &[&'a ScreenshotRecord]) -> Option<&'a ScreenshotRecord> {
    let mut ranked = family.to_vec();
    ranked.sort_by_key(|s| std::cmp::Reverse(attempt_number(&s.path).unwrap_or(0)));
    ranked.first().copied()
}

fn sanitize(text: &str) -> String {
    unsafe_chars_regex().replace_all(text, "").into_owned()
}

/// Whether a test with these title keys could have taken a screenshot with
/// these path keys. Keyless screenshots only belong to keyless tests.
fn keys_overlap(test_keys: &[String], path_keys: &[String]) -> bool {
    if path_keys.is_empty() {
        test_keys.is_empty()
    } else {
        test_keys.iter().any(|k| path_keys.contains(k))
    }
}

/// Tests paired with the issue keys of their full title.
fn keyed_tests<'a>(
    tests: &'a [TestResult],
    project_key: &str,
) -> Vec<(&'a TestResult, Vec<String>)> {
    tests
        .iter()
        .map(|test| (test, extract_all_issue_keys(&test.title.join(" "), project_key)))
        .collect()
}

/// Whether a failure screenshot was taken by the final attempt of its test.
///
/// Only tests sharing an issue key with the screenshot path are considered.
/// Cypress names failure screenshots `<title path joined by " -- "> (<state>)`,
/// followed by ` (attempt N)` for retries. A test whose last attempt passed
/// therefore never matches a failure screenshot.
pub fn belongs_to_final_attempt(path: &str, tests: &[TestResult], project_key: &str) -> bool {
    taken_by_final_attempt(path, &keyed_tests(tests, project_key), project_key)
}

fn taken_by_final_attempt(
    path: &str,
    tests: &[(&TestResult, Vec<String>)],
    project_key: &str,
) -> bool {
    let (stem, ext) = split_extension(path);
    let mut candidates = vec![sanitize(path)];
    if let Some(caps) = conflict_suffix_regex().captures(stem) {
        candidates.push(sanitize(&format!("{}{}", &caps["name"], ext)));
    }
    let path_keys = extract_all_issue_keys(path, project_key);

    tests
        .iter()
        .filter(|(_, title_keys)| keys_overlap(title_keys, &path_keys))
        .any(|(test, _)| {
            let Some(last) = test.attempts.last() else {
                return false;
            };
            let attempts = test.attempts.len();
            let mut expected = format!("{} ({})", test.title.join(" -- "), last.state);
            if attempts > 1 {
                expected.push_str(&format!(" (attempt {})", attempts));
            }
            expected.push_str(ext);
            let expected = sanitize(&expected);
            candidates.iter().any(|c| c.ends_with(&expected))
        })
}

/// Reduce `screenshots` to those of each test's final attempt.
///
/// `tests` are the tests of the run the screenshots were taken in. The result
/// is deduplicated and ordered by each family's first appearance.
pub fn last_attempt_screenshots(
    screenshots: &[ScreenshotRecord],
    tests: &[TestResult],
    project_key: &str,
) -> Vec<String> {
    let parsed: Vec<ParsedName<'_>> = screenshots
        .iter()
        .map(|s| ParsedName::parse(&s.path))
        .collect();

    // Family members by index of their first screenshot.
    let mut families: Vec<(usize, Vec<&ScreenshotRecord>)> = Vec::new();
    let mut family_of: HashMap<FamilyKey<'_>, usize> = HashMap::new();

    for (index, screenshot) in screenshots.iter().enumerate() {
        if parsed[index].attempt.is_some() {
            continue;
        }
        let (stem, _) = split_extension(&screenshot.path);
        let family = families.len();
        families.push((index, vec![screenshot]));
        for key in initial_keys(stem) {
            family_of.entry(key).or_insert(family);
        }
    }

    // Retries whose initial screenshot is missing, e.g. taken conditionally,
    // start a family of their own.
    for (index, screenshot) in screenshots.iter().enumerate() {
        let Some(key) = parsed[index].retry_key() else {
            continue;
        };
        match family_of.get(&key).copied() {
            Some(family) => families[family].1.push(screenshot),
            None => {
                family_of.insert(key, families.len());
                families.push((index, vec![screenshot]));
            }
        }
    }
    families.sort_by_key(|(index, _)| *index);

    let tests = keyed_tests(tests, project_key);
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for (_, family) in &families {
        let Some(chosen) = representative(family) else {
            continue;
        };
        if chosen.test_failure && !taken_by_final_attempt(&chosen.path, &tests, project_key) {
            tracing::debug!(
                "Dropping failure screenshot of a superseded attempt: {}",
                chosen.path
            );
            continue;
        }
        super::converter::push_unique(&mut resolved, &mut seen, &chosen.path);
    }
    resolved
}
