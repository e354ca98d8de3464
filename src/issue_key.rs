use regex::Regex;

use crate::{Error, Result};

/// Build the `<projectKey>-<number>` matcher. The project key is escaped so
/// keys containing regex metacharacters still match literally.
fn issue_key_regex(project_key: &str) -> Regex {
    Regex::new(&format!(r"({}-\d+)", regex::escape(project_key)))
        .expect("escaped project key always forms a valid pattern")
}

/// Extract the single issue key of a native test title.
///
/// Fails with [`Error::MissingIssueKey`] when the title carries no key and with
/// [`Error::MultipleIssueKeys`] when it carries more than one occurrence.
pub fn extract_issue_key(title: &str, project_key: &str) -> Result<String> {
    let matches: Vec<String> = issue_key_regex(project_key)
        .find_iter(title)
        .map(|m| m.as_str().to_string())
        .collect();

    match matches.len() {
        0 => Err(Error::MissingIssueKey {
            title: title.to_string(),
            project_key: project_key.to_string(),
        }),
        1 => Ok(matches.into_iter().next().unwrap_or_default()),
        _ => Err(Error::MultipleIssueKeys {
            title: title.to_string(),
            keys: matches,
        }),
    }
}

/// Extract every issue key mentioned in a title or file name.
///
/// Never fails: zero keys yields an empty list. Repeated keys are reported once,
/// in order of first occurrence.
pub fn extract_all_issue_keys(title: &str, project_key: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for m in issue_key_regex(project_key).find_iter(title) {
        if !keys.iter().any(|k| k == m.as_str()) {
            keys.push(m.as_str().to_string());
        }
    }
    keys
}
