use serde::Deserialize;
use std::path::Path;

use crate::status::StatusOverrides;

/// All configurable settings with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub project_key: Option<String>,
    pub upload_last_attempt: bool,
    pub upload_screenshots: bool,
    pub cloud: bool,
    pub status: StatusOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_key: None,
            upload_last_attempt: false,
            upload_screenshots: true,
            cloud: false,
            status: StatusOverrides::default(),
        }
    }
}

/// Raw JSON representation — all fields optional for partial overrides.
#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    #[serde(rename = "jira.projectKey")]
    project_key: Option<String>,
    #[serde(rename = "xray.uploadLastAttempt")]
    upload_last_attempt: Option<bool>,
    #[serde(rename = "xray.uploadScreenshots")]
    upload_screenshots: Option<bool>,
    #[serde(rename = "xray.cloud")]
    cloud: Option<bool>,
    #[serde(rename = "xray.status.passed")]
    status_passed: Option<String>,
    #[serde(rename = "xray.status.failed")]
    status_failed: Option<String>,
    #[serde(rename = "xray.status.pending")]
    status_pending: Option<String>,
    #[serde(rename = "xray.status.skipped")]
    status_skipped: Option<String>,
}

/// Whether `key` looks like a Jira project key: an uppercase letter followed
/// by uppercase letters, digits or underscores.
pub fn is_valid_project_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Resolve settings: defaults → user global → project-local.
pub fn resolve(project_root: Option<&Path>) -> Settings {
    let global_path = dirs::home_dir().map(|h| h.join(".cypress-xray/settings.json"));
    let project_path = project_root.map(|r| r.join(".cypress-xray/settings.json"));
    resolve_with_paths(global_path.as_deref(), project_path.as_deref())
}

/// Testable resolver that accepts explicit file paths (no home dir dependency).
fn resolve_with_paths(global_path: Option<&Path>, project_path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    if let Some(path) = global_path {
        apply_file(&mut settings, path);
    }
    if let Some(path) = project_path {
        apply_file(&mut settings, path);
    }

    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else { return };
    let Ok(file) = serde_json::from_str::<SettingsFile>(&content) else {
        tracing::warn!("Invalid settings file, ignoring: {}", path.display());
        return;
    };
    if let Some(key) = file.project_key {
        if is_valid_project_key(&key) {
            settings.project_key = Some(key);
        } else {
            tracing::warn!("jira.projectKey ({:?}) is not a valid project key, ignoring", key);
        }
    }
    if let Some(v) = file.upload_last_attempt {
        settings.upload_last_attempt = v;
    }
    if let Some(v) = file.upload_screenshots {
        settings.upload_screenshots = v;
    }
    if let Some(v) = file.cloud {
        settings.cloud = v;
    }
    for (name, value, slot) in [
        ("passed", file.status_passed, &mut settings.status.passed),
        ("failed", file.status_failed, &mut settings.status.failed),
        ("pending", file.status_pending, &mut settings.status.pending),
        ("skipped", file.status_skipped, &mut settings.status.skipped),
    ] {
        match value {
            Some(v) if v.trim().is_empty() => {
                tracing::warn!("xray.status.{} is empty, ignoring", name);
            }
            Some(v) => *slot = Some(v),
            None => {}
        }
    }
}
