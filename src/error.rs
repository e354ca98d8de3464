use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Test: {title}\n\n  No test issue keys found in title.\n\n  \
         You can target existing test issues by adding a corresponding issue key, \
         i.e. your project key followed by a number:\n\n    \
         it(\"{project_key}-123 {title}\", () => {{ ... }});"
    )]
    MissingIssueKey { title: String, project_key: String },

    #[error(
        "Test: {title}\n\n  Multiple test keys found in title, cannot decide which one to use: {}",
        .keys.join(", ")
    )]
    MultipleIssueKeys { title: String, keys: Vec<String> },

    #[error("Unknown Cypress test status: {0}")]
    UnknownStatus(String),

    #[error(
        "UNSUPPORTED_VERSION: Cypress version '{0}' is not supported (12.0.0 or later required)."
    )]
    UnsupportedVersion(String),

    #[error("VALIDATION_ERROR: {0}")]
    ValidationError(String),

    #[error("EVIDENCE_ERROR: {0}")]
    Evidence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
