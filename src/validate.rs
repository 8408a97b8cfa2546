use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// The only hosting domain edit requests may target.
pub const HOSTING_DOMAIN: &str = "github.com";

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?$")
        .expect("repository URL pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid repository URL: expected https://github.com/<owner>/<repo>, got {0:?}")]
    InvalidUrl(String),

    #[error("Missing instruction: describe the change you want to make")]
    MissingInstruction,
}

/// Owner and repository name extracted from a valid repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Returns true iff `url` has the shape `https://github.com/<owner>/<repo>[.git]`.
///
/// Owner and repo are one or more of `[A-Za-z0-9_.-]`. No normalization is
/// applied, so a trailing slash or a missing scheme is rejected.
pub fn is_valid_repo_url(url: &str) -> bool {
    REPO_URL.is_match(url)
}

/// Split a repository URL into owner and repository name.
pub fn parse_repo_url(url: &str) -> Result<RepoRef, ValidationError> {
    let caps = REPO_URL
        .captures(url)
        .ok_or_else(|| ValidationError::InvalidUrl(url.to_string()))?;

    Ok(RepoRef {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
    })
}

/// Reject blank or whitespace-only instructions.
pub fn require_instruction(instruction: &str) -> Result<&str, ValidationError> {
    let trimmed = instruction.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingInstruction);
    }
    Ok(trimmed)
}
