use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Body of every edit endpoint (`execute`, `preview`, `plan`).
/// Built fresh from the form for each operation and consumed by one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRequest {
    pub repo_url: String,
    /// Natural-language description of the change.
    pub request: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    pub create_pr: bool,
}

/// Body of `POST /api/repository/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub repo_url: String,
}

/// Which backend endpoint an operation calls. Also decides which result
/// variant a successful response decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Execute,
    Preview,
    Plan,
    /// Repository overview; needs only the URL.
    Analyze,
}

impl OperationKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            OperationKind::Execute => "/api/edits/execute",
            OperationKind::Preview => "/api/edits/preview",
            OperationKind::Plan => "/api/edits/plan",
            OperationKind::Analyze => "/api/repository/analyze",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Execute => write!(f, "execute"),
            OperationKind::Preview => write!(f, "preview"),
            OperationKind::Plan => write!(f, "plan"),
            OperationKind::Analyze => write!(f, "analyze"),
        }
    }
}

/// External services the backend depends on, each with its own probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Hosting,
    AiModel,
}

impl Service {
    pub fn probe_endpoint(self) -> &'static str {
        match self {
            Service::Hosting => "/api/github/test",
            Service::AiModel => "/api/ai/test",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Hosting => write!(f, "GitHub"),
            Service::AiModel => write!(f, "AI model"),
        }
    }
}

/// Kind of change applied to a file. The backend reports applied changes in
/// past tense and planned ones in imperative form; both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[serde(alias = "modify")]
    Modified,
    #[serde(alias = "create")]
    Created,
    #[serde(alias = "delete")]
    Deleted,
    #[serde(other)]
    Unknown,
}

impl ChangeType {
    pub fn marker(self) -> &'static str {
        match self {
            ChangeType::Modified => "📝",
            ChangeType::Created => "✨",
            ChangeType::Deleted => "🗑️",
            ChangeType::Unknown => "❓",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChangeType::Modified => "modified",
            ChangeType::Created => "created",
            ChangeType::Deleted => "deleted",
            ChangeType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangedFile {
    #[serde(alias = "path")]
    pub file_path: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestLink {
    pub url: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Outcome of a successful `execute` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuccessResult {
    #[serde(default)]
    pub pull_request: Option<PullRequestLink>,
    /// Set when the edits landed but opening the pull request failed.
    #[serde(default)]
    pub pull_request_error: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub changes_count: Option<usize>,
    #[serde(default, rename = "changes_preview", alias = "changed_files")]
    pub changed_files: Vec<ChangedFile>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleChange {
    #[serde(alias = "path")]
    pub file_path: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlanSummary {
    #[serde(default)]
    pub total_instructions: usize,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// The backend calls this `estimated_time` but fills it with a
    /// quick/medium/complex label.
    #[serde(default, rename = "estimated_time", alias = "estimated_complexity")]
    pub estimated_complexity: Option<String>,
}

/// Outcome of a successful `preview` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviewResult {
    #[serde(default)]
    pub plan_summary: PlanSummary,
    #[serde(default, rename = "preview_changes", alias = "sample_changes")]
    pub sample_changes: Vec<SampleChange>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannedInstruction {
    pub file_path: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub description: String,
    /// 1 (do first) to 5 (do last).
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditPlan {
    #[serde(default)]
    pub instructions: Vec<PlannedInstruction>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default, rename = "estimated_time")]
    pub estimated_complexity: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Outcome of a successful `plan` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanResult {
    pub plan: EditPlan,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepositoryInfo {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct StructureSummary {
    #[serde(default)]
    pub directories: usize,
    #[serde(default)]
    pub files: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RepositoryAnalysis {
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub languages: Vec<String>,
    /// Capped at 20 entries by the backend.
    #[serde(default)]
    pub important_files: Vec<String>,
    #[serde(default)]
    pub structure_summary: StructureSummary,
}

/// Outcome of a successful `analyze` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResult {
    pub repository: RepositoryInfo,
    #[serde(default)]
    pub analysis: RepositoryAnalysis,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A structured failure reported by the backend, or a local failure
/// projected into the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub message: String,
    pub detail_errors: Vec<String>,
    pub request_id: Option<String>,
}

impl ErrorResult {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail_errors: Vec::new(),
            request_id: None,
        }
    }
}

/// The contract between the console and the renderers: exactly one variant
/// is rendered per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    Success(SuccessResult),
    Preview(PreviewResult),
    Plan(PlanResult),
    Analysis(AnalysisResult),
    Error(ErrorResult),
}

/// Failure bodies come in several shapes: `{error, message, request_id}` from
/// the error handlers and `{success: false, summary, errors, ...}` from
/// `execute`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Vec<String>>,
    #[serde(default)]
    request_id: Option<String>,
}

impl OperationResult {
    /// Decode a JSON response body. `success: true` selects the variant for
    /// `kind`; anything else is a backend failure.
    pub fn from_response(kind: OperationKind, body: Value) -> Result<Self, ApiError> {
        let succeeded = body.get("success").and_then(Value::as_bool).unwrap_or(false);

        if !succeeded {
            let failure: FailureBody = serde_json::from_value(body).unwrap_or_default();
            let message = failure
                .message
                .filter(|m| !m.trim().is_empty())
                .or(failure.error)
                .unwrap_or_else(|| format!("The {kind} request failed"));
            return Ok(OperationResult::Error(ErrorResult {
                message,
                detail_errors: failure.errors.unwrap_or_default(),
                request_id: failure.request_id,
            }));
        }

        let result = match kind {
            OperationKind::Execute => OperationResult::Success(serde_json::from_value(body)?),
            OperationKind::Preview => OperationResult::Preview(serde_json::from_value(body)?),
            OperationKind::Plan => OperationResult::Plan(serde_json::from_value(body)?),
            OperationKind::Analyze => OperationResult::Analysis(serde_json::from_value(body)?),
        };
        Ok(result)
    }
}

/// `{success: bool}` returned by the two connection probes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}
