use crate::api::{AnalyzeRequest, EditRequest, OperationKind, Service};
use crate::validate::{self, ValidationError};

use super::modal::ModalController;
use super::status::StatusIndicator;

/// Everything the page shows, constructed once per console.
#[derive(Debug)]
pub struct ViewModel {
    pub form: EditForm,
    pub panel: ResultPanel,
    pub hosting: StatusIndicator,
    pub ai_model: StatusIndicator,
    pub modals: ModalController,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            form: EditForm::default(),
            panel: ResultPanel::default(),
            hosting: StatusIndicator::new(Service::Hosting),
            ai_model: StatusIndicator::new(Service::AiModel),
            modals: ModalController::default(),
        }
    }
}

impl ViewModel {
    pub fn indicator_mut(&mut self, service: Service) -> &mut StatusIndicator {
        match service {
            Service::Hosting => &mut self.hosting,
            Service::AiModel => &mut self.ai_model,
        }
    }
}

/// Raw values of the edit form's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub repo_url: String,
    pub instruction: String,
    /// Blank means "let the backend pick one".
    pub branch_name: String,
    pub create_pr: bool,
}

impl Default for EditForm {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            instruction: String::new(),
            branch_name: String::new(),
            create_pr: true,
        }
    }
}

impl EditForm {
    /// Validate the fields and build the request body. The URL is checked
    /// before the instruction.
    pub fn to_request(&self) -> Result<EditRequest, ValidationError> {
        let repo_url = self.checked_repo_url()?;
        let instruction = validate::require_instruction(&self.instruction)?;
        let branch_name = Some(self.branch_name.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        Ok(EditRequest {
            repo_url: repo_url.to_string(),
            request: instruction.to_string(),
            branch_name,
            create_pr: self.create_pr,
        })
    }

    /// Analysis only needs the repository; the instruction is ignored.
    pub fn to_analyze_request(&self) -> Result<AnalyzeRequest, ValidationError> {
        Ok(AnalyzeRequest {
            repo_url: self.checked_repo_url()?.to_string(),
        })
    }

    fn checked_repo_url(&self) -> Result<&str, ValidationError> {
        let repo_url = self.repo_url.trim();
        if !validate::is_valid_repo_url(repo_url) {
            return Err(ValidationError::InvalidUrl(repo_url.to_string()));
        }
        Ok(repo_url)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Idle,
    Validating,
    Submitting(OperationKind),
    Succeeded,
    PreviewReady,
    Planned,
    Analyzed,
    Failed,
}

impl std::fmt::Display for PanelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelState::Idle => write!(f, "idle"),
            PanelState::Validating => write!(f, "validating"),
            PanelState::Submitting(kind) => write!(f, "submitting ({kind})"),
            PanelState::Succeeded => write!(f, "succeeded"),
            PanelState::PreviewReady => write!(f, "preview ready"),
            PanelState::Planned => write!(f, "planned"),
            PanelState::Analyzed => write!(f, "analyzed"),
            PanelState::Failed => write!(f, "failed"),
        }
    }
}

/// The result area. Only the operation holding the latest token may write
/// to it.
#[derive(Debug, Default)]
pub struct ResultPanel {
    state: PanelState,
    html: String,
    visible: bool,
    scroll_requests: u32,
    latest_token: u64,
    /// The request behind the preview on screen, replayed by the apply action.
    previewed: Option<EditRequest>,
}

impl ResultPanel {
    /// Start a new operation. Any operation started earlier loses the right
    /// to write.
    pub fn begin(&mut self) -> u64 {
        self.latest_token += 1;
        self.state = PanelState::Validating;
        self.previewed = None;
        self.latest_token
    }

    pub fn is_latest(&self, token: u64) -> bool {
        token == self.latest_token
    }

    /// Enter `state` with `html` as the panel content. Returns false, leaving
    /// the panel untouched, when `token` has been superseded.
    pub fn enter(&mut self, token: u64, state: PanelState, html: String) -> bool {
        if !self.is_latest(token) {
            return false;
        }
        self.state = state;
        self.html = html;
        self.visible = true;
        if matches!(state, PanelState::Submitting(_)) {
            self.scroll_requests += 1;
        }
        true
    }

    /// Like [`enter`](Self::enter) with `PreviewReady`, remembering the
    /// request that produced the preview.
    pub fn enter_preview(&mut self, token: u64, html: String, request: EditRequest) -> bool {
        if !self.enter(token, PanelState::PreviewReady, html) {
            return false;
        }
        self.previewed = Some(request);
        true
    }

    /// The request behind the visible preview, if a preview is showing.
    pub fn previewed_request(&self) -> Option<&EditRequest> {
        match self.state {
            PanelState::PreviewReady => self.previewed.as_ref(),
            _ => None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// How many times the panel asked to be scrolled into view.
    pub fn scroll_requests(&self) -> u32 {
        self.scroll_requests
    }
}
