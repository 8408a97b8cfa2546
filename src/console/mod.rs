pub mod modal;
pub mod picker;
pub mod status;
#[cfg(test)]
pub(crate) mod testing;
pub mod view;

pub use modal::{Click, Modal};
pub use status::StatusIndicator;
pub use view::{EditForm, PanelState, ViewModel};

use tokio::sync::Mutex;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::api::{
    AnalyzeRequest, EditBackend, EditRequest, ErrorResult, OperationKind, OperationResult,
};
use crate::config::PreviewDefaults;
use crate::render;

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub token: u64,
    pub state: PanelState,
    /// False when a newer operation started first and this result was
    /// discarded.
    pub applied: bool,
}

/// A validated request waiting for its backend call.
enum Pending {
    Edit(EditRequest),
    Analyze(AnalyzeRequest),
}

/// Drives the form → request → result panel cycle against one backend.
pub struct Console<B> {
    backend: B,
    view: Mutex<ViewModel>,
    defaults: PreviewDefaults,
}

impl<B: EditBackend> Console<B> {
    pub fn new(backend: B, defaults: PreviewDefaults) -> Self {
        Self {
            backend,
            view: Mutex::new(ViewModel::default()),
            defaults,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared view state. Hold the guard only briefly; operations lock it
    /// on every state entry.
    pub fn view(&self) -> &Mutex<ViewModel> {
        &self.view
    }

    pub async fn fill_form(&self, form: EditForm) {
        self.view.lock().await.form = form;
    }

    /// Probe both external services and update their indicators.
    pub async fn check_connections(&self) -> [StatusIndicator; 2] {
        status::check_connections(&self.backend, &self.view).await
    }

    /// Copy example `index` (1-based) into the form.
    pub async fn pick_example(
        &self,
        index: usize,
    ) -> Result<&'static picker::Example, picker::PickerError> {
        let example = picker::example(index)?;
        picker::apply_example(&mut self.view.lock().await.form, example);
        debug!(title = example.title, "example picked");
        Ok(example)
    }

    pub async fn open_modal(&self, modal: Modal) {
        self.view.lock().await.modals.open(modal);
    }

    #[allow(dead_code)] // See `Click`
    pub async fn click_modal(&self, click: Click) {
        self.view.lock().await.modals.click(click);
    }

    /// Run one operation from the current form contents. `Analyze` needs
    /// only a valid repository URL.
    ///
    /// Validation failures end in `Failed` without a network call. Otherwise
    /// the loading placeholder is shown, exactly one backend call is made,
    /// and its result is rendered, unless another operation started in the
    /// meantime.
    pub async fn submit(&self, kind: OperationKind) -> Completion {
        let (token, form) = {
            let mut view = self.view.lock().await;
            (view.panel.begin(), view.form.clone())
        };
        self.run(token, kind, form)
            .instrument(info_span!("operation", token, %kind))
            .await
    }

    /// The preview panel's apply action: send the request that produced the
    /// visible preview to `execute`, whatever the form holds now. Returns
    /// None unless a preview is currently shown.
    #[instrument(skip(self))]
    pub async fn confirm_preview(&self) -> Option<Completion> {
        let (token, request) = {
            let mut view = self.view.lock().await;
            let Some(request) = view.panel.previewed_request().cloned() else {
                debug!(state = %view.panel.state(), "no preview to confirm");
                return None;
            };
            (view.panel.begin(), request)
        };
        let kind = OperationKind::Execute;
        Some(
            self.dispatch(token, kind, Pending::Edit(request))
                .instrument(info_span!("operation", token, %kind))
                .await,
        )
    }

    async fn run(&self, token: u64, kind: OperationKind, form: EditForm) -> Completion {
        let validated = match kind {
            OperationKind::Analyze => form.to_analyze_request().map(Pending::Analyze),
            _ => form.to_request().map(Pending::Edit),
        };
        match validated {
            Ok(pending) => self.dispatch(token, kind, pending).await,
            Err(err) => {
                info!(error = %err, "rejected before submitting");
                let html = render::render_error(&ErrorResult::from_message(err.to_string()));
                self.enter(token, PanelState::Failed, html).await
            }
        }
    }

    /// Show the loading placeholder, make the one backend call, and render
    /// what came back.
    async fn dispatch(&self, token: u64, kind: OperationKind, pending: Pending) -> Completion {
        self.enter(token, PanelState::Submitting(kind), render::render_loading(kind))
            .await;

        let outcome = match &pending {
            Pending::Edit(request) => self.backend.submit(kind, request).await,
            Pending::Analyze(request) => self.backend.analyze(request).await,
        };
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "backend call failed");
                OperationResult::Error(ErrorResult::from_message(err.to_string()))
            }
        };

        let html = render::render_result(&result, &self.defaults);
        match (result, pending) {
            (OperationResult::Preview(_), Pending::Edit(request)) => {
                let applied = self.view.lock().await.panel.enter_preview(token, html, request);
                self.completed(token, PanelState::PreviewReady, applied)
            }
            (result, _) => {
                let state = match &result {
                    OperationResult::Success(_) => PanelState::Succeeded,
                    OperationResult::Preview(_) => PanelState::PreviewReady,
                    OperationResult::Plan(_) => PanelState::Planned,
                    OperationResult::Analysis(_) => PanelState::Analyzed,
                    OperationResult::Error(error) => {
                        info!(reason = %error.message, request_id = ?error.request_id, "backend reported failure");
                        PanelState::Failed
                    }
                };
                self.enter(token, state, html).await
            }
        }
    }

    async fn enter(&self, token: u64, state: PanelState, html: String) -> Completion {
        let applied = self.view.lock().await.panel.enter(token, state, html);
        self.completed(token, state, applied)
    }

    fn completed(&self, token: u64, state: PanelState, applied: bool) -> Completion {
        if applied {
            debug!(%state, "panel updated");
        } else {
            debug!(%state, "discarding result of superseded operation");
        }
        Completion { token, state, applied }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        AnalysisResult, PlanSummary, PreviewResult, RepositoryAnalysis, RepositoryInfo,
        SuccessResult,
    };
    use super::testing::ScriptedBackend;

    const REPO: &str = "https://github.com/octocat/Hello-World";

    fn form(instruction: &str) -> EditForm {
        EditForm {
            repo_url: REPO.to_string(),
            instruction: instruction.to_string(),
            ..EditForm::default()
        }
    }

    fn success() -> OperationResult {
        OperationResult::Success(SuccessResult {
            pull_request: None,
            pull_request_error: None,
            branch_name: Some("ai-edit-add-docs".to_string()),
            changes_count: Some(0),
            changed_files: vec![],
            warnings: vec![],
            request_id: None,
        })
    }

    fn preview() -> OperationResult {
        OperationResult::Preview(PreviewResult {
            plan_summary: PlanSummary::default(),
            sample_changes: vec![],
            request_id: None,
        })
    }

    fn console(backend: ScriptedBackend) -> Console<ScriptedBackend> {
        Console::new(backend, PreviewDefaults::default())
    }

    #[tokio::test]
    async fn test_empty_instruction_makes_no_call() {
        let console = console(ScriptedBackend::new());
        console.fill_form(form("   ")).await;
        let done = console.submit(OperationKind::Execute).await;

        assert_eq!(done.state, PanelState::Failed);
        assert!(done.applied);
        assert_eq!(console.backend().submit_calls(), 0);
        let view = console.view().lock().await;
        assert!(view.panel.html().contains("Missing instruction"));
        assert_eq!(view.panel.scroll_requests(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_call() {
        let console = console(ScriptedBackend::new());
        let mut bad = form("Add docs");
        bad.repo_url = "https://github.com/octocat/Hello-World/".to_string();
        console.fill_form(bad).await;
        let done = console.submit(OperationKind::Preview).await;

        assert_eq!(done.state, PanelState::Failed);
        assert_eq!(console.backend().submit_calls(), 0);
        assert!(console.view().lock().await.panel.html().contains("Invalid repository URL"));
    }

    #[tokio::test]
    async fn test_execute_success() {
        let console = console(ScriptedBackend::new().with_response(Ok(success())));
        console.fill_form(form("Add docs")).await;
        let done = console.submit(OperationKind::Execute).await;

        assert_eq!(done.state, PanelState::Succeeded);
        let requests = console.backend().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, OperationKind::Execute);
        assert_eq!(requests[0].1.request, "Add docs");
        assert!(requests[0].1.create_pr);

        let view = console.view().lock().await;
        assert!(view.panel.html().contains("Changes applied"));
        assert_eq!(view.panel.scroll_requests(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_renders_error() {
        let console = console(ScriptedBackend::new().with_response(Err(())));
        console.fill_form(form("Add docs")).await;
        let done = console.submit(OperationKind::Execute).await;

        assert_eq!(done.state, PanelState::Failed);
        assert!(console.view().lock().await.panel.html().contains("HTTP 502"));
    }

    #[tokio::test]
    async fn test_backend_failure_renders_details() {
        let failure = OperationResult::Error(ErrorResult {
            message: "Bad request".to_string(),
            detail_errors: vec!["field X missing".to_string()],
            request_id: Some("r-123".to_string()),
        });
        let console = console(ScriptedBackend::new().with_response(Ok(failure)));
        console.fill_form(form("Add docs")).await;
        let done = console.submit(OperationKind::Execute).await;

        assert_eq!(done.state, PanelState::Failed);
        let view = console.view().lock().await;
        assert!(view.panel.html().contains("field X missing"));
        assert!(view.panel.html().contains("r-123"));
    }

    #[tokio::test]
    async fn test_preview_then_confirm() {
        let backend = ScriptedBackend::new()
            .with_response(Ok(preview()))
            .with_response(Ok(success()));
        let console = console(backend);
        console.fill_form(form("Add docs")).await;

        assert!(console.confirm_preview().await.is_none());
        let done = console.submit(OperationKind::Preview).await;
        assert_eq!(done.state, PanelState::PreviewReady);
        assert!(console.view().lock().await.panel.html().contains("Confidence: 0.0%"));

        let confirmed = console.confirm_preview().await.unwrap();
        assert_eq!(confirmed.state, PanelState::Succeeded);
        let kinds: Vec<_> = console.backend().requests().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![OperationKind::Preview, OperationKind::Execute]);
    }

    #[tokio::test]
    async fn test_confirm_replays_the_previewed_request() {
        let backend = ScriptedBackend::new()
            .with_response(Ok(preview()))
            .with_response(Ok(success()));
        let console = console(backend);
        console.fill_form(form("Add docs")).await;
        console.submit(OperationKind::Preview).await;

        console.fill_form(form("Something else entirely")).await;
        let confirmed = console.confirm_preview().await.unwrap();
        assert_eq!(confirmed.state, PanelState::Succeeded);
        let requests = console.backend().requests();
        assert_eq!(requests[1].0, OperationKind::Execute);
        assert_eq!(requests[1].1, requests[0].1);
        assert_eq!(requests[1].1.request, "Add docs");

        assert!(console.confirm_preview().await.is_none());
    }

    #[tokio::test]
    async fn test_analyze_needs_only_the_url() {
        let analysis = OperationResult::Analysis(AnalysisResult {
            repository: RepositoryInfo {
                owner: "octocat".to_string(),
                name: "Hello-World".to_string(),
                url: None,
                description: None,
                default_branch: Some("main".to_string()),
            },
            analysis: RepositoryAnalysis::default(),
            request_id: None,
        });
        let console = console(ScriptedBackend::new().with_response(Ok(analysis)));
        console.fill_form(form("")).await;
        let done = console.submit(OperationKind::Analyze).await;

        assert_eq!(done.state, PanelState::Analyzed);
        assert_eq!(console.backend().analyzed(), vec![REPO]);
        assert!(console.backend().requests().is_empty());
        assert!(console.view().lock().await.panel.html().contains("octocat/Hello-World"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_url() {
        let console = console(ScriptedBackend::new());
        let mut bad = form("");
        bad.repo_url = "octocat/Hello-World".to_string();
        console.fill_form(bad).await;
        let done = console.submit(OperationKind::Analyze).await;

        assert_eq!(done.state, PanelState::Failed);
        assert_eq!(console.backend().submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_new_operation_replaces_previous_result() {
        let backend = ScriptedBackend::new()
            .with_response(Ok(success()))
            .with_response(Ok(preview()));
        let console = console(backend);
        console.fill_form(form("Add docs")).await;
        console.submit(OperationKind::Execute).await;
        console.submit(OperationKind::Preview).await;

        let view = console.view().lock().await;
        assert_eq!(view.panel.state(), PanelState::PreviewReady);
        assert!(!view.panel.html().contains("Changes applied"));
    }

    #[tokio::test]
    async fn test_late_result_does_not_overwrite_newer_one() {
        let slow = OperationResult::Error(ErrorResult::from_message("slow result"));
        let backend = ScriptedBackend::new()
            .with_response(Ok(slow))
            .with_response(Ok(success()))
            .holding("slow");
        let console = console(backend);

        let first = async {
            console.fill_form(form("slow")).await;
            console.submit(OperationKind::Execute).await
        };
        let second = async {
            tokio::task::yield_now().await;
            console.fill_form(form("fast")).await;
            console.submit(OperationKind::Execute).await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(!first.applied);
        assert!(second.applied);
        assert!(first.token < second.token);
        let view = console.view().lock().await;
        assert_eq!(view.panel.state(), PanelState::Succeeded);
        assert!(!view.panel.html().contains("slow result"));
    }

    #[tokio::test]
    async fn test_pick_example_and_modals() {
        let console = console(ScriptedBackend::new());
        let example = console.pick_example(1).await.unwrap();
        assert_eq!(console.view().lock().await.form.instruction, example.instruction);
        assert!(console.pick_example(99).await.is_err());

        console.open_modal(Modal::Help).await;
        console.click_modal(Click::Backdrop(Modal::Help)).await;
        assert!(!console.view().lock().await.modals.is_open(Modal::Help));
    }
}
