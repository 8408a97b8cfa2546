//! In-memory backend used by the console tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::api::{
    AnalyzeRequest, ApiError, EditBackend, EditRequest, ErrorResult, HealthStatus, OperationKind,
    OperationResult, Service,
};

/// Replays scripted responses in call order. `Err(())` stands for a
/// transport failure.
#[derive(Default)]
pub struct ScriptedBackend {
    hosting_probe: Option<Result<bool, ()>>,
    ai_probe: Option<Result<bool, ()>>,
    responses: Mutex<VecDeque<Result<OperationResult, ()>>>,
    requests: Mutex<Vec<(OperationKind, EditRequest)>>,
    analyzed: Mutex<Vec<String>>,
    probe_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    /// Requests with this instruction block until another request finishes.
    held_instruction: Option<String>,
    release: Notify,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(mut self, service: Service, outcome: Result<bool, ()>) -> Self {
        match service {
            Service::Hosting => self.hosting_probe = Some(outcome),
            Service::AiModel => self.ai_probe = Some(outcome),
        }
        self
    }

    pub fn with_response(self, outcome: Result<OperationResult, ()>) -> Self {
        self.responses.lock().unwrap().push_back(outcome);
        self
    }

    pub fn holding(mut self, instruction: &str) -> Self {
        self.held_instruction = Some(instruction.to_string());
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(OperationKind, EditRequest)> {
        self.requests.lock().unwrap().clone()
    }

    /// Repository URLs passed to `analyze`, in call order.
    pub fn analyzed(&self) -> Vec<String> {
        self.analyzed.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<OperationResult, ()> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(OperationResult::Error(ErrorResult::from_message("no scripted response"))))
    }
}

#[async_trait]
impl EditBackend for ScriptedBackend {
    async fn probe(&self, service: Service) -> Result<bool, ApiError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match service {
            Service::Hosting => self.hosting_probe,
            Service::AiModel => self.ai_probe,
        };
        outcome
            .unwrap_or(Ok(true))
            .map_err(|()| ApiError::NotJson { status: 500 })
    }

    async fn submit(
        &self,
        kind: OperationKind,
        request: &EditRequest,
    ) -> Result<OperationResult, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((kind, request.clone()));
        let outcome = self.next_response();

        if self.held_instruction.as_deref() == Some(request.request.as_str()) {
            self.release.notified().await;
        } else {
            self.release.notify_one();
        }

        outcome.map_err(|()| ApiError::NotJson { status: 502 })
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<OperationResult, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.analyzed.lock().unwrap().push(request.repo_url.clone());
        self.next_response().map_err(|()| ApiError::NotJson { status: 502 })
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            timestamp: None,
            version: Some("1.0.0".to_string()),
        })
    }
}
