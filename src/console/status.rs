use colored::{Color, Colorize};
use tokio::sync::Mutex;
use tracing::{debug, info_span, warn, Instrument};

use crate::api::{EditBackend, Service};
use crate::html::escape;

use super::view::ViewModel;

/// Reachability of one external service as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not probed yet.
    #[default]
    Checking,
    Connected,
    /// The probe answered, and the backend cannot reach the service.
    Disconnected,
    /// The probe itself failed (backend down, bad response).
    Failed,
}

/// One of the two status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pub service: Service,
    pub state: ConnectionState,
}

impl StatusIndicator {
    pub fn new(service: Service) -> Self {
        Self {
            service,
            state: ConnectionState::default(),
        }
    }

    pub fn text(&self) -> &'static str {
        match self.state {
            ConnectionState::Checking => "Checking…",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Failed => "Connection failed",
        }
    }

    pub fn color(&self) -> Color {
        match self.state {
            ConnectionState::Checking => Color::Yellow,
            ConnectionState::Connected => Color::Green,
            ConnectionState::Disconnected | ConnectionState::Failed => Color::Red,
        }
    }

    /// Terminal line, e.g. "GitHub: Connected" with the state coloured.
    pub fn terminal_line(&self) -> String {
        format!("{}: {}", self.service, self.text().color(self.color()).bold())
    }

    pub fn to_html(&self) -> String {
        let class = match self.state {
            ConnectionState::Checking => "checking",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        };
        format!(
            "<span class=\"status-indicator {class}\">{}: {}</span>",
            escape(&self.service.to_string()),
            self.text()
        )
    }
}

/// Probe both services concurrently. Each probe writes only its own
/// indicator, and a failing probe never touches the other one.
pub async fn check_connections(
    backend: &dyn EditBackend,
    view: &Mutex<ViewModel>,
) -> [StatusIndicator; 2] {
    let (hosting, ai_model) = tokio::join!(
        probe_one(backend, Service::Hosting, view)
            .instrument(info_span!("probe", service = "hosting")),
        probe_one(backend, Service::AiModel, view)
            .instrument(info_span!("probe", service = "ai_model")),
    );
    [hosting, ai_model]
}

async fn probe_one(
    backend: &dyn EditBackend,
    service: Service,
    view: &Mutex<ViewModel>,
) -> StatusIndicator {
    let state = match backend.probe(service).await {
        Ok(true) => ConnectionState::Connected,
        Ok(false) => ConnectionState::Disconnected,
        Err(err) => {
            warn!(%service, error = %err, "connection probe failed");
            ConnectionState::Failed
        }
    };
    debug!(%service, ?state, "probe finished");

    let mut view = view.lock().await;
    let indicator = view.indicator_mut(service);
    indicator.state = state;
    *indicator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::ScriptedBackend;

    #[test]
    fn test_indicator_text_and_color() {
        let mut indicator = StatusIndicator::new(Service::Hosting);
        assert_eq!(indicator.text(), "Checking…");
        indicator.state = ConnectionState::Connected;
        assert_eq!(indicator.color(), Color::Green);
        indicator.state = ConnectionState::Failed;
        assert_eq!(indicator.text(), "Connection failed");
        assert_eq!(indicator.color(), Color::Red);
        assert_eq!(
            indicator.to_html(),
            "<span class=\"status-indicator failed\">GitHub: Connection failed</span>"
        );
    }

    #[tokio::test]
    async fn test_both_connected() {
        let backend = ScriptedBackend::new()
            .with_probe(Service::Hosting, Ok(true))
            .with_probe(Service::AiModel, Ok(true));
        let view = Mutex::new(ViewModel::default());
        let [hosting, ai_model] = check_connections(&backend, &view).await;
        assert_eq!(hosting.state, ConnectionState::Connected);
        assert_eq!(ai_model.state, ConnectionState::Connected);
        assert_eq!(view.lock().await.ai_model.state, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_one_failing_probe_does_not_mask_the_other() {
        let backend = ScriptedBackend::new()
            .with_probe(Service::Hosting, Err(()))
            .with_probe(Service::AiModel, Ok(true));
        let view = Mutex::new(ViewModel::default());
        check_connections(&backend, &view).await;

        let view = view.lock().await;
        assert_eq!(view.hosting.state, ConnectionState::Failed);
        assert_eq!(view.ai_model.state, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_service_reported_down() {
        let backend = ScriptedBackend::new()
            .with_probe(Service::Hosting, Ok(true))
            .with_probe(Service::AiModel, Ok(false));
        let view = Mutex::new(ViewModel::default());
        let [_, ai_model] = check_connections(&backend, &view).await;
        assert_eq!(ai_model.state, ConnectionState::Disconnected);
        assert_eq!(backend.probe_calls(), 2);
    }
}
