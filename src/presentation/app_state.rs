// Dashboard root state: owns the node registry and the active telemetry view
use crate::application::acquisition_service::Acquisition;
use crate::application::dashboard_service::DashboardService;
use crate::application::node_registry::NodeRegistry;
use crate::application::poller::{PollingHandle, TelemetryPoller};
use crate::application::simulation_service::SimulationService;
use crate::domain::dashboard::Dashboard;
use crate::domain::node::NewNode;
use crate::presentation::commands::{self, Command};
use futures::stream::Stream;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
pub enum Reply {
    /// One-line feedback for the message bar.
    Text(String),
    Help(String),
    Simulate,
    Quit,
}

pub struct AppState {
    registry: NodeRegistry,
    poller: TelemetryPoller,
    dashboard_service: DashboardService,
    simulation_service: SimulationService,
    default_channel: String,
    view: PollingHandle,
}

impl AppState {
    /// Starts polling the default channel straight away.
    pub fn new(
        registry: NodeRegistry,
        poller: TelemetryPoller,
        simulation_service: SimulationService,
        default_channel: String,
    ) -> Self {
        let view = poller.start(default_channel.clone());
        Self {
            registry,
            poller,
            dashboard_service: DashboardService::new(),
            simulation_service,
            default_channel,
            view,
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn simulation(&self) -> &SimulationService {
        &self.simulation_service
    }

    pub fn channel_id(&self) -> &str {
        self.view.channel_id()
    }

    pub fn updates(&self) -> impl Stream<Item = Arc<Acquisition>> + Send + Unpin + 'static {
        self.view.updates()
    }

    pub fn dashboard(&self) -> Dashboard {
        let latest = self.view.latest();
        self.dashboard_service
            .build(&self.registry, latest.as_deref(), self.view.is_loading())
    }

    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Nodes => Reply::Text(format!("{} nodes registered", self.registry.nodes().len())),
            Command::Select { id } => {
                if !self.registry.select_node(&id) {
                    tracing::warn!(id = %id, "No such node");
                    return Reply::Text(format!("No node with id {}", id));
                }
                self.follow_selection();
                let name = self.registry.selected_node().map(|n| n.name.as_str()).unwrap_or(id.as_str());
                Reply::Text(format!("Viewing {}", name))
            }
            Command::Add { lat, lng, name } => {
                match self.registry.add_node(NewNode::new(name.join(" "), lat, lng)) {
                    Ok(node) => {
                        tracing::info!(id = %node.id, name = %node.name, "Node added");
                        self.follow_selection();
                        Reply::Text(format!("Added {} [{}]", node.name, node.id))
                    }
                    Err(e) => Reply::Text(format!("Cannot add node: {}", e)),
                }
            }
            Command::Remove { id } => match self.registry.remove_node(&id) {
                Some(node) => {
                    tracing::info!(id = %node.id, "Node removed");
                    self.follow_selection();
                    Reply::Text(format!("Removed {} [{}]", node.name, node.id))
                }
                None => Reply::Text(format!("No node with id {}", id)),
            },
            Command::Refresh => {
                self.view.refresh().await;
                Reply::Text("Refreshing...".to_string())
            }
            Command::Simulate => Reply::Simulate,
            Command::Help => Reply::Help(commands::help()),
            Command::Quit => Reply::Quit,
        }
    }

    /// Points polling at the channel of whatever node is selected now, or
    /// the default channel when nothing is. A replaced view is dropped,
    /// which discards its in-flight fetches.
    fn follow_selection(&mut self) {
        let channel = self
            .registry
            .selected_node()
            .and_then(|n| n.channel_id.clone())
            .unwrap_or_else(|| self.default_channel.clone());

        if channel != self.view.channel_id() {
            tracing::info!(channel_id = %channel, "Switching telemetry view");
            self.view = self.poller.start(channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::acquisition_service::TelemetryAcquisitionService;
    use crate::application::synthetic::SyntheticTelemetry;
    use crate::application::telemetry_repository::{AcquisitionError, TelemetryRepository};
    use crate::domain::node::Node;
    use crate::domain::telemetry::{RawSample, TimeWindow};
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::time::Duration;

    struct EchoRepository;

    #[async_trait]
    impl TelemetryRepository for EchoRepository {
        async fn fetch_feeds(
            &self,
            channel_id: &str,
            window: &TimeWindow,
        ) -> Result<Vec<RawSample>, AcquisitionError> {
            match channel_id.parse::<f64>() {
                Ok(value) => Ok(vec![RawSample {
                    created_at: window.end,
                    field1: Some(value),
                    ..RawSample::default()
                }]),
                Err(_) => Err(AcquisitionError::Http { status: 404 }),
            }
        }
    }

    fn state() -> AppState {
        let service = TelemetryAcquisitionService::new(
            Arc::new(EchoRepository),
            Arc::new(SyntheticTelemetry::seeded(8)),
        );
        let registry = NodeRegistry::new(vec![
            Node::new("IIIT", "IIIT", 17.446146, 78.349206),
            Node {
                channel_id: Some("777".to_string()),
                ..Node::new("PH", "Pump House", 17.45, 78.35)
            },
        ]);
        AppState::new(
            registry,
            TelemetryPoller::new(service, Duration::from_secs(300)),
            SimulationService::default(),
            "100".to_string(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_switches_channel() {
        let mut state = state();
        let first = state.updates().next().await.unwrap();
        assert_eq!(first.latest.temperature, 100.0);

        let reply = state.handle(Command::Select { id: "PH".into() }).await;
        assert_eq!(reply, Reply::Text("Viewing Pump House".to_string()));
        assert_eq!(state.channel_id(), "777");

        let switched = state.updates().next().await.unwrap();
        assert_eq!(switched.channel_id, "777");
        assert_eq!(switched.latest.temperature, 777.0);

        // Node without its own channel falls back to the default one.
        state.handle(Command::Select { id: "IIIT".into() }).await;
        assert_eq!(state.channel_id(), "100");
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_selected_node_returns_to_default_channel() {
        let mut state = state();
        state.handle(Command::Select { id: "PH".into() }).await;
        assert_eq!(state.channel_id(), "777");

        state.handle(Command::Remove { id: "PH".into() }).await;
        assert!(state.registry().selected_node().is_none());
        assert_eq!(state.channel_id(), "100");

        let shown = state.updates().next().await.unwrap();
        assert_eq!(shown.channel_id, "100");
        assert!(state.dashboard().detail.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_selection_is_reported() {
        let mut state = state();
        state.handle(Command::Select { id: "IIIT".into() }).await;
        let reply = state.handle(Command::Select { id: "ghost".into() }).await;
        assert_eq!(reply, Reply::Text("No node with id ghost".to_string()));
        assert_eq!(state.registry().selected_node().unwrap().id, "IIIT");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_remove_and_quit() {
        let mut state = state();
        let reply = state
            .handle(Command::Add {
                lat: "17.0".into(),
                lng: "bad".into(),
                name: vec!["Sump".into()],
            })
            .await;
        assert!(matches!(reply, Reply::Text(ref t) if t.starts_with("Cannot add node")));
        assert_eq!(state.registry().nodes().len(), 2);

        let reply = state
            .handle(Command::Add {
                lat: "17.0".into(),
                lng: "78.0".into(),
                name: vec!["Sump".into(), "Well".into()],
            })
            .await;
        assert!(matches!(reply, Reply::Text(ref t) if t.starts_with("Added Sump Well [")));
        assert_eq!(state.registry().nodes().len(), 3);

        state.handle(Command::Remove { id: "PH".into() }).await;
        assert_eq!(state.registry().nodes().len(), 2);
        assert!(matches!(state.handle(Command::Help).await, Reply::Help(ref h) if h.contains("select")));
        assert_eq!(state.handle(Command::Simulate).await, Reply::Simulate);
        assert_eq!(state.handle(Command::Quit).await, Reply::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_channel_renders_error() {
        let service = TelemetryAcquisitionService::new(
            Arc::new(EchoRepository),
            Arc::new(SyntheticTelemetry::seeded(8)),
        );
        let state = AppState::new(
            NodeRegistry::default(),
            TelemetryPoller::new(service, Duration::from_secs(300)),
            SimulationService::default(),
            "not-a-channel".to_string(),
        );

        let acquisition = state.updates().next().await.unwrap();
        assert!(acquisition.is_degraded());

        let dashboard = state.dashboard();
        assert_eq!(dashboard.status.error.as_deref(), Some("Failed to fetch data: 404"));
        assert_eq!(dashboard.charts.len(), 3);
    }
}
