// Main entry point - Dependency injection and terminal event loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use futures::stream::BoxStream;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::application::acquisition_service::TelemetryAcquisitionService;
use crate::application::node_registry::NodeRegistry;
use crate::application::poller::TelemetryPoller;
use crate::application::simulation_service::{SimulationFrame, SimulationService};
use crate::application::synthetic::SyntheticTelemetry;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::logging::init_tracing;
use crate::infrastructure::thingspeak_repository::ThingSpeakRepository;
use crate::presentation::app_state::{AppState, Reply};
use crate::presentation::console::Console;
use crate::presentation::render::{self, View};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Keeps the loading indicator and clock-driven text current between events.
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = load_dashboard_config()?;
    let _log_guard = init_tracing(&config.logging)?;

    // Infrastructure
    let repository = Arc::new(ThingSpeakRepository::new(
        config.feed.host.clone(),
        config.feed.read_api_key.clone(),
        config.feed.max_results,
        config.feed.timeout(),
    )?);

    // Application services
    let fallback = match config.feed.fallback_seed {
        Some(seed) => SyntheticTelemetry::seeded(seed),
        None => SyntheticTelemetry::new(),
    };
    let acquisition = TelemetryAcquisitionService::new(repository, Arc::new(fallback));
    let poller = TelemetryPoller::new(acquisition, config.polling.interval());

    let state = AppState::new(
        NodeRegistry::new(config.nodes),
        poller,
        SimulationService::default(),
        config.feed.channel_id,
    );
    tracing::info!(channel_id = %state.channel_id(), "Starting node dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, state).await;
    restore_terminal(&mut terminal)?;

    tracing::info!("Shutting down");
    result
}

fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, mut state: AppState) -> anyhow::Result<()> {
    let mut console = Console::default();
    let mut events = EventStream::new();
    let mut channel_id = state.channel_id().to_string();
    let mut updates = state.updates();
    let mut simulation: Option<BoxStream<'static, SimulationFrame>> = None;
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

    loop {
        let dashboard = state.dashboard();
        let view = View {
            nodes: state.registry().nodes(),
            selected: state.registry().selected_node().map(|n| n.id.as_str()),
            dashboard: &dashboard,
            console: &console,
        };
        terminal.draw(|frame| render::draw(frame, &view))?;

        tokio::select! {
            Some(acquisition) = updates.next() => {
                tracing::debug!(
                    channel_id = %acquisition.channel_id,
                    source = ?acquisition.source,
                    "Rendering acquisition"
                );
            }
            frame = next_frame(&mut simulation) => match frame {
                Some(frame) => console.show_simulation(frame),
                None => simulation = None,
            },
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let Some(command) = console.handle_key(key, state.registry().nodes()) else {
                        continue;
                    };
                    match state.handle(command).await {
                        Reply::Text(text) => console.set_message(text),
                        Reply::Help(text) => console.show_help(text),
                        Reply::Simulate => simulation = Some(state.simulation().run().boxed()),
                        Reply::Quit => break,
                    }
                    // Selection or removal may have moved the view to another channel
                    if state.channel_id() != channel_id {
                        channel_id = state.channel_id().to_string();
                        updates = state.updates();
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

/// Next simulation frame, or never while no run is active.
async fn next_frame(
    simulation: &mut Option<BoxStream<'static, SimulationFrame>>,
) -> Option<SimulationFrame> {
    match simulation {
        Some(frames) => frames.next().await,
        None => std::future::pending().await,
    }
}
