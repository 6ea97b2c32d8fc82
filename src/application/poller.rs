// Periodic telemetry polling for one view, with on-demand refresh
use crate::application::acquisition_service::{Acquisition, TelemetryAcquisitionService};
use futures::stream::Stream;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    sequence: u64,
}

/// Decides which fetch results may reach the display.
///
/// A result is dropped when its view has been torn down (generation
/// mismatch) or when a fetch issued after it has already been shown.
#[derive(Debug, Default)]
pub struct DisplayGate {
    generation: u64,
    next_sequence: u64,
    applied: Option<u64>,
    in_flight: usize,
}

impl DisplayGate {
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket {
            generation: self.generation,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.in_flight += 1;
        ticket
    }

    /// Marks the fetch for `ticket` finished and reports whether its
    /// result should be displayed.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.applied.is_some_and(|applied| applied > ticket.sequence) {
            return false;
        }
        self.applied = Some(ticket.sequence);
        true
    }

    /// Invalidates every outstanding ticket.
    pub fn retire(&mut self) {
        self.generation += 1;
        self.in_flight = 0;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[derive(Debug, Clone, Copy)]
enum PollCommand {
    Refresh,
}

#[derive(Clone)]
pub struct TelemetryPoller {
    service: TelemetryAcquisitionService,
    interval: Duration,
}

impl TelemetryPoller {
    pub fn new(service: TelemetryAcquisitionService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Starts polling `channel_id`; the first fetch is issued immediately.
    pub fn start(&self, channel_id: String) -> PollingHandle {
        let (commands, command_rx) = mpsc::channel(8);
        let (publisher, updates) = watch::channel(None);
        let gate = Arc::new(Mutex::new(DisplayGate::default()));

        tracing::info!(
            channel_id = %channel_id,
            interval_secs = self.interval.as_secs(),
            "Starting telemetry polling"
        );

        let task = tokio::spawn(poll_loop(
            self.service.clone(),
            channel_id.clone(),
            self.interval,
            command_rx,
            gate.clone(),
            publisher,
        ));

        PollingHandle {
            channel_id,
            commands,
            gate,
            updates,
            task,
        }
    }
}

async fn poll_loop(
    service: TelemetryAcquisitionService,
    channel_id: String,
    interval: Duration,
    mut commands: mpsc::Receiver<PollCommand>,
    gate: Arc<Mutex<DisplayGate>>,
    publisher: watch::Sender<Option<Arc<Acquisition>>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::debug!(channel_id = %channel_id, "Scheduled poll");
            }
            command = commands.recv() => match command {
                Some(PollCommand::Refresh) => tracing::debug!(channel_id = %channel_id, "Manual refresh"),
                None => break,
            },
        }

        let ticket = lock(&gate).issue();
        let service = service.clone();
        let channel_id = channel_id.clone();
        let gate = gate.clone();
        let publisher = publisher.clone();

        tokio::spawn(async move {
            let acquisition = service.acquire(&channel_id).await;
            if lock(&gate).complete(ticket) {
                publisher.send_replace(Some(Arc::new(acquisition)));
            } else {
                tracing::debug!(channel_id = %channel_id, ?ticket, "Discarding superseded acquisition");
            }
        });
    }

    tracing::debug!(channel_id = %channel_id, "Polling loop finished");
}

fn lock(gate: &Mutex<DisplayGate>) -> MutexGuard<'_, DisplayGate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live polling session for one channel. Dropping it stops the session.
pub struct PollingHandle {
    channel_id: String,
    commands: mpsc::Sender<PollCommand>,
    gate: Arc<Mutex<DisplayGate>>,
    updates: watch::Receiver<Option<Arc<Acquisition>>>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Requests an immediate fetch alongside the periodic schedule.
    pub async fn refresh(&self) {
        if self.commands.send(PollCommand::Refresh).await.is_err() {
            tracing::warn!(channel_id = %self.channel_id, "Refresh requested on stopped poller");
        }
    }

    pub fn latest(&self) -> Option<Arc<Acquisition>> {
        self.updates.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.gate).in_flight() > 0
    }

    /// Every displayed acquisition, starting with the current one if any.
    pub fn updates(&self) -> impl Stream<Item = Arc<Acquisition>> + Send + Unpin + 'static {
        WatchStream::new(self.updates.clone()).filter_map(|acquisition| acquisition)
    }

    /// Stops scheduling; results of fetches still in flight are dropped.
    pub fn stop(&self) {
        lock(&self.gate).retire();
        self.task.abort();
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
