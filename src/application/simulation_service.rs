// Simulation service - Drives a timed run of the water network board
use crate::domain::simulation::{NetworkState, SimulationRun, TICKS_PER_STEP};
use futures::stream::Stream;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SimulationFrame {
    pub elapsed_secs: f64,
    pub progress_percent: f64,
    pub network: NetworkState,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct SimulationService {
    duration_secs: u32,
    tick: Duration,
}

impl SimulationService {
    pub fn new(duration_secs: u32, tick: Duration) -> Self {
        Self {
            duration_secs,
            tick,
        }
    }

    pub fn run(&self) -> impl Stream<Item = SimulationFrame> + Send + 'static {
        self.run_with(StdRng::from_entropy())
    }

    /// Yields a frame after every network step and once more on completion.
    pub fn run_with(&self, mut rng: StdRng) -> impl Stream<Item = SimulationFrame> + Send + 'static {
        let mut run = SimulationRun::new(self.duration_secs);
        let period = self.tick;

        async_stream::stream! {
            let mut network = NetworkState::default();
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;

            while run.tick() {
                ticker.tick().await;
                if run.at_step_boundary() || run.is_finished() {
                    network.step(&mut rng);
                    yield SimulationFrame {
                        elapsed_secs: run.elapsed_secs(),
                        progress_percent: run.progress_percent(),
                        network: network.clone(),
                        finished: run.is_finished(),
                    };
                }
            }

            tracing::debug!(ticks_per_step = TICKS_PER_STEP, "Simulation run complete");
        }
    }
}

impl Default for SimulationService {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn test_run_yields_one_frame_per_second() {
        let service = SimulationService::default();
        let frames: Vec<SimulationFrame> = service.run_with(StdRng::seed_from_u64(4)).collect().await;

        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0].elapsed_secs, 1.0);
        assert_eq!(frames[4].progress_percent, 50.0);
        assert!(frames.last().unwrap().finished);
        assert!(frames.iter().take(9).all(|f| !f.finished));
        assert_eq!(frames.last().unwrap().progress_percent, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_length_run_is_empty() {
        let service = SimulationService::new(0, Duration::from_millis(100));
        let frames: Vec<SimulationFrame> = service.run_with(StdRng::seed_from_u64(4)).collect().await;
        assert!(frames.is_empty());
    }
}
