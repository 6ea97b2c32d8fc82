// Water network simulation state
//
// Values are randomly perturbed each step; nothing here models hydraulics.
use rand::Rng;

pub const LOW_SUMP_ALERT: &str = "Low Sump Level";
pub const HIGH_MOTOR_TEMP_ALERT: &str = "High Motor Temperature";

const LOW_SUMP_THRESHOLD: f64 = 20.0;
const HIGH_MOTOR_TEMP_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkState {
    /// Percent full.
    pub sump_level: f64,
    /// Percent full.
    pub ro_tank_level: f64,
    pub pump_status: String,
    /// L/s
    pub flow_rate: f64,
    /// bar
    pub pressure: f64,
    /// °C
    pub motor_temp: f64,
    /// kW
    pub power_consumption: f64,
    pub alerts: Vec<String>,
}

impl Default for NetworkState {
    fn default() -> Self {
        Self {
            sump_level: 85.0,
            ro_tank_level: 60.0,
            pump_status: "Active".to_string(),
            flow_rate: 10.5,
            pressure: 2.4,
            motor_temp: 45.0,
            power_consumption: 2.5,
            alerts: Vec::new(),
        }
    }
}

impl NetworkState {
    /// Advances the board by one tick of random drift.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let sump_delta = rng.gen_range(-1.0..1.0);
        let ro_delta = rng.gen_range(-1.0..1.0);

        self.sump_level = round_to((self.sump_level - sump_delta).clamp(0.0, 100.0), 1);
        self.ro_tank_level = round_to((self.ro_tank_level + ro_delta).clamp(0.0, 100.0), 1);
        self.motor_temp = round_to(self.motor_temp + rng.gen_range(-0.2..0.2), 1);
        self.power_consumption = round_to(self.power_consumption + rng.gen_range(-0.1..0.1), 2);
        self.flow_rate = round_to(10.0 + rng.gen_range(0.0..1.0), 1);
        self.pressure = round_to(2.4 + rng.gen_range(0.0..0.2), 1);

        if self.sump_level < LOW_SUMP_THRESHOLD {
            self.raise(LOW_SUMP_ALERT);
        }
        if self.motor_temp > HIGH_MOTOR_TEMP_THRESHOLD {
            self.raise(HIGH_MOTOR_TEMP_ALERT);
        }
    }

    fn raise(&mut self, alert: &str) {
        if !self.alerts.iter().any(|a| a == alert) {
            self.alerts.push(alert.to_string());
        }
    }

    pub fn system_status(&self) -> &'static str {
        if self.alerts.is_empty() {
            "Normal Operation"
        } else {
            "Warning"
        }
    }

    pub fn sump_low(&self) -> bool {
        self.sump_level < LOW_SUMP_THRESHOLD
    }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Progress of a fixed-length simulation run, advanced in 0.1 s ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    ticks: u32,
    total_ticks: u32,
}

/// Ticks between network updates (one second of run time).
pub const TICKS_PER_STEP: u32 = 10;

impl SimulationRun {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            ticks: 0,
            total_ticks: duration_secs * TICKS_PER_STEP,
        }
    }

    /// Returns false once the run has finished.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.ticks += 1;
        true
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.ticks as f64 / TICKS_PER_STEP as f64
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_ticks == 0 {
            return 100.0;
        }
        self.ticks as f64 * 100.0 / self.total_ticks as f64
    }

    pub fn is_finished(&self) -> bool {
        self.ticks >= self.total_ticks
    }

    pub fn at_step_boundary(&self) -> bool {
        self.ticks > 0 && self.ticks % TICKS_PER_STEP == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_levels_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = NetworkState::default();
        for _ in 0..2_000 {
            state.step(&mut rng);
            assert!((0.0..=100.0).contains(&state.sump_level));
            assert!((0.0..=100.0).contains(&state.ro_tank_level));
            assert!((10.0..=11.0).contains(&state.flow_rate));
            assert!((2.4..=2.6).contains(&state.pressure));
        }
    }

    #[test]
    fn test_alerts_raised_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = NetworkState {
            sump_level: 5.0,
            motor_temp: 60.0,
            ..NetworkState::default()
        };
        for _ in 0..5 {
            state.step(&mut rng);
        }
        assert_eq!(
            state.alerts,
            vec![LOW_SUMP_ALERT.to_string(), HIGH_MOTOR_TEMP_ALERT.to_string()]
        );
        assert_eq!(state.system_status(), "Warning");
        assert_eq!(NetworkState::default().system_status(), "Normal Operation");
    }

    #[test]
    fn test_run_progress() {
        let mut run = SimulationRun::new(10);
        assert_eq!(run.progress_percent(), 0.0);
        let mut steps = 0;
        while run.tick() {
            if run.at_step_boundary() {
                steps += 1;
            }
        }
        assert!(run.is_finished());
        assert_eq!(steps, 10);
        assert_eq!(run.elapsed_secs(), 10.0);
        assert_eq!(run.progress_percent(), 100.0);
        assert!(!run.tick());
    }
}
