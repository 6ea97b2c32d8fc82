// Telemetry data domain models
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};

/// Upper bound on the number of points handed to a chart.
pub const MAX_PLOT_POINTS: usize = 48;

/// Length of the history window requested from the feed.
pub const WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn last_day(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::hours(WINDOW_HOURS),
            end: now,
        }
    }
}

/// One entry of the remote feed. Field mapping:
/// field1 temperature, field2 ambient temperature, field3 motor current,
/// field4..field6 vibration X/Y/Z.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawSample {
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field1: Option<f64>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field2: Option<f64>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field4: Option<f64>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field5: Option<f64>,
    #[serde(default, deserialize_with = "lenient_reading")]
    pub field6: Option<f64>,
}

impl RawSample {
    pub fn vibration_magnitude(&self) -> f64 {
        let x = self.field4.unwrap_or(0.0);
        let y = self.field5.unwrap_or(0.0);
        let z = self.field6.unwrap_or(0.0);
        (x * x + y * y + z * z).sqrt()
    }
}

/// Feeds send readings as numbers, numeric strings, or null depending on
/// how the channel was written to. Anything that is not a finite number
/// counts as a missing reading.
fn lenient_reading<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let reading = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(reading.filter(|v| v.is_finite()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedSample {
    pub timestamp: DateTime<Utc>,
    /// `HH:MM` in UTC, used as the chart x-axis label.
    pub time: String,
    pub temperature: f64,
    pub ambient_temperature: f64,
    pub motor_current: f64,
    pub vibration_amplitude: f64,
}

impl ProcessedSample {
    pub fn new(
        timestamp: DateTime<Utc>,
        temperature: f64,
        ambient_temperature: f64,
        motor_current: f64,
        vibration_amplitude: f64,
    ) -> Self {
        Self {
            time: timestamp.format("%H:%M").to_string(),
            timestamp,
            temperature,
            ambient_temperature,
            motor_current,
            vibration_amplitude,
        }
    }
}

impl From<&RawSample> for ProcessedSample {
    fn from(raw: &RawSample) -> Self {
        Self::new(
            raw.created_at,
            raw.field1.unwrap_or(0.0),
            raw.field2.unwrap_or(0.0),
            raw.field3.unwrap_or(0.0),
            raw.vibration_magnitude(),
        )
    }
}

/// Chronologically ordered samples ready for plotting. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    samples: Vec<ProcessedSample>,
}

impl Series {
    /// Returns `None` for an empty input.
    pub fn new(mut samples: Vec<ProcessedSample>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_by_key(|s| s.timestamp);
        Some(Self { samples })
    }

    /// Non-empty by construction: `latest` is always part of the series.
    pub fn with_latest(mut history: Vec<ProcessedSample>, latest: ProcessedSample) -> Self {
        history.push(latest);
        history.sort_by_key(|s| s.timestamp);
        Self { samples: history }
    }

    pub fn samples(&self) -> &[ProcessedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> &ProcessedSample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn downsampled(self, max_points: usize) -> Self {
        Self {
            samples: downsample(self.samples, max_points),
        }
    }

    pub fn points<F>(&self, value: F) -> Vec<TimeSeriesPoint>
    where
        F: Fn(&ProcessedSample) -> f64,
    {
        self.samples()
            .iter()
            .map(|s| TimeSeriesPoint::new(s.time.clone(), value(s)))
            .collect()
    }
}

/// Uniform-stride subsampling: keeps every `ceil(len / max_points)`-th
/// element starting from the first.
pub fn downsample<T>(items: Vec<T>, max_points: usize) -> Vec<T> {
    if max_points == 0 || items.len() <= max_points {
        return items;
    }

    let step = items.len().div_ceil(max_points);
    items.into_iter().step_by(step).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub label: String,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(label: String, value: f64) -> Self {
        Self { label, value }
    }
}
