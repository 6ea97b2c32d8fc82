// Dashboard view models
use super::node::NodeStatus;
use super::telemetry::{TimeSeriesPoint, TimeWindow};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub detail: Option<DetailCard>,
    pub charts: Vec<ChartData>,
    pub status: StatusLine,
}

#[derive(Debug, Clone)]
pub struct DetailCard {
    pub node_name: String,
    pub status: NodeStatus,
    pub tiles: Vec<TileData>,
    pub motor_running: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: Option<f64>,
    pub precision: usize,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
            precision: 2,
        }
    }

    /// The value at the tile's precision, or "N/A".
    pub fn formatted(&self) -> String {
        match self.value {
            Some(v) if v.is_finite() => format!("{:.*}", self.precision, v),
            _ => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeriesData {
    pub name: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(name: &str, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            name: name.to_string(),
            points,
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }
}

#[derive(Debug, Clone)]
pub struct ChartData {
    pub title: String,
    pub unit: Option<String>,
    pub fraction_digits: usize,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(title: &str, unit: Option<&str>, series: Vec<SeriesData>) -> Self {
        Self {
            title: title.to_string(),
            unit: unit.map(str::to_string),
            fraction_digits: 2,
            series,
        }
    }

    /// Smallest and largest value across every series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let min = self.series.iter().filter_map(SeriesData::min).reduce(f64::min)?;
        let max = self.series.iter().filter_map(SeriesData::max).reduce(f64::max)?;
        Some((min, max))
    }

    /// Labels of the first and last points, for the time axis.
    pub fn time_span(&self) -> Option<(&str, &str)> {
        let points = &self.series.first()?.points;
        Some((points.first()?.label.as_str(), points.last()?.label.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub window: Option<TimeWindow>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Set while synthetic data is on screen.
    pub error: Option<String>,
    pub loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_formatting() {
        assert_eq!(TileData::new("t", "Temp", "°C", Some(42.456)).formatted(), "42.46");
        assert_eq!(TileData::new("t", "Temp", "°C", None).formatted(), "N/A");
        assert_eq!(TileData::new("t", "Temp", "°C", Some(f64::NAN)).formatted(), "N/A");
    }

    #[test]
    fn test_series_bounds() {
        let series = SeriesData::new(
            "Motor Current",
            vec![
                TimeSeriesPoint::new("10:00".into(), 2.5),
                TimeSeriesPoint::new("10:30".into(), 4.0),
                TimeSeriesPoint::new("11:00".into(), 1.5),
            ],
        );
        assert_eq!(series.min(), Some(1.5));
        assert_eq!(series.max(), Some(4.0));
        assert_eq!(SeriesData::new("empty", Vec::new()).min(), None);
    }

    #[test]
    fn test_chart_range_spans_all_series() {
        let chart = ChartData::new(
            "Temperature",
            Some("°C"),
            vec![
                SeriesData::new(
                    "Temperature",
                    vec![
                        TimeSeriesPoint::new("10:00".into(), 40.0),
                        TimeSeriesPoint::new("11:00".into(), 45.0),
                    ],
                ),
                SeriesData::new("Ambient Temp", vec![TimeSeriesPoint::new("10:00".into(), 21.0)]),
            ],
        );
        assert_eq!(chart.value_range(), Some((21.0, 45.0)));
        assert_eq!(chart.time_span(), Some(("10:00", "11:00")));
        assert_eq!(ChartData::new("empty", None, Vec::new()).value_range(), None);
    }
}
