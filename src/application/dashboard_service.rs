// Dashboard service - Builds the detail card and charts from the latest acquisition
use crate::application::acquisition_service::Acquisition;
use crate::application::node_registry::NodeRegistry;
use crate::domain::dashboard::{ChartData, Dashboard, DetailCard, SeriesData, StatusLine, TileData};
use crate::domain::telemetry::{ProcessedSample, Series};

#[derive(Debug, Clone, Default)]
pub struct DashboardService;

impl DashboardService {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        registry: &NodeRegistry,
        acquisition: Option<&Acquisition>,
        loading: bool,
    ) -> Dashboard {
        let detail = registry.selected_node().map(|node| {
            let latest = acquisition.map(|a| &a.latest);
            DetailCard {
                node_name: node.name.clone(),
                status: node.status,
                tiles: Self::tiles(latest),
                motor_running: latest.map(|s| s.motor_current > 0.0),
            }
        });

        // Charts stay empty until the first acquisition lands.
        let charts = acquisition
            .map(|a| Self::charts(&a.series))
            .unwrap_or_default();

        let status = StatusLine {
            window: acquisition.map(|a| a.window),
            last_updated: acquisition.map(|a| a.completed_at),
            error: acquisition
                .filter(|a| a.is_degraded())
                .and_then(|a| a.error.clone()),
            loading,
        };

        Dashboard {
            title: "Sensor Data (Last 24 Hours)".to_string(),
            detail,
            charts,
            status,
        }
    }

    fn tiles(latest: Option<&ProcessedSample>) -> Vec<TileData> {
        vec![
            TileData::new(
                "motor_temperature",
                "Motor Temperature",
                "°C",
                latest.map(|s| s.temperature),
            ),
            TileData::new(
                "ambient_temperature",
                "Ambient Temperature",
                "°C",
                latest.map(|s| s.ambient_temperature),
            ),
            TileData::new(
                "motor_current",
                "Motor Current",
                "A",
                latest.map(|s| s.motor_current),
            ),
            TileData::new(
                "vibration",
                "Vibration Amplitude",
                "m/s²",
                latest.map(|s| s.vibration_amplitude),
            ),
        ]
    }

    fn charts(series: &Series) -> Vec<ChartData> {
        vec![
            ChartData::new(
                "Temperature",
                Some("°C"),
                vec![
                    SeriesData::new("Temperature", series.points(|s| s.temperature)),
                    SeriesData::new("Ambient Temp", series.points(|s| s.ambient_temperature)),
                ],
            ),
            ChartData::new(
                "Motor Current",
                Some("A"),
                vec![SeriesData::new("Motor Current", series.points(|s| s.motor_current))],
            ),
            ChartData::new(
                "Vibration Amplitude",
                None,
                vec![SeriesData::new("Vibration", series.points(|s| s.vibration_amplitude))],
            ),
        ]
    }
}
