// ThingSpeak feed repository implementation
use crate::application::telemetry_repository::{AcquisitionError, TelemetryRepository};
use crate::domain::telemetry::{RawSample, TimeWindow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ThingSpeakRepository {
    client: reqwest::Client,
    host: String,
    read_api_key: String,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    feeds: Vec<RawSample>,
}

impl ThingSpeakRepository {
    pub fn new(
        host: String,
        read_api_key: String,
        max_results: u32,
        timeout: Duration,
    ) -> Result<Self, AcquisitionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AcquisitionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            read_api_key,
            max_results,
        })
    }

    fn build_feed_url(&self, channel_id: &str, window: &TimeWindow, api_key: &str) -> String {
        let start = window.start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = window.end.to_rfc3339_opts(SecondsFormat::Millis, true);
        format!(
            "{}/channels/{}/feeds.json?api_key={}&results={}&start={}&end={}",
            self.host,
            urlencoding::encode(channel_id),
            urlencoding::encode(api_key),
            self.max_results,
            urlencoding::encode(&start),
            urlencoding::encode(&end),
        )
    }
}

#[async_trait]
impl TelemetryRepository for ThingSpeakRepository {
    async fn fetch_feeds(
        &self,
        channel_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<RawSample>, AcquisitionError> {
        tracing::debug!(
            url = %self.build_feed_url(channel_id, window, "<redacted>"),
            "Requesting feed"
        );
        let url = self.build_feed_url(channel_id, window, &self.read_api_key);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AcquisitionError::Transport(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(AcquisitionError::Http {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AcquisitionError::Transport(e.without_url().to_string()))?;

        let data: FeedResponse =
            serde_json::from_slice(&body).map_err(|e| AcquisitionError::Malformed(e.to_string()))?;

        if data.feeds.is_empty() {
            return Err(AcquisitionError::EmptyFeed);
        }

        tracing::debug!(channel_id, entries = data.feeds.len(), "Feed received");
        Ok(data.feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn repository(host: String) -> ThingSpeakRepository {
        ThingSpeakRepository::new(host, "READKEY".to_string(), 1440, Duration::from_secs(5)).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::last_day(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_build_feed_url() {
        let repo = repository("https://api.thingspeak.com/".to_string());
        let url = repo.build_feed_url("2293900", &window(), "KEY");
        assert_eq!(
            url,
            "https://api.thingspeak.com/channels/2293900/feeds.json?api_key=KEY&results=1440\
             &start=2024-01-01T00%3A00%3A00.000Z&end=2024-01-02T00%3A00%3A00.000Z"
        );
    }

    #[tokio::test]
    async fn test_fetch_passes_query_and_parses_feeds() {
        let router = Router::new().route(
            "/channels/:channel/feeds.json",
            get(
                |Path(channel): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(channel, "2293900");
                    assert_eq!(params["api_key"], "READKEY");
                    assert_eq!(params["results"], "1440");
                    assert_eq!(params["start"], "2024-01-01T00:00:00.000Z");
                    assert_eq!(params["end"], "2024-01-02T00:00:00.000Z");
                    Json(json!({
                        "channel": {"id": 2293900},
                        "feeds": [{
                            "created_at": "2024-01-01T10:00:00Z",
                            "entry_id": 1,
                            "field1": 42.5, "field2": 30.1, "field3": 5.2,
                            "field4": 0.1, "field5": 0.2, "field6": 0.05
                        }]
                    }))
                },
            ),
        );
        let host = serve(router).await;

        let feeds = repository(host).fetch_feeds("2293900", &window()).await.unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].field1, Some(42.5));
        assert!((feeds[0].vibration_magnitude() - 0.229).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_server_error_is_http_failure() {
        let router = Router::new().route(
            "/channels/:channel/feeds.json",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let host = serve(router).await;

        let err = repository(host).fetch_feeds("1", &window()).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Http { status: 500 }));
    }

    #[tokio::test]
    async fn test_empty_and_malformed_bodies() {
        let router = Router::new()
            .route(
                "/channels/empty/feeds.json",
                get(|| async { Json(json!({"channel": {}, "feeds": []})) }),
            )
            .route("/channels/missing/feeds.json", get(|| async { Json(json!({})) }))
            .route("/channels/garbage/feeds.json", get(|| async { "-1" }));
        let host = serve(router).await;
        let repo = repository(host);

        assert!(matches!(
            repo.fetch_feeds("empty", &window()).await,
            Err(AcquisitionError::EmptyFeed)
        ));
        assert!(matches!(
            repo.fetch_feeds("missing", &window()).await,
            Err(AcquisitionError::EmptyFeed)
        ));
        assert!(matches!(
            repo.fetch_feeds("garbage", &window()).await,
            Err(AcquisitionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = repository(format!("http://{}", addr))
            .fetch_feeds("1", &window())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::Transport(_)));
    }
}
