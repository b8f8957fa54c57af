// HTTP repository implementation against the APR analytics backend
use crate::application::analytics_repository::{
    AnalyticsRepository, RepositoryError, RepositoryResult, UploadError,
};
use crate::domain::insights::{ComparisonResult, DashboardStats, EquipmentAnalysis};
use crate::domain::summary::{SummaryEvent, SummaryStream};
use crate::domain::trend::{TrendDirection, TrendSeries};
use crate::domain::upload::{DataType, UploadReceipt, UploadRecord};
use crate::infrastructure::sse::{parse_summary_frame, sse_data};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const SUMMARY_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub struct HttpAnalyticsRepository {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TrendPayload {
    #[serde(default)]
    dates: Vec<String>,
    #[serde(default)]
    values: Vec<f64>,
    #[serde(default)]
    average: f64,
    #[serde(default)]
    trend_direction: Option<TrendDirection>,
    #[serde(default)]
    alert: bool,
    #[serde(default)]
    error: Option<String>,
}

impl TrendPayload {
    fn into_series(self) -> RepositoryResult<TrendSeries> {
        if let Some(error) = self.error {
            return Err(RepositoryError::NoData(error));
        }

        TrendSeries::new(
            self.dates,
            self.values,
            self.average,
            self.trend_direction.unwrap_or(TrendDirection::Stable),
            self.alert,
        )
        .map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

/// Aggregate endpoints answer `{"error": ..}` when there is nothing to aggregate
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Error { error: String },
    Data(T),
}

impl<T> Envelope<T> {
    fn into_result(self) -> RepositoryResult<T> {
        match self {
            Envelope::Error { error } => Err(RepositoryError::NoData(error)),
            Envelope::Data(data) => Ok(data),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl HttpAnalyticsRepository {
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> RepositoryResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Status { status, body });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .send(self.client.get(&url).header("Accept", "application/json"))
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

/// Backend validation errors carry a FastAPI-style `detail` field
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorDetail>(body)
        .map(|d| d.detail)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl AnalyticsRepository for HttpAnalyticsRepository {
    async fn fetch_trend(&self, parameter_id: &str, days: u32) -> RepositoryResult<TrendSeries> {
        let path = format!(
            "/data/trends/{}?days={}",
            urlencoding::encode(parameter_id),
            days
        );
        let payload: TrendPayload = self.get_json(&path).await?;
        payload.into_series()
    }

    async fn fetch_dashboard_stats(&self) -> RepositoryResult<DashboardStats> {
        self.get_json("/data/dashboard").await
    }

    async fn fetch_period_comparison(&self) -> RepositoryResult<ComparisonResult> {
        let envelope: Envelope<ComparisonResult> = self.get_json("/data/analysis/comparison").await?;
        envelope.into_result()
    }

    async fn fetch_equipment_analysis(&self) -> RepositoryResult<EquipmentAnalysis> {
        let envelope: Envelope<EquipmentAnalysis> = self.get_json("/data/analysis/equipment").await?;
        envelope.into_result()
    }

    async fn fetch_uploads_history(&self) -> RepositoryResult<Vec<UploadRecord>> {
        self.get_json("/data/uploads").await
    }

    async fn upload_file(
        &self,
        filename: &str,
        contents: Bytes,
        data_type: DataType,
    ) -> RepositoryResult<UploadReceipt> {
        let part = reqwest::multipart::Part::bytes(contents.to_vec())
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.url("/data/upload"))
            .query(&[("data_type", data_type.as_str())])
            .multipart(form);

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(RepositoryError::Status { status, body }) if (400..500).contains(&status) => {
                return Err(UploadError::Rejected(rejection_message(&body)).into());
            }
            Err(e) => return Err(e),
        };

        response
            .json::<UploadReceipt>()
            .await
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }

    async fn stream_summary(&self) -> RepositoryResult<SummaryStream> {
        let response = self
            .send(
                self.client
                    .get(self.url("/chat/summary/stream"))
                    .header("Accept", "text/event-stream"),
            )
            .await?;

        let (tx, stream) = SummaryStream::channel(SUMMARY_BUFFER);

        tokio::spawn(async move {
            let mut frames = Box::pin(sse_data(response.bytes_stream()));

            while let Some(frame) = frames.next().await {
                let event = match frame {
                    Ok(data) => match parse_summary_frame(&data) {
                        Ok(Some(event)) => event,
                        Ok(None) => continue,
                        Err(e) => SummaryEvent::Error(format!("invalid summary frame: {}", e)),
                    },
                    Err(e) => SummaryEvent::Error(e.to_string()),
                };

                let terminal = !matches!(event, SummaryEvent::Chunk(_));
                if tx.send(event).await.is_err() {
                    tracing::debug!("Summary consumer dropped; abandoning stream");
                    return;
                }
                if terminal {
                    return;
                }
            }

            let _ = tx
                .send(SummaryEvent::Error(
                    "summary stream closed before completion".to_string(),
                ))
                .await;
        });

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trend::SeriesError;

    #[test]
    fn test_trend_payload_from_backend() {
        let json = r#"{
            "dates": ["2024-01-01", "2024-01-01", "2024-01-02"],
            "values": [85.2, 86.0, 91.3],
            "parameter": "hardness",
            "trend_direction": "hausse",
            "alert": true,
            "average": 87.5,
            "min": 85.2,
            "max": 91.3,
            "count": 3
        }"#;
        let payload: TrendPayload = serde_json::from_str(json).unwrap();
        let series = payload.into_series().unwrap();
        assert_eq!(series.trend_direction(), TrendDirection::Rising);
        assert!(series.alert());
        assert_eq!(series.dates().len(), 3);
    }

    #[test]
    fn test_trend_error_payload_is_no_data() {
        let json = r#"{"error": "Pas assez de données", "dates": [], "values": []}"#;
        let payload: TrendPayload = serde_json::from_str(json).unwrap();
        let err = payload.into_series().unwrap_err();
        assert_eq!(
            SeriesError::from(err),
            SeriesError::NoData("Pas assez de données".into())
        );
    }

    #[test]
    fn test_trend_payload_with_mismatched_lengths_is_decode_error() {
        let json = r#"{"dates": ["2024-01-01"], "values": [1.0, 2.0], "average": 1.5}"#;
        let payload: TrendPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload.into_series(), Err(RepositoryError::Decode(_))));
    }

    #[test]
    fn test_envelope() {
        let envelope: Envelope<EquipmentAnalysis> =
            serde_json::from_str(r#"{"error": "Aucune donnée"}"#).unwrap();
        assert!(matches!(envelope.into_result(), Err(RepositoryError::NoData(_))));

        let json = r#"{
            "equipment": [
                {"machine": "Press-A", "batch_count": 160, "avg_yield": 97.4, "avg_hardness": 89.1, "hardness_variability": 6.2}
            ],
            "lowest_yield": {"machine": "Press-A", "batch_count": 160, "avg_yield": 97.4, "avg_hardness": 89.1, "hardness_variability": 6.2}
        }"#;
        let envelope: Envelope<EquipmentAnalysis> = serde_json::from_str(json).unwrap();
        let analysis = envelope.into_result().unwrap();
        assert_eq!(analysis.equipment.len(), 1);
        assert_eq!(analysis.lowest_yield.unwrap().machine, "Press-A");
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(r#"{"detail": "Seuls les fichiers CSV sont acceptés"}"#),
            "Seuls les fichiers CSV sont acceptés"
        );
        assert_eq!(rejection_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let repo = HttpAnalyticsRepository::new("http://localhost:8000/", None).unwrap();
        assert_eq!(repo.url("/data/uploads"), "http://localhost:8000/data/uploads");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let repo =
            HttpAnalyticsRepository::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let err = repo.fetch_trend("hardness", 30).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transport(_)));
    }

    #[test]
    fn test_dashboard_stats_from_backend() {
        let json = r#"{
            "total_batches": 1200,
            "batches_this_month": 96,
            "avg_yield": 97.84,
            "complaints_open": 4,
            "capas_open": 2,
            "equipment_due": 1
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.batches_this_month, 96);
        assert_eq!(stats.avg_yield, 97.84);
        assert_eq!(stats.equipment_due, 1);
    }
}
