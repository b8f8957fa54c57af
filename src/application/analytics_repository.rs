// Repository trait for the analytics backend
use crate::domain::insights::{ComparisonResult, DashboardStats, EquipmentAnalysis};
use crate::domain::summary::SummaryStream;
use crate::domain::trend::{SeriesError, TrendSeries};
use crate::domain::upload::{DataType, UploadReceipt, UploadRecord};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend answered but reported too few records
    #[error("{0}")]
    NoData(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl From<RepositoryError> for SeriesError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NoData(msg) => SeriesError::NoData(msg),
            other => SeriesError::FetchFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("only CSV files are accepted: {0}")]
    NotCsv(String),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Time series for one parameter over the last `days` of data
    async fn fetch_trend(&self, parameter_id: &str, days: u32) -> RepositoryResult<TrendSeries>;

    async fn fetch_dashboard_stats(&self) -> RepositoryResult<DashboardStats>;

    async fn fetch_period_comparison(&self) -> RepositoryResult<ComparisonResult>;

    async fn fetch_equipment_analysis(&self) -> RepositoryResult<EquipmentAnalysis>;

    /// Most recent first
    async fn fetch_uploads_history(&self) -> RepositoryResult<Vec<UploadRecord>>;

    async fn upload_file(
        &self,
        filename: &str,
        contents: Bytes,
        data_type: DataType,
    ) -> RepositoryResult<UploadReceipt>;

    /// Starts summary generation; chunks arrive on the returned stream
    async fn stream_summary(&self) -> RepositoryResult<SummaryStream>;
}

/// Client-side guard applied before any upload leaves the process
pub fn ensure_csv(filename: &str) -> Result<(), UploadError> {
    if filename.to_ascii_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(UploadError::NotCsv(filename.to_string()))
    }
}
