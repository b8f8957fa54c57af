// Upload service - CSV import and import history
use crate::application::analytics_repository::{AnalyticsRepository, RepositoryResult, ensure_csv};
use crate::domain::upload::{DataType, UploadReceipt, UploadRecord};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct UploadService {
    repository: Arc<dyn AnalyticsRepository>,
}

impl UploadService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }

    pub async fn upload(
        &self,
        filename: &str,
        contents: Bytes,
        data_type: DataType,
    ) -> RepositoryResult<UploadReceipt> {
        ensure_csv(filename)?;
        let receipt = self.repository.upload_file(filename, contents, data_type).await?;
        tracing::info!(
            "Imported {} {} records from {}",
            receipt.records_imported,
            data_type,
            receipt.filename
        );
        Ok(receipt)
    }

    pub async fn history(&self) -> RepositoryResult<Vec<UploadRecord>> {
        self.repository.fetch_uploads_history().await
    }
}
