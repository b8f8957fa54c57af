// Summary service - drains an AI summary stream into an accumulator
use crate::application::analytics_repository::{AnalyticsRepository, RepositoryResult};
use crate::domain::summary::{SummaryAccumulator, SummaryStream};
use futures::StreamExt;
use std::sync::Arc;

#[derive(Clone)]
pub struct SummaryService {
    repository: Arc<dyn AnalyticsRepository>,
}

impl SummaryService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }

    /// Raw event stream; drop it to stop the producer
    pub async fn stream(&self) -> RepositoryResult<SummaryStream> {
        self.repository.stream_summary().await
    }

    /// Runs the stream to its terminal event. A producer that closes without
    /// one leaves the accumulator in the streaming state.
    pub async fn collect(&self) -> RepositoryResult<SummaryAccumulator> {
        let mut stream = self.stream().await?;
        let mut accumulator = SummaryAccumulator::new();

        while let Some(event) = stream.next().await {
            if !accumulator.apply(event) {
                break;
            }
        }

        tracing::debug!("Summary stream ended after {} bytes", accumulator.text().len());
        Ok(accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::FakeRepository;
    use crate::domain::summary::SummaryStatus;

    #[tokio::test]
    async fn test_collect_appends_chunks_in_order() {
        let repo = Arc::new(FakeRepository::new());
        repo.set_summary_chunks(&["1. **Overall** ", "good, ", "yield 98.1%"]);
        let service = SummaryService::new(repo);

        let summary = service.collect().await.unwrap();
        assert_eq!(summary.text(), "1. **Overall** good, yield 98.1%");
        assert_eq!(summary.status(), &SummaryStatus::Done);
    }
}
