// In-memory repository double with gates for controlling settlement order
use crate::application::analytics_repository::{
    AnalyticsRepository, RepositoryError, RepositoryResult, ensure_csv,
};
use crate::domain::insights::{
    ComparisonResult, DashboardStats, EquipmentAnalysis, EquipmentRow, PeriodStats,
};
use crate::domain::summary::{SummaryEvent, SummaryStream};
use crate::domain::trend::{TrendDirection, TrendSeries};
use crate::domain::upload::{DataType, UploadReceipt, UploadRecord};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum FakeTrend {
    Series(TrendSeries),
    NoData(String),
    Fail(String),
}

#[derive(Default)]
pub struct FakeRepository {
    trends: Mutex<HashMap<(String, u32), FakeTrend>>,
    gates: Mutex<HashMap<(String, u32), Vec<oneshot::Receiver<()>>>>,
    trend_calls: AtomicUsize,
    dashboard: Mutex<Option<DashboardStats>>,
    comparison: Mutex<Option<ComparisonResult>>,
    equipment: Mutex<Option<EquipmentAnalysis>>,
    summary_chunks: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_trend(&self, parameter_id: &str, days: u32, trend: FakeTrend) {
        self.trends
            .lock()
            .unwrap()
            .insert((parameter_id.to_string(), days), trend);
    }

    /// The next fetch of (parameter, days) waits until the returned sender fires
    pub fn hold(&self, parameter_id: &str, days: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry((parameter_id.to_string(), days))
            .or_default()
            .push(rx);
        tx
    }

    pub fn trend_calls(&self) -> usize {
        self.trend_calls.load(Ordering::SeqCst)
    }

    pub fn set_dashboard(&self, stats: DashboardStats) {
        *self.dashboard.lock().unwrap() = Some(stats);
    }

    pub fn set_comparison(&self, comparison: ComparisonResult) {
        *self.comparison.lock().unwrap() = Some(comparison);
    }

    pub fn set_equipment(&self, equipment: EquipmentAnalysis) {
        *self.equipment.lock().unwrap() = Some(equipment);
    }

    pub fn set_summary_chunks(&self, chunks: &[&str]) {
        *self.summary_chunks.lock().unwrap() = chunks.iter().map(|c| c.to_string()).collect();
    }
}

/// Yields until `n` trend fetches have been issued
pub async fn wait_for_calls(repo: &FakeRepository, n: usize) {
    while repo.trend_calls() < n {
        tokio::task::yield_now().await;
    }
}

pub fn series(dates: &[&str], values: &[f64], direction: TrendDirection, alert: bool) -> TrendSeries {
    let average = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };
    TrendSeries::new(
        dates.iter().map(|d| d.to_string()).collect(),
        values.to_vec(),
        average,
        direction,
        alert,
    )
    .unwrap()
}

pub fn dashboard_stats(avg_yield: f64) -> DashboardStats {
    DashboardStats {
        total_batches: 1200,
        batches_this_month: 96,
        avg_yield,
        complaints_open: 4,
        capas_open: 2,
        equipment_due: 1,
    }
}

pub fn period(batch_count: u32, avg_yield: f64, complaint_count: u32) -> PeriodStats {
    PeriodStats {
        batch_count,
        avg_yield,
        avg_hardness: 88.0,
        hardness_std: 4.0,
        complaint_count,
    }
}

pub fn equipment_row(machine: &str, avg_yield: f64, hardness_variability: f64) -> EquipmentRow {
    EquipmentRow {
        machine: machine.to_string(),
        batch_count: 100,
        avg_yield,
        avg_hardness: 88.0,
        hardness_variability,
    }
}

#[async_trait]
impl AnalyticsRepository for FakeRepository {
    async fn fetch_trend(&self, parameter_id: &str, days: u32) -> RepositoryResult<TrendSeries> {
        let key = (parameter_id.to_string(), days);
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|gates| if gates.is_empty() { None } else { Some(gates.remove(0)) });
        self.trend_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = gate {
            // A dropped sender models a request that never resolves
            if gate.await.is_err() {
                std::future::pending::<()>().await;
            }
        }

        let trend = self.trends.lock().unwrap().get(&key).cloned();
        match trend {
            Some(FakeTrend::Series(series)) => Ok(series),
            Some(FakeTrend::NoData(msg)) => Err(RepositoryError::NoData(msg)),
            Some(FakeTrend::Fail(msg)) => Err(RepositoryError::Transport(msg)),
            None => Err(RepositoryError::Status {
                status: 400,
                body: format!("invalid parameter {}", parameter_id),
            }),
        }
    }

    async fn fetch_dashboard_stats(&self) -> RepositoryResult<DashboardStats> {
        self.dashboard
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RepositoryError::Transport("connection refused".into()))
    }

    async fn fetch_period_comparison(&self) -> RepositoryResult<ComparisonResult> {
        self.comparison
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RepositoryError::Transport("connection refused".into()))
    }

    async fn fetch_equipment_analysis(&self) -> RepositoryResult<EquipmentAnalysis> {
        self.equipment
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RepositoryError::NoData("no equipment data".into()))
    }

    async fn fetch_uploads_history(&self) -> RepositoryResult<Vec<UploadRecord>> {
        Ok(Vec::new())
    }

    async fn upload_file(
        &self,
        filename: &str,
        _contents: Bytes,
        data_type: DataType,
    ) -> RepositoryResult<UploadReceipt> {
        ensure_csv(filename)?;
        Ok(UploadReceipt {
            filename: filename.to_string(),
            records_imported: 0,
            data_type: Some(data_type.to_string()),
        })
    }

    async fn stream_summary(&self) -> RepositoryResult<SummaryStream> {
        let chunks = self.summary_chunks.lock().unwrap().clone();
        let (tx, stream) = SummaryStream::channel(chunks.len() + 1);
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(SummaryEvent::Chunk(chunk)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(SummaryEvent::Done).await;
        });
        Ok(stream)
    }
}
