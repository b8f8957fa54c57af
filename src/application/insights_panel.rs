// Derived insights - classification of backend comparison/equipment aggregates
use crate::application::analytics_repository::{AnalyticsRepository, RepositoryError};
use crate::domain::insights::{ComparisonResult, DashboardStats, EquipmentAnalysis, EquipmentRow};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

pub fn yield_severity(avg_yield: f64) -> Severity {
    if avg_yield < 95.0 {
        Severity::Critical
    } else if avg_yield < 98.0 {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

pub fn variability_severity(hardness_variability: f64) -> Severity {
    if hardness_variability > 10.0 {
        Severity::Critical
    } else if hardness_variability >= 5.0 {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiView {
    pub stats: DashboardStats,
    pub yield_severity: Severity,
    /// Open complaints and CAPAs plus equipment due for calibration
    pub open_actions: u32,
}

pub fn classify_kpis(stats: &DashboardStats) -> KpiView {
    KpiView {
        stats: stats.clone(),
        yield_severity: yield_severity(stats.avg_yield),
        open_actions: stats.complaints_open + stats.capas_open + stats.equipment_due,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BatchCount,
    AvgYield,
    AvgHardness,
    ComplaintCount,
}

impl Metric {
    /// Complaints are the one metric where going down is good
    fn lower_is_better(&self) -> bool {
        matches!(self, Metric::ComplaintCount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTone {
    Favorable,
    Unfavorable,
    Neutral,
}

pub fn change_tone(metric: Metric, delta: f64) -> ChangeTone {
    if delta == 0.0 {
        return ChangeTone::Neutral;
    }
    let improved = if metric.lower_is_better() {
        delta < 0.0
    } else {
        delta > 0.0
    };
    if improved {
        ChangeTone::Favorable
    } else {
        ChangeTone::Unfavorable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodChange {
    pub metric: Metric,
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    /// None when the previous value is zero
    pub percent: Option<f64>,
    pub tone: ChangeTone,
}

impl PeriodChange {
    fn new(metric: Metric, current: f64, previous: f64) -> Self {
        let delta = current - previous;
        let percent = if previous != 0.0 {
            Some(delta / previous * 100.0)
        } else {
            None
        };
        Self {
            metric,
            current,
            previous,
            delta,
            percent,
            tone: change_tone(metric, delta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub period_days: Option<u32>,
    pub current_yield_severity: Severity,
    pub changes: Vec<PeriodChange>,
}

pub fn classify_comparison(comparison: &ComparisonResult) -> ComparisonView {
    let current = &comparison.current;
    let previous = &comparison.previous;

    ComparisonView {
        period_days: comparison.period_days,
        current_yield_severity: yield_severity(current.avg_yield),
        changes: vec![
            PeriodChange::new(
                Metric::BatchCount,
                current.batch_count as f64,
                previous.batch_count as f64,
            ),
            PeriodChange::new(Metric::AvgYield, current.avg_yield, previous.avg_yield),
            PeriodChange::new(Metric::AvgHardness, current.avg_hardness, previous.avg_hardness),
            PeriodChange::new(
                Metric::ComplaintCount,
                current.complaint_count as f64,
                previous.complaint_count as f64,
            ),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentView {
    pub row: EquipmentRow,
    pub yield_severity: Severity,
    pub variability_severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentPanel {
    pub rows: Vec<EquipmentView>,
    pub lowest_yield: Option<EquipmentRow>,
}

pub fn classify_equipment(analysis: &EquipmentAnalysis) -> EquipmentPanel {
    EquipmentPanel {
        rows: analysis
            .equipment
            .iter()
            .map(|row| EquipmentView {
                row: row.clone(),
                yield_severity: yield_severity(row.avg_yield),
                variability_severity: variability_severity(row.hardness_variability),
            })
            .collect(),
        lowest_yield: analysis.lowest_yield.clone(),
    }
}

/// One independently loaded panel section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Loaded(T),
    /// Nothing imported yet; render an import prompt
    NoData(String),
    Failed(String),
}

impl<T> Section<T> {
    fn from_result<U>(result: Result<U, RepositoryError>, f: impl FnOnce(&U) -> T) -> Self {
        match result {
            Ok(value) => Section::Loaded(f(&value)),
            Err(RepositoryError::NoData(msg)) => Section::NoData(msg),
            Err(e) => Section::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsState {
    pub kpis: Section<KpiView>,
    pub comparison: Section<ComparisonView>,
    pub equipment: Section<EquipmentPanel>,
}

/// Loaded once when the view mounts, independent of trend selection
pub struct DerivedInsightsPanel {
    repository: Arc<dyn AnalyticsRepository>,
}

impl DerivedInsightsPanel {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }

    pub async fn load(&self) -> InsightsState {
        let (kpis, comparison, equipment) = tokio::join!(
            self.repository.fetch_dashboard_stats(),
            self.repository.fetch_period_comparison(),
            self.repository.fetch_equipment_analysis()
        );

        if let Err(e) = &kpis {
            tracing::warn!("Error fetching dashboard KPIs: {}", e);
        }
        if let Err(e) = &comparison {
            tracing::warn!("Error fetching period comparison: {}", e);
        }
        if let Err(e) = &equipment {
            tracing::warn!("Error fetching equipment analysis: {}", e);
        }

        InsightsState {
            kpis: Section::from_result(kpis, classify_kpis),
            comparison: Section::from_result(comparison, classify_comparison),
            equipment: Section::from_result(equipment, classify_equipment),
        }
    }
}
