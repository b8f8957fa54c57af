// Dashboard view model - what a renderer consumes, serialised as JSON
use crate::application::insights_panel::InsightsState;
use crate::application::trend_view::TrendChart;
use crate::domain::upload::UploadRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum UploadsSection {
    Loaded(Vec<UploadRecord>),
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub trend: TrendChart,
    pub insights: InsightsState,
    pub uploads: UploadsSection,
}

impl DashboardSnapshot {
    pub fn new(trend: TrendChart, insights: InsightsState, uploads: UploadsSection) -> Self {
        Self {
            generated_at: Utc::now(),
            trend,
            insights,
            uploads,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::insights_panel::Section;
    use crate::application::trend_view::build_chart;
    use crate::application::trend_coordinator::TrendState;
    use crate::domain::parameter::ParameterCatalog;

    #[test]
    fn test_snapshot_json_shape() {
        let chart = build_chart(&ParameterCatalog::builtin(), &TrendState::default());
        let snapshot = DashboardSnapshot::new(
            chart,
            InsightsState {
                kpis: Section::NoData("no batches".into()),
                comparison: Section::Failed("connection refused".into()),
                equipment: Section::NoData("no equipment data".into()),
            },
            UploadsSection::Loaded(Vec::new()),
        );

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["trend"]["loading"], false);
        assert_eq!(value["trend"]["rows"], serde_json::json!([]));
        assert_eq!(value["insights"]["equipment"]["status"], "no_data");
        assert_eq!(value["insights"]["kpis"]["status"], "no_data");
        assert_eq!(value["insights"]["comparison"]["data"], "connection refused");
        assert_eq!(value["uploads"]["status"], "loaded");
    }
}
