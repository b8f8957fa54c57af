// Insight aggregates - computed by the analytics backend, consumed read-only
use serde::{Deserialize, Serialize};

/// Headline KPIs across all imported data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_batches: u32,
    /// Batches manufactured in the last 30 days
    pub batches_this_month: u32,
    pub avg_yield: f64,
    pub complaints_open: u32,
    pub capas_open: u32,
    /// Equipment whose calibration falls due within a week
    pub equipment_due: u32,
}

/// One side of a period-over-period comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub batch_count: u32,
    pub avg_yield: f64,
    pub avg_hardness: f64,
    #[serde(default)]
    pub hardness_std: f64,
    pub complaint_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current: PeriodStats,
    pub previous: PeriodStats,
    /// Length of each compared period
    #[serde(default)]
    pub period_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub machine: String,
    pub batch_count: u32,
    pub avg_yield: f64,
    pub avg_hardness: f64,
    /// Coefficient of variation of hardness, in percent
    pub hardness_variability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAnalysis {
    pub equipment: Vec<EquipmentRow>,
    /// Flagged by the backend; never recomputed here
    #[serde(default)]
    pub lowest_yield: Option<EquipmentRow>,
}
