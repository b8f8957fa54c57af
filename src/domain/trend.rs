// Trend domain models - per-parameter time series and merged chart rows
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    #[serde(alias = "hausse")]
    Rising,
    #[serde(alias = "baisse")]
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a series could not be produced.
///
/// `NoData` is the backend telling us there are not enough records for the
/// window; it is a valid state and gets an "import data" prompt rather than an
/// error banner. `FetchFailed` covers transport, status and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SeriesError {
    NoData(String),
    FetchFailed(String),
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::NoData(msg) => write!(f, "no data: {}", msg),
            SeriesError::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("series has {dates} dates but {values} values")]
pub struct SeriesShapeError {
    pub dates: usize,
    pub values: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// One parameter's samples for one query window. Replaced wholesale on every
/// fetch; `dates.len() == values.len()` unless `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    dates: Vec<String>,
    values: Vec<f64>,
    average: f64,
    trend_direction: TrendDirection,
    alert: bool,
    error: Option<SeriesError>,
}

impl TrendSeries {
    pub fn new(
        dates: Vec<String>,
        values: Vec<f64>,
        average: f64,
        trend_direction: TrendDirection,
        alert: bool,
    ) -> Result<Self, SeriesShapeError> {
        if dates.len() != values.len() {
            return Err(SeriesShapeError {
                dates: dates.len(),
                values: values.len(),
            });
        }

        Ok(Self {
            dates,
            values,
            average,
            trend_direction,
            alert,
            error: None,
        })
    }

    pub fn failed(error: SeriesError) -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
            average: 0.0,
            trend_direction: TrendDirection::Stable,
            alert: false,
            error: Some(error),
        }
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn trend_direction(&self) -> TrendDirection {
        self.trend_direction
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    pub fn error(&self) -> Option<&SeriesError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn samples(&self) -> impl Iterator<Item = (&str, f64)> {
        self.dates
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn stats(&self) -> Option<SeriesStats> {
        if self.values.is_empty() {
            return None;
        }

        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(SeriesStats {
            min,
            max,
            count: self.values.len(),
        })
    }
}

/// Committed result of one fetch cycle, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendResultSet {
    entries: Vec<(String, Arc<TrendSeries>)>,
}

impl TrendResultSet {
    pub fn new(entries: Vec<(String, Arc<TrendSeries>)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, parameter_id: &str) -> Option<&Arc<TrendSeries>> {
        self.entries
            .iter()
            .find(|(id, _)| id == parameter_id)
            .map(|(_, series)| series)
    }

    /// First-selected parameter, which drives the alert badge
    pub fn primary(&self) -> Option<(&str, &Arc<TrendSeries>)> {
        self.entries.first().map(|(id, s)| (id.as_str(), s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<TrendSeries>)> {
        self.entries.iter().map(|(id, s)| (id.as_str(), s))
    }

    pub fn parameter_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One chart row: a date plus one optional value per active parameter, in
/// selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedChartRow {
    pub date: String,
    pub values: Vec<Option<f64>>,
}
