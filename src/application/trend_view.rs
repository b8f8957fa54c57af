// Trend view - selection and range controls wired to the fetch coordinator
use crate::application::alert_evaluator::{self, AlertBadge};
use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::selection::{SelectionError, SelectionState};
use crate::application::series_aligner;
use crate::application::trend_coordinator::{RefreshOutcome, TrendFetchCoordinator, TrendState};
use crate::domain::parameter::{Parameter, ParameterCatalog};
use crate::domain::trend::{MergedChartRow, SeriesError, SeriesStats, TrendSeries};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

/// Ranges offered by the range selector
pub const RANGE_PRESETS: [u32; 4] = [7, 30, 90, 365];

pub const DEFAULT_RANGE_DAYS: u32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum TrendViewError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("date range must be at least one day")]
    InvalidRange,
}

#[derive(Debug)]
struct Controls {
    selection: SelectionState,
    days: u32,
}

/// Owns the selection, the date range and the coordinator. Every change that
/// alters what should be on screen starts a refresh; overlapping refreshes
/// are resolved by the coordinator's sequence tags.
pub struct TrendView {
    catalog: Arc<ParameterCatalog>,
    coordinator: TrendFetchCoordinator,
    controls: Mutex<Controls>,
}

impl TrendView {
    pub fn new(
        catalog: Arc<ParameterCatalog>,
        repository: Arc<dyn AnalyticsRepository>,
        selection: SelectionState,
        days: u32,
    ) -> Result<Self, TrendViewError> {
        if days == 0 {
            return Err(TrendViewError::InvalidRange);
        }
        for id in selection.active() {
            if !catalog.contains(id) {
                return Err(SelectionError::UnknownParameter(id.clone()).into());
            }
        }

        Ok(Self {
            catalog,
            coordinator: TrendFetchCoordinator::new(repository),
            controls: Mutex::new(Controls { selection, days }),
        })
    }

    pub fn selection(&self) -> SelectionState {
        self.lock_controls().selection.clone()
    }

    pub fn days(&self) -> u32 {
        self.lock_controls().days
    }

    pub fn subscribe(&self) -> watch::Receiver<TrendState> {
        self.coordinator.subscribe()
    }

    /// Re-fetch the current selection and range
    pub async fn refresh(&self) -> RefreshOutcome {
        let pending = {
            let controls = self.lock_controls();
            self.coordinator
                .refresh(controls.selection.active().to_vec(), controls.days)
        };
        pending.await
    }

    /// Returns `None` when the toggle left the selection unchanged
    pub async fn toggle(&self, parameter_id: &str) -> Result<Option<RefreshOutcome>, TrendViewError> {
        let pending = {
            let mut controls = self.lock_controls();
            if !controls.selection.toggle_checked(parameter_id, &self.catalog)? {
                return Ok(None);
            }
            self.coordinator
                .refresh(controls.selection.active().to_vec(), controls.days)
        };
        Ok(Some(pending.await))
    }

    /// Never shrinks the selection, so nothing needs re-fetching
    pub fn set_multi_mode(&self, enabled: bool) {
        self.lock_controls().selection.set_multi_mode(enabled);
    }

    pub async fn set_range_days(&self, days: u32) -> Result<Option<RefreshOutcome>, TrendViewError> {
        if days == 0 {
            return Err(TrendViewError::InvalidRange);
        }

        let pending = {
            let mut controls = self.lock_controls();
            if controls.days == days {
                return Ok(None);
            }
            controls.days = days;
            self.coordinator
                .refresh(controls.selection.active().to_vec(), days)
        };
        Ok(Some(pending.await))
    }

    /// Chart model for the last committed refresh
    pub fn chart(&self) -> TrendChart {
        build_chart(&self.catalog, &self.coordinator.snapshot())
    }

    // Selection and range mutations never panic mid-update
    fn lock_controls(&self) -> std::sync::MutexGuard<'_, Controls> {
        self.controls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub parameter_id: String,
    /// None for ids the catalog does not know; the column is kept so it
    /// still lines up with `MergedChartRow::values`
    pub parameter: Option<Parameter>,
    pub average: Option<f64>,
    pub stats: Option<SeriesStats>,
    /// Samples outside the regulatory limits
    pub out_of_spec: usize,
    pub error: Option<SeriesError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub days: Option<u32>,
    pub loading: bool,
    pub columns: Vec<SeriesColumn>,
    pub rows: Vec<MergedChartRow>,
    pub primary_badge: Option<AlertBadge>,
}

pub fn build_chart(catalog: &ParameterCatalog, state: &TrendState) -> TrendChart {
    let columns = state
        .results
        .iter()
        .map(|(id, series)| {
            let parameter = match catalog.by_id(id) {
                Ok(parameter) => Some(parameter),
                Err(e) => {
                    tracing::warn!("Charting series without catalog limits: {}", e);
                    None
                }
            };
            column(id, parameter, series)
        })
        .collect();

    TrendChart {
        days: state.days,
        loading: state.loading,
        columns,
        rows: series_aligner::align(&state.results),
        primary_badge: state
            .results
            .primary()
            .and_then(|(_, series)| alert_evaluator::evaluate(series)),
    }
}

fn column(id: &str, parameter: Option<&Parameter>, series: &TrendSeries) -> SeriesColumn {
    SeriesColumn {
        parameter_id: id.to_string(),
        parameter: parameter.cloned(),
        average: series.is_ok().then(|| series.average()),
        stats: series.stats(),
        out_of_spec: parameter.map_or(0, |p| {
            series.values().iter().filter(|v| p.is_out_of_spec(**v)).count()
        }),
        error: series.error().cloned(),
    }
}
