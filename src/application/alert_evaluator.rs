// Alert evaluator - maps backend trend verdicts to badge state
use crate::domain::trend::{TrendDirection, TrendSeries};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeSeverity {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertBadge {
    pub direction: TrendDirection,
    pub label: &'static str,
    pub severity: BadgeSeverity,
    pub alert: bool,
}

/// The backend owns significance; this only classifies what it sent.
/// Series in error have no badge.
pub fn evaluate(series: &TrendSeries) -> Option<AlertBadge> {
    if !series.is_ok() {
        return None;
    }

    let direction = series.trend_direction();
    let label = match direction {
        TrendDirection::Rising => "Rising",
        TrendDirection::Falling => "Falling",
        TrendDirection::Stable => "Stable",
    };
    let severity = if series.alert() {
        BadgeSeverity::Warning
    } else {
        BadgeSeverity::Success
    };

    Some(AlertBadge {
        direction,
        label,
        severity,
        alert: series.alert(),
    })
}
