// Application layer - use cases and view state over the repository
pub mod alert_evaluator;
pub mod analytics_repository;
pub mod insights_panel;
pub mod selection;
pub mod series_aligner;
pub mod summary_service;
pub mod trend_coordinator;
pub mod trend_view;
pub mod upload_service;

#[cfg(test)]
pub(crate) mod test_support;
