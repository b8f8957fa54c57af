// Main entry point - Dependency injection and initial dashboard load
use std::{sync::Arc, time::Duration};

use apr_trends::application::analytics_repository::AnalyticsRepository;
use apr_trends::application::insights_panel::DerivedInsightsPanel;
use apr_trends::application::selection::SelectionState;
use apr_trends::application::trend_view::TrendView;
use apr_trends::application::upload_service::UploadService;
use apr_trends::infrastructure::config::load_app_config;
use apr_trends::infrastructure::http_repository::HttpAnalyticsRepository;
use apr_trends::presentation::view_model::{DashboardSnapshot, UploadsSection};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let catalog = Arc::new(config.catalog()?);

    // Create repository (infrastructure layer)
    let repository: Arc<dyn AnalyticsRepository> = Arc::new(HttpAnalyticsRepository::new(
        &config.backend.base_url,
        config.backend.request_timeout_secs.map(Duration::from_secs),
    )?);

    // Create view state (application layer)
    let selection = SelectionState::from_ids(
        &config.trends.initial_parameters,
        config.trends.multi_mode,
        &catalog,
    )?;
    let trend_view = TrendView::new(
        catalog.clone(),
        repository.clone(),
        selection,
        config.trends.default_days,
    )?;
    let insights_panel = DerivedInsightsPanel::new(repository.clone());
    let upload_service = UploadService::new(repository.clone());

    tracing::info!(
        "Loading APR dashboard from {} ({} days, {:?})",
        config.backend.base_url,
        trend_view.days(),
        trend_view.selection().active()
    );

    // Mount: insights load once, trends load for the initial selection
    let (insights, _, uploads) = tokio::join!(
        insights_panel.load(),
        trend_view.refresh(),
        upload_service.history()
    );

    let uploads = match uploads {
        Ok(records) => UploadsSection::Loaded(records),
        Err(e) => {
            tracing::warn!("Error fetching upload history: {}", e);
            UploadsSection::Failed(e.to_string())
        }
    };

    let snapshot = DashboardSnapshot::new(trend_view.chart(), insights, uploads);
    println!("{}", snapshot.to_json()?);

    Ok(())
}
