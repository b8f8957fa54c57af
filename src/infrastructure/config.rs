use crate::application::trend_view::DEFAULT_RANGE_DAYS;
use crate::domain::parameter::{CatalogError, Parameter, ParameterCatalog};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub trends: TrendSettings,
    /// Replaces the built-in catalog when non-empty
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// No timeout unless set; a hung request then never settles
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrendSettings {
    #[serde(default = "default_days")]
    pub default_days: u32,
    #[serde(default = "default_initial_parameters")]
    pub initial_parameters: Vec<String>,
    #[serde(default)]
    pub multi_mode: bool,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            initial_parameters: default_initial_parameters(),
            multi_mode: false,
        }
    }
}

fn default_days() -> u32 {
    DEFAULT_RANGE_DAYS
}

fn default_initial_parameters() -> Vec<String> {
    vec!["hardness".to_string()]
}

impl AppConfig {
    pub fn catalog(&self) -> Result<ParameterCatalog, CatalogError> {
        if self.parameters.is_empty() {
            Ok(ParameterCatalog::builtin())
        } else {
            ParameterCatalog::new(self.parameters.clone())
        }
    }
}

/// `config/apr.toml` (optional) overlaid with `APR__SECTION__KEY` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/apr").required(false))
        .add_source(config::Environment::with_prefix("APR").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
fn parse_config(toml: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
