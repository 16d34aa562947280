use anyhow::{Context, Result};
use platform_backend::BackendSettings;

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Path prefix in front of `/employes`.
    pub api_base: String,
    pub log_filter: Option<String>,
    pub backend: BackendSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let backend = BackendSettings::from_env().context("invalid fake backend settings")?;
        let api_base = std::env::var("EMPLOYES_API_BASE").unwrap_or_default();
        let log_filter = std::env::var("EMPLOYES_LOG")
            .ok()
            .filter(|filter| !filter.trim().is_empty());

        Ok(Self {
            api_base,
            log_filter,
            backend,
        })
    }
}
