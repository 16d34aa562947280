//! Fake REST backend for the employee desk.
//!
//! Nothing here binds a socket. [`build_stack`] returns a tower service that
//! callers drive in-process: the [`FakeBackendLayer`] answers the employee
//! endpoints itself and lets everything else through to the asset transport.

mod interceptor;
mod routes;
mod transport;

use std::{path::PathBuf, time::Duration};

use axum::{Router, http::uri::InvalidUri};
use thiserror::Error;
use tower::Layer;

pub use interceptor::{FakeBackend, FakeBackendLayer};
pub use routes::Route;
pub use transport::{ASSETS_MOUNT, asset_transport};

pub const DEFAULT_COLLECTION_PATH: &str = "/employes";
pub const DEFAULT_FIXTURE_FILE: &str = "employes.json";
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid fixture path {path}")]
    InvalidFixturePath {
        path: String,
        #[source]
        source: InvalidUri,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Where the fixture lives and how the simulated backend behaves.
#[derive(Clone, Debug)]
pub struct BackendSettings {
    pub assets_dir: PathBuf,
    pub fixture_file: String,
    pub collection_path: String,
    pub latency: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            fixture_file: DEFAULT_FIXTURE_FILE.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            latency: DEFAULT_LATENCY,
        }
    }
}

impl BackendSettings {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Read `EMPLOYES_ASSETS_DIR`, `EMPLOYES_FIXTURE` and `FAKE_BACKEND_LATENCY_MS`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> BackendResult<Self> {
        let mut settings = Self::default();
        if let Ok(dir) = std::env::var("EMPLOYES_ASSETS_DIR") {
            settings.assets_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("EMPLOYES_FIXTURE") {
            settings.fixture_file = file.trim_start_matches('/').to_string();
        }
        if let Ok(raw) = std::env::var("FAKE_BACKEND_LATENCY_MS") {
            let millis = raw.trim().parse::<u64>().map_err(|_| BackendError::InvalidEnv {
                key: "FAKE_BACKEND_LATENCY_MS",
                value: raw.clone(),
            })?;
            settings.latency = Duration::from_millis(millis);
        }
        Ok(settings)
    }

    /// Request path the list endpoint is rewritten to.
    pub fn fixture_path(&self) -> String {
        format!("{ASSETS_MOUNT}/{}", self.fixture_file)
    }
}

/// The fake backend layered over the asset transport.
pub fn build_stack(settings: BackendSettings) -> BackendResult<FakeBackend<Router>> {
    let transport = asset_transport(&settings);
    let layer = FakeBackendLayer::new(settings)?;
    Ok(layer.layer(transport))
}
