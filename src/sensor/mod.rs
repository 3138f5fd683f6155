use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::state::{Config, Sample};

mod http;
mod simulated;

pub use http::HttpSource;
pub use simulated::SimulatedSource;

/// Why a fetch produced no sample. Every failure is reported to the caller;
/// the poll loop decides whether to wait for the next tick.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Network(String),
    #[error("endpoint returned HTTP {status}")]
    Http { status: u16 },
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },
}

#[derive(Clone, Copy, Debug)]
pub enum SourceKind {
    Http,
    Simulated,
}

impl SourceKind {
    pub fn from_env() -> Self {
        match std::env::var("SOURCE").unwrap_or_else(|_| "http".to_string()).as_str() {
            "simulated" => SourceKind::Simulated,
            _ => SourceKind::Http,
        }
    }

    pub fn build(self, cfg: Config) -> Result<Box<dyn SensorSource + Send + Sync>> {
        match self {
            SourceKind::Http => Ok(Box::new(HttpSource::new(cfg)?)),
            SourceKind::Simulated => Ok(Box::new(SimulatedSource::new())),
        }
    }
}

#[async_trait]
pub trait SensorSource {
    /// One request/response cycle: a fresh, validated sample or a [`FetchError`].
    async fn sample(&self) -> Result<Sample, FetchError>;
}
