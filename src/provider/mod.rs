//! Recommendation providers
//!
//! The workflow only sees `RecommendationProvider`. `LocalStub` is the random
//! placeholder; `RemoteService` delegates to an HTTP inference endpoint.

pub mod local;
pub mod remote;

pub use local::{LocalStub, CROPS, MAX_SCORE, MIN_SCORE};
pub use remote::{RemoteService, DEFAULT_TIMEOUT};

use crate::config::StrategyConfig;
use crate::error::RequestError;
use crate::recommendation::Prediction;
use crate::sample::SoilWeatherSample;

pub enum RecommendationProvider {
    LocalStub(LocalStub),
    RemoteService(RemoteService),
}

impl RecommendationProvider {
    pub fn from_config(config: &StrategyConfig) -> anyhow::Result<Self> {
        let provider = match config {
            StrategyConfig::Local { seed: Some(seed) } => {
                RecommendationProvider::LocalStub(LocalStub::seeded(*seed))
            }
            StrategyConfig::Local { seed: None } => {
                RecommendationProvider::LocalStub(LocalStub::new())
            }
            StrategyConfig::Remote {
                endpoint,
                timeout,
                fields,
            } => RecommendationProvider::RemoteService(RemoteService::new(
                endpoint,
                fields.clone(),
                *timeout,
            )?),
        };
        Ok(provider)
    }

    /// `"local"` or `"remote"`
    pub fn strategy(&self) -> &'static str {
        match self {
            RecommendationProvider::LocalStub(_) => "local",
            RecommendationProvider::RemoteService(_) => "remote",
        }
    }

    pub async fn recommend(&self, sample: &SoilWeatherSample) -> Result<Prediction, RequestError> {
        match self {
            RecommendationProvider::LocalStub(stub) => Ok(stub.predict(sample)),
            RecommendationProvider::RemoteService(remote) => remote.predict(sample).await,
        }
    }
}

impl From<LocalStub> for RecommendationProvider {
    fn from(stub: LocalStub) -> Self {
        RecommendationProvider::LocalStub(stub)
    }
}

impl From<RemoteService> for RecommendationProvider {
    fn from(remote: RemoteService) -> Self {
        RecommendationProvider::RemoteService(remote)
    }
}
