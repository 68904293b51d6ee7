//! Crop Recommender
//!
//! Soil and weather samples in, crop recommendations out.
//!
//! - `sample`: measurements, raw form parsing, validation
//! - `provider`: where predictions come from (local placeholder or remote service)
//! - `wire`: field-name mapping for the remote service's JSON contract
//! - `workflow`: per-submission state machine and session history
//! - `backend`: client for the hosted persistence service
//! - `forms`: contact and authentication form shells
//!
//! With the `api` feature: `api_server` (axum routes) and `web` (HTML pages).

pub mod backend;
pub mod config;
pub mod error;
pub mod forms;
pub mod provider;
pub mod recommendation;
pub mod sample;
pub mod wire;
pub mod workflow;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::{AppConfig, StrategyConfig};
pub use error::{RequestError, SubmitError, ValidationError};
pub use provider::{LocalStub, RecommendationProvider, RemoteService};
pub use recommendation::{History, Prediction, Recommendation};
pub use sample::{FormVariant, SampleField, SampleForm, SoilType, SoilWeatherSample};
pub use wire::WireFieldMap;
pub use workflow::{Phase, SessionState, Workflow};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
