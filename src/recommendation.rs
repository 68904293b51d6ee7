//! Recommendations and the session history they accumulate in

use crate::sample::SoilWeatherSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Normalized provider answer, before it is stamped into a `Recommendation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub crop: String,
    pub score: f64,
}

/// One produced result. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    crop: String,
    score: f64,
    timestamp: DateTime<Utc>,
    inputs: SoilWeatherSample,
}

impl Recommendation {
    pub fn new(
        prediction: Prediction,
        inputs: SoilWeatherSample,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            crop: prediction.crop,
            score: prediction.score,
            timestamp,
            inputs,
        }
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn inputs(&self) -> &SoilWeatherSample {
        &self.inputs
    }
}

/// Session-scoped recommendations, newest first.
///
/// Unbounded: the list lives only as long as its session, so there is no
/// eviction policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<Recommendation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a recommendation at the front. No deduplication.
    pub fn prepend(&mut self, recommendation: Recommendation) {
        self.entries.push_front(recommendation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&Recommendation> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&Recommendation> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recommendation> {
        self.entries.iter()
    }
}
