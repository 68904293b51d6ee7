//! Placeholder provider: a random crop from a fixed list.
//!
//! Not a model. It ignores the sample entirely; only the label set and the
//! score range are fixed.

use crate::recommendation::Prediction;
use crate::sample::SoilWeatherSample;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

pub const CROPS: [&str; 7] = ["Rice", "Wheat", "Cotton", "Maize", "Sugarcane", "Coffee", "Tea"];

pub const MIN_SCORE: f64 = 70.0;
pub const MAX_SCORE: f64 = 100.0;

pub struct LocalStub {
    rng: Mutex<StdRng>,
}

impl Default for LocalStub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStub {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of predictions
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn predict(&self, _sample: &SoilWeatherSample) -> Prediction {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let crop = CROPS.choose(&mut *rng).copied().unwrap_or(CROPS[0]);
        let score = rng.gen_range(MIN_SCORE..=MAX_SCORE);

        Prediction {
            crop: crop.to_string(),
            score,
        }
    }
}
