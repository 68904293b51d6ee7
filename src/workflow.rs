//! Recommendation request workflow
//!
//! Per submission:
//!
//! ```text
//! Idle -> Validating -> Rejected ----------------------------> Idle
//!                    -> Requesting -> Failed ----------------> Idle
//!                                  -> Succeeded -> HistoryUpdated -> Idle
//! ```
//!
//! Only `HistoryUpdated` touches the history. Validation always finishes
//! before the provider is called.

use crate::error::{SubmitError, ValidationError};
use crate::provider::RecommendationProvider;
use crate::recommendation::{History, Recommendation};
use crate::sample::{FormVariant, SampleForm, SoilWeatherSample};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Validating,
    Rejected,
    Requesting,
    Succeeded,
    Failed,
    HistoryUpdated,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Requesting)
                | (Requesting, Succeeded)
                | (Requesting, Failed)
                | (Succeeded, HistoryUpdated)
                | (Rejected, Idle)
                | (Failed, Idle)
                | (HistoryUpdated, Idle)
        )
    }
}

/// Phase tracker for one submission
struct Submission {
    phase: Phase,
}

impl Submission {
    fn start() -> Self {
        Self { phase: Phase::Idle }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::debug!("Submission {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Record the terminal phase on the session and return to Idle
    fn finish(mut self, state: &mut SessionState, terminal: Phase) {
        self.advance(terminal);
        state.last_outcome = Some(terminal);
        self.advance(Phase::Idle);
    }
}

// ============================================================================
// Session state
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStats {
    pub submitted: u64,
    pub rejected: u64,
    pub failed: u64,
    pub succeeded: u64,
}

/// Everything one session owns. Dropped with the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    history: History,
    latest: Option<Recommendation>,
    last_outcome: Option<Phase>,
    stats: SubmissionStats,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Result of the most recent successful request, cleared when a new
    /// request goes out
    pub fn latest(&self) -> Option<&Recommendation> {
        self.latest.as_ref()
    }

    /// `Rejected`, `Failed` or `HistoryUpdated` for the last submission
    pub fn last_outcome(&self) -> Option<Phase> {
        self.last_outcome
    }

    pub fn stats(&self) -> SubmissionStats {
        self.stats
    }
}

// ============================================================================
// Workflow
// ============================================================================

pub struct Workflow {
    provider: RecommendationProvider,
    variant: FormVariant,
}

impl Workflow {
    pub fn new(provider: impl Into<RecommendationProvider>, variant: FormVariant) -> Self {
        Self {
            provider: provider.into(),
            variant,
        }
    }

    pub fn provider(&self) -> &RecommendationProvider {
        &self.provider
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    /// Parse a raw form for the active variant and request a recommendation
    pub async fn submit(
        &self,
        state: &mut SessionState,
        form: &SampleForm,
    ) -> Result<Recommendation, SubmitError> {
        self.run(state, |variant| form.parse(variant)).await
    }

    /// Same as `submit` for an already-typed sample
    pub async fn submit_sample(
        &self,
        state: &mut SessionState,
        sample: SoilWeatherSample,
    ) -> Result<Recommendation, SubmitError> {
        self.run(state, |variant| sample.validate_for(variant).map(|()| sample))
            .await
    }

    async fn run<F>(
        &self,
        state: &mut SessionState,
        validate: F,
    ) -> Result<Recommendation, SubmitError>
    where
        F: FnOnce(FormVariant) -> Result<SoilWeatherSample, ValidationError>,
    {
        let mut submission = Submission::start();
        state.stats.submitted += 1;

        submission.advance(Phase::Validating);
        let sample = match validate(self.variant) {
            Ok(sample) => sample,
            Err(e) => {
                tracing::info!("Sample rejected: {}", e);
                state.stats.rejected += 1;
                submission.finish(state, Phase::Rejected);
                return Err(e.into());
            }
        };

        submission.advance(Phase::Requesting);
        state.latest = None;

        let prediction = match self.provider.recommend(&sample).await {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!("{} provider failed: {}", self.provider.strategy(), e);
                state.stats.failed += 1;
                submission.finish(state, Phase::Failed);
                return Err(e.into());
            }
        };

        submission.advance(Phase::Succeeded);
        let recommendation = Recommendation::new(prediction, sample, Utc::now());
        tracing::info!(
            "Recommended {} ({:.1}) via {} provider",
            recommendation.crop(),
            recommendation.score(),
            self.provider.strategy()
        );

        state.history.prepend(recommendation.clone());
        state.latest = Some(recommendation.clone());
        state.stats.succeeded += 1;
        submission.finish(state, Phase::HistoryUpdated);

        Ok(recommendation)
    }
}
