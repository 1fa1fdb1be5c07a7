use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use super::generator::{GenerationStatus, InsightGenerator};
use super::InsightError;
use crate::config::{DEFAULT_INSIGHT_MAX_POLLS, DEFAULT_INSIGHT_POLL_SECS};

/// How a refresh waits for its run to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INSIGHT_POLL_SECS),
            max_polls: DEFAULT_INSIGHT_MAX_POLLS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome<T> {
    pub run_id: String,
    pub generated: u32,
    pub polls: u32,
    pub insights: T,
}

/// Trigger a run, poll its status until it settles, then reload.
///
/// The store is read exactly once, after the run reports completion.
pub async fn refresh_insights<T, F, Fut>(
    generator: &dyn InsightGenerator,
    policy: RefreshPolicy,
    reload: F,
) -> Result<RefreshOutcome<T>, InsightError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, InsightError>>,
{
    let ticket = generator.trigger().await?;
    let run_id = ticket.run_id;

    let mut polls = 0;
    let generated = loop {
        if polls >= policy.max_polls {
            tracing::warn!(%run_id, polls, "Insight generation did not finish in time");
            return Err(InsightError::TimedOut { run_id, polls });
        }
        tokio::time::sleep(policy.interval).await;
        polls += 1;

        match generator.status(&run_id).await? {
            GenerationStatus::Pending => {
                tracing::debug!(%run_id, polls, "Insight generation pending");
            }
            GenerationStatus::Completed { generated } => break generated,
            GenerationStatus::Failed { reason } => {
                tracing::warn!(%run_id, %reason, "Insight generation failed");
                return Err(InsightError::GenerationFailed { run_id, reason });
            }
        }
    };

    tracing::info!(%run_id, generated, polls, "Insight generation completed");
    let insights = reload().await?;
    Ok(RefreshOutcome { run_id, generated, polls, insights })
}
