//! Proactive rate-limit governance
//!
//! Every successful search response carries a quota snapshot. The governor
//! inspects it after each page and suspends the crawl until the advertised
//! reset when the remaining quota runs low, so the crawl never slams into a
//! hard rejection mid-pagination.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Remaining-quota snapshot returned alongside every page
///
/// Deserialized straight off the wire (`rateLimit { remaining resetAt }`)
/// and consumed immediately; never retained across pages.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSnapshot {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Pauses the crawl before the remote starves it
pub struct RateLimitGovernor {
    low_water: u32,
    safety_margin: Duration,
}

impl RateLimitGovernor {
    pub fn new(low_water: u32, safety_margin: Duration) -> Self {
        Self {
            low_water,
            safety_margin,
        }
    }

    /// Observes a quota snapshot, sleeping until past the reset if needed
    ///
    /// A missing snapshot is treated as "no constraint": the remote not
    /// reporting quota must never stall the crawl. At most one wait happens
    /// per observation.
    pub async fn observe(&self, snapshot: Option<&RateLimitSnapshot>) {
        let Some(snapshot) = snapshot else {
            tracing::debug!("no rate limit data in response, continuing");
            return;
        };

        if snapshot.remaining >= self.low_water {
            return;
        }

        let margin = ChronoDuration::milliseconds(self.safety_margin.as_millis() as i64);
        let wait = snapshot.reset_at.signed_duration_since(Utc::now()) + margin;

        match wait.to_std() {
            Ok(wait) if !wait.is_zero() => {
                tracing::info!(
                    remaining = snapshot.remaining,
                    reset_at = %snapshot.reset_at,
                    wait_secs = wait.as_secs(),
                    "rate limit low, pausing until reset"
                );
                tokio::time::sleep(wait).await;
            }
            _ => {
                // Reset instant already passed; quota is fresh again
                tracing::debug!(
                    remaining = snapshot.remaining,
                    "rate limit low but reset already passed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot(remaining: u32, reset_in_secs: i64) -> RateLimitSnapshot {
        RateLimitSnapshot {
            remaining,
            reset_at: Utc::now() + ChronoDuration::seconds(reset_in_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_quota_waits_past_reset() {
        let governor = RateLimitGovernor::new(100, Duration::from_secs(10));
        let snap = snapshot(50, 30);

        let before = tokio::time::Instant::now();
        governor.observe(Some(&snap)).await;
        let waited = before.elapsed();

        // Wall clock may tick a little between snapshot creation and the
        // wait computation, so allow a small tolerance below 30s + 10s
        assert!(waited >= Duration::from_secs(39), "waited {:?}", waited);
        assert!(waited <= Duration::from_secs(41), "waited {:?}", waited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_quota_does_not_wait() {
        let governor = RateLimitGovernor::new(100, Duration::from_secs(10));
        let snap = snapshot(4000, 30);

        let before = tokio::time::Instant::now();
        governor.observe(Some(&snap)).await;

        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_snapshot_is_fail_open() {
        let governor = RateLimitGovernor::new(100, Duration::from_secs(10));

        let before = tokio::time::Instant::now();
        governor.observe(None).await;

        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_in_the_past_does_not_wait() {
        let governor = RateLimitGovernor::new(100, Duration::from_secs(1));
        let snap = snapshot(10, -120);

        let before = tokio::time::Instant::now();
        governor.observe(Some(&snap)).await;

        assert!(before.elapsed() < Duration::from_secs(1));
    }
}
