//! Politeness pauses between requests.
//!
//! The orchestrator never sleeps directly; every wait goes through a
//! [`DelayStrategy`] so tests can run with [`NoDelay`].

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::trace;

use jobcrawl_shared::{DelayRange, DelaysConfig, MAX_DELAY_SECS};

/// The reason for a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pause {
    /// After a results page has loaded.
    BetweenPages,
    /// Between queries, and before following a "next page" link.
    BetweenQueries,
    /// Before opening a job detail page.
    OpenDetail,
    /// Retry backoff of a fixed length.
    Backoff(Duration),
}

#[async_trait]
pub trait DelayStrategy: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Never waits.
pub struct NoDelay;

#[async_trait]
impl DelayStrategy for NoDelay {
    async fn pause(&self, _pause: Pause) {}
}

/// Sleeps for a uniformly random time within the configured ranges.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    between_pages: DelayRange,
    between_queries: DelayRange,
    open_detail: DelayRange,
}

impl RandomDelay {
    pub fn new(config: &DelaysConfig) -> Self {
        Self {
            between_pages: config.between_pages,
            between_queries: config.between_queries,
            open_detail: config.open_detail,
        }
    }

    /// Pick the sleep length for `pause`.
    pub fn duration(&self, pause: Pause) -> Duration {
        let range = match pause {
            Pause::Backoff(d) => return d,
            Pause::BetweenPages => self.between_pages,
            Pause::BetweenQueries => self.between_queries,
            Pause::OpenDetail => self.open_detail,
        };
        let hi = range.max().clamp(0.0, MAX_DELAY_SECS);
        let lo = range.min().clamp(0.0, hi);
        let secs = if hi > lo {
            rand::thread_rng().gen_range(lo..=hi)
        } else {
            lo
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl DelayStrategy for RandomDelay {
    async fn pause(&self, pause: Pause) {
        let wait = self.duration(pause);
        trace!(?pause, ?wait, "pausing");
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_in_range() {
        let delay = RandomDelay::new(&DelaysConfig::default());
        for _ in 0..50 {
            let d = delay.duration(Pause::BetweenPages).as_secs_f64();
            assert!((1.5..=3.5).contains(&d), "{d} out of range");
        }
    }

    #[test]
    fn backoff_is_exact() {
        let delay = RandomDelay::new(&DelaysConfig::default());
        let d = delay.duration(Pause::Backoff(Duration::from_secs(6)));
        assert_eq!(d, Duration::from_secs(6));
    }

    #[test]
    fn degenerate_range_uses_min() {
        let config = DelaysConfig {
            between_queries: DelayRange(0.0, 0.0),
            ..DelaysConfig::default()
        };
        let delay = RandomDelay::new(&config);
        assert!(delay.duration(Pause::BetweenQueries).is_zero());
    }

    #[test]
    fn oversized_range_is_capped() {
        let config = DelaysConfig {
            open_detail: DelayRange(0.0, 1e30),
            between_queries: DelayRange(f64::NAN, f64::INFINITY),
            ..DelaysConfig::default()
        };
        let delay = RandomDelay::new(&config);
        let cap = Duration::from_secs_f64(MAX_DELAY_SECS);
        assert!(delay.duration(Pause::OpenDetail) <= cap);
        assert!(delay.duration(Pause::BetweenQueries) <= cap);
    }

    #[tokio::test]
    async fn no_delay_returns_immediately() {
        let start = std::time::Instant::now();
        NoDelay.pause(Pause::Backoff(Duration::from_secs(60))).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
