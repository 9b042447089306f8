//! Sliding-window rate limiting over the counter store.
//!
//! Each configured window is evaluated against the client's timestamp log
//! ending at "now", so there are no fixed-bucket boundary bursts. Every
//! observed request is appended to the log regardless of the decision;
//! denied bursts keep consuming slots and cannot reset their own window.

use crate::counter_store::{WindowCounterStore, WindowObservation};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One enforced window: at most `quota` requests per `window`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowRule {
    pub quota: u32,
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

/// Rate limiter configuration.
///
/// `fail_open` selects the admission policy when the counter store cannot
/// durably record a request: `false` (default) rejects the request with a
/// storage error, `true` admits it without a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub windows: Vec<WindowRule>,
    #[serde(default)]
    pub fail_open: bool,
}

impl RateLimitSettings {
    pub fn new(requests_per_minute: u32, requests_per_hour: u32) -> Self {
        Self {
            windows: vec![
                WindowRule {
                    quota: requests_per_minute,
                    window: Duration::from_secs(60),
                },
                WindowRule {
                    quota: requests_per_hour,
                    window: Duration::from_secs(3600),
                },
            ],
            fail_open: false,
        }
    }

    /// Largest configured window; records older than this are dead weight.
    pub fn largest_window(&self) -> Duration {
        self.windows
            .iter()
            .map(|rule| rule.window)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self::new(60, 1000)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Whole seconds until the violated window frees a slot, rounded up.
    pub retry_after_seconds: Option<u64>,
}

impl Decision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_seconds: None,
        }
    }

    fn denied(retry_after_seconds: u64) -> Self {
        Self {
            allowed: false,
            retry_after_seconds: Some(retry_after_seconds),
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn WindowCounterStore>,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn WindowCounterStore>, settings: RateLimitSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    /// Check every window for `client_key` and record the request.
    ///
    /// The observe-then-append step runs atomically in the store, so two
    /// concurrent requests cannot both claim the last free slot. When more
    /// than one window is violated the retry hint is the longest wait.
    pub fn check_and_record(&self, client_key: &str, now_ms: u64) -> Result<Decision> {
        let cutoffs: Vec<u64> = self
            .settings
            .windows
            .iter()
            .map(|rule| now_ms.saturating_sub(rule.window.as_millis() as u64))
            .collect();

        let observations = match self.store.append_and_observe(client_key, now_ms, &cutoffs) {
            Ok(observations) => observations,
            Err(err) if self.settings.fail_open => {
                tracing::warn!(
                    client_key = %client_key,
                    error = %err,
                    "counter store write failed, admitting per fail-open policy"
                );
                return Ok(Decision::allowed());
            }
            Err(err) => {
                tracing::warn!(
                    client_key = %client_key,
                    error = %err,
                    "counter store write failed, rejecting per fail-closed policy"
                );
                return Err(err);
            }
        };

        let mut retry_after: Option<u64> = None;
        for (rule, observation) in self.settings.windows.iter().zip(observations.iter()) {
            if observation.count >= u64::from(rule.quota) {
                let wait = retry_after_seconds(rule, observation, now_ms);
                retry_after = Some(retry_after.map_or(wait, |current| current.max(wait)));
            }
        }

        match retry_after {
            Some(seconds) => {
                tracing::debug!(
                    client_key = %client_key,
                    retry_after_seconds = seconds,
                    "request denied by sliding window"
                );
                Ok(Decision::denied(seconds))
            }
            None => Ok(Decision::allowed()),
        }
    }

    /// Drop records too old to fall inside any window. Returns the number
    /// removed.
    pub fn prune_stale(&self, now_ms: u64) -> Result<usize> {
        let retention = self.settings.largest_window().as_millis() as u64;
        self.store
            .prune_older_than(now_ms.saturating_sub(retention))
    }
}

/// Seconds until the oldest record in the violated window falls out of it,
/// rounded up to a whole second and never zero.
fn retry_after_seconds(rule: &WindowRule, observation: &WindowObservation, now_ms: u64) -> u64 {
    let window_ms = rule.window.as_millis() as u64;
    let remaining_ms = match observation.oldest_ms {
        Some(oldest) => window_ms.saturating_sub(now_ms.saturating_sub(oldest)),
        // Zero quota: no record to wait out, the full window applies.
        None => window_ms,
    };
    (remaining_ms.div_ceil(1000)).max(1)
}
