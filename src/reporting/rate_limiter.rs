//! Report rate limiter
//!
//! Remembers when each failure fingerprint was last admitted and suppresses
//! repeats inside the admission window. The table is the only shared mutable
//! state of the reporter; the check and the record happen under one lock so
//! two racing validations of the same failure cannot both be admitted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::config::{ReporterConfig, RATE_LIMIT_MAX_ENTRIES, RATE_LIMIT_SWEEP_INTERVAL_SECS};
use crate::report::{PinningFailureReport, ReportFingerprint};
use super::clock::{Clock, SystemClock};

struct LimiterState {
    /// Fingerprint -> instant of last admission
    admitted: HashMap<ReportFingerprint, Instant>,
    last_sweep: Instant,
}

impl LimiterState {
    /// Drop entries whose window has closed; returns how many were dropped
    fn sweep(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.admitted.len();
        self.admitted
            .retain(|_, admitted_at| now.saturating_duration_since(*admitted_at) < window);
        self.last_sweep = now;
        before - self.admitted.len()
    }
}

/// Time-windowed deduplication of failure reports
pub struct ReportRateLimiter {
    enabled: bool,
    window: Duration,
    sweep_interval: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

impl ReportRateLimiter {
    /// An enabled limiter with the given window and default bounds
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    /// An enabled limiter reading time from `clock`
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            enabled: true,
            window,
            sweep_interval: Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECS),
            max_entries: RATE_LIMIT_MAX_ENTRIES,
            clock,
            state: Mutex::new(LimiterState {
                admitted: HashMap::new(),
                last_sweep: now,
            }),
        }
    }

    /// A limiter that admits everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Duration::ZERO)
        }
    }

    /// Build from configuration
    pub fn from_config(config: &ReporterConfig) -> Self {
        let limiter = Self {
            enabled: config.rate_limit_enabled(),
            ..Self::new(config.rate_limit_window())
        };

        limiter
            .sweep_interval(config.rate_limit_sweep_interval())
            .max_entries(config.rate_limit_max_entries())
    }

    /// Set how often `admit` sweeps expired entries
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Soft bound on remembered fingerprints
    ///
    /// Reaching it forces a sweep of expired entries. Fingerprints still
    /// inside their window are kept even if the table stays above the bound.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether `report` should be sent
    ///
    /// Returns `true` when no report with the same fingerprint was admitted
    /// during the last window, and records the admission. A suppressed call
    /// leaves the recorded instant untouched, so bursts never extend the
    /// window.
    pub fn admit(&self, report: &PinningFailureReport) -> bool {
        if !self.enabled {
            return true;
        }

        self.admit_fingerprint(report.fingerprint())
    }

    /// [`admit`](Self::admit) for a precomputed fingerprint
    pub fn admit_fingerprint(&self, fingerprint: ReportFingerprint) -> bool {
        if !self.enabled {
            return true;
        }

        let now = self.clock.now();
        let mut state = self.lock();

        if now.saturating_duration_since(state.last_sweep) >= self.sweep_interval {
            let removed = state.sweep(now, self.window);
            if removed > 0 {
                debug!("Swept {} expired report fingerprint(s)", removed);
            }
        }

        if let Some(admitted_at) = state.admitted.get(&fingerprint) {
            let elapsed = now.saturating_duration_since(*admitted_at);
            if elapsed < self.window {
                debug!(
                    "Fingerprint {} admitted {:?} ago, suppressing",
                    fingerprint, elapsed
                );
                return false;
            }
        } else if state.admitted.len() >= self.max_entries {
            state.sweep(now, self.window);
            // Live entries are never dropped; warn once when the table grows past the bound
            if state.admitted.len() == self.max_entries {
                warn!(
                    "Rate limiter holds {} unexpired fingerprints, growing past the configured bound",
                    self.max_entries
                );
            }
        }

        state.admitted.insert(fingerprint, now);
        true
    }

    /// Remove expired fingerprints now; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        self.lock().sweep(now, self.window)
    }

    /// Number of remembered fingerprints, expired ones included until swept
    pub fn len(&self) -> usize {
        self.lock().admitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every admission
    pub fn clear(&self) {
        self.lock().admitted.clear();
    }

    /// Sweep periodically on the current tokio runtime
    ///
    /// The task holds only a weak reference and ends once the limiter is
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    debug!("Rate limiter dropped, stopping sweeper");
                    break;
                };

                let removed = limiter.sweep();
                if removed > 0 {
                    debug!("Background sweep removed {} fingerprint(s)", removed);
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        // The state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ReportRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRateLimiter")
            .field("enabled", &self.enabled)
            .field("window", &self.window)
            .field("sweep_interval", &self.sweep_interval)
            .field("max_entries", &self.max_entries)
            .field("entries", &self.len())
            .finish()
    }
}
