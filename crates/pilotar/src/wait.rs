//! Polling-based explicit waits.
//!
//! The page updates asynchronously relative to the driving process. Rather
//! than sprinkling sleeps, every synchronization point is a [`Wait`]: a
//! bounded poll loop over a pure observation. The probe is invoked
//! repeatedly until it yields a value; between probes the calling thread
//! sleeps for the poll interval; once the budget elapses the wait fails with
//! [`PilotarError::Timeout`] carrying the condition description.
//!
//! Probe semantics:
//!
//! - `Ok(Some(value))`: condition satisfied, wait returns immediately
//! - `Ok(None)`: not yet, poll again
//! - `Err(e)` where `e.is_fault()`: the browser connection is gone, abort
//! - any other `Err`: transient (element vanished mid-probe, stale read),
//!   treated as not-yet-satisfied; the last one is reported if the wait
//!   ultimately times out
//!
//! Probes must observe, never mutate: the loop may invoke them any number of
//! times.

use crate::result::{PilotarError, PilotarResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default wait timeout in milliseconds
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// ============================================================================
// WAIT OPTIONS
// ============================================================================

/// Timeout and poll interval for a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Maximum time to wait in milliseconds
    pub timeout_ms: u64,
    /// Delay between successive probes in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create options with default timeout and interval
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set the timeout in milliseconds
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the poll interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ============================================================================
// WAIT ENGINE
// ============================================================================

/// Bounded poll loop over a pure observation.
///
/// The probe runs at least once even with a zero timeout, so a condition
/// that already holds never fails spuriously.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wait {
    options: WaitOptions,
}

impl Wait {
    /// Create a wait with default options
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: WaitOptions::new(),
        }
    }

    /// Create a wait with the given options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options in effect
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll `probe` until it yields a value or the budget elapses.
    ///
    /// `description` names the condition in logs and in the timeout error.
    pub fn until<T, F>(&self, description: &str, mut probe: F) -> PilotarResult<T>
    where
        F: FnMut() -> PilotarResult<Option<T>>,
    {
        let timeout = self.options.timeout();
        let interval = self.options.poll_interval();
        let start = Instant::now();
        let mut last_probe_error: Option<PilotarError> = None;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match probe() {
                Ok(Some(value)) => {
                    debug!(
                        condition = description,
                        attempts,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "condition satisfied"
                    );
                    return Ok(value);
                }
                Ok(None) => {
                    last_probe_error = None;
                }
                Err(e) if e.is_fault() => {
                    warn!(condition = description, error = %e, "fault while probing, aborting wait");
                    return Err(e);
                }
                Err(e) => {
                    last_probe_error = Some(e);
                }
            }
            if start.elapsed() >= timeout {
                break;
            }
            std::thread::sleep(interval);
        }

        let condition = match last_probe_error {
            Some(e) => format!("{description} (last probe error: {e})"),
            None => description.to_string(),
        };
        warn!(condition = %condition, attempts, timeout_ms = self.options.timeout_ms, "wait timed out");
        Err(PilotarError::Timeout {
            condition,
            ms: self.options.timeout_ms,
        })
    }
}

impl From<WaitOptions> for Wait {
    fn from(options: WaitOptions) -> Self {
        Self::with_options(options)
    }
}
