// ⏳ Deferred Initialization - One path, retried until the input exists
//
// The controller is built exactly once, after the source reports Ready.
// Until then the initializer waits `delay` and asks again, up to `attempts`
// times. A source that is present but invalid fails immediately.

use crate::filter::{FilterController, FilterView, NullView};
use crate::source::{Portfolio, SourceState};
use anyhow::{bail, Result};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ATTEMPTS: u32 = 10;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Initializer {
    attempts: u32,
    delay: Duration,
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl Initializer {
    /// `attempts` is clamped to at least one try
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Initializer {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Poll `probe` until it yields a portfolio
    pub fn wait_for<F>(&self, mut probe: F) -> Result<Portfolio>
    where
        F: FnMut() -> Result<SourceState>,
    {
        let mut last_reason = String::new();

        for attempt in 1..=self.attempts {
            match probe()? {
                SourceState::Ready(portfolio) => {
                    info!(attempt, "portfolio source ready");
                    return Ok(portfolio);
                }
                SourceState::Pending(reason) => {
                    debug!(attempt, max = self.attempts, %reason, "portfolio source not ready");
                    last_reason = reason;
                    if attempt < self.attempts {
                        thread::sleep(self.delay);
                    }
                }
            }
        }

        bail!(
            "Portfolio source not available after {} attempt(s): {}",
            self.attempts,
            last_reason
        )
    }

    /// Wait for the source, then build the controller with no view
    pub fn run<F>(&self, probe: F) -> Result<FilterController<NullView>>
    where
        F: FnMut() -> Result<SourceState>,
    {
        Ok(self.wait_for(probe)?.into_controller())
    }

    /// Wait for the source, then build the controller around `view`
    pub fn run_with_view<F, V>(&self, probe: F, view: V) -> Result<FilterController<V>>
    where
        F: FnMut() -> Result<SourceState>,
        V: FilterView,
    {
        Ok(self.wait_for(probe)?.into_controller_with_view(view))
    }
}
