use std::time::Duration;

/// Polling cadence and retry limits.
///
/// Every interval is a multiple of `unit` (one second in production), so tests
/// can run the full cadence in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub unit: Duration,
    /// Network failures tolerated in a row before the batch times out.
    pub max_error_attempts: u32,
    /// Wait before asking the listing endpoint for a finished job.
    pub recovery_grace: Duration,
    /// Allowance for server/client clock drift when scoping recovery candidates.
    pub recovery_clock_skew: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::with_unit(Duration::from_secs(1))
    }
}

impl PollSettings {
    const CEILING_UNITS: u32 = 10;

    pub fn with_unit(unit: Duration) -> Self {
        Self {
            unit,
            max_error_attempts: 300,
            recovery_grace: unit * 5,
            recovery_clock_skew: Duration::from_secs(120),
        }
    }

    /// Interval before the next tick after `successes` non-terminal polls.
    pub fn interval_for(&self, successes: u32) -> Duration {
        let units = match successes {
            0..=4 => 1,
            5..=14 => 2,
            15..=29 => 5,
            _ => Self::CEILING_UNITS,
        };
        self.unit * units
    }

    pub fn ceiling(&self) -> Duration {
        self.unit * Self::CEILING_UNITS
    }

    /// Interval after a network failure: doubled, capped at the ceiling.
    pub fn backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.ceiling())
    }
}
