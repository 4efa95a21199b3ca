//! Query budget counter and cooldown wait.
//!
//! `RateLimitSchedule` counts the queries issued in the current window and, once the
//! policy's budget is spent, waits for the cooldown through a `Sleeper`. The sleeper is a
//! trait so tests can record waits instead of blocking.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use booster_common::rate_limit::RateLimitPolicy;
use booster_common::{BoosterError, Result};
use log::info;

/// Interval at which `InterruptibleSleeper` checks its shutdown flag.
const WAIT_SLICE: Duration = Duration::from_secs(1);

/// Blocks the calling thread for a cooldown.
pub trait Sleeper {
    /// Waits for `duration`. Returns `BoosterError::Interrupted` if the wait was cancelled.
    fn wait(&mut self, duration: Duration) -> Result<()>;

    /// Whether the run has been asked to stop.
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// Plain `thread::sleep`.
#[derive(Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn wait(&mut self, duration: Duration) -> Result<()> {
        thread::sleep(duration);
        Ok(())
    }
}

/// Sleeps in short slices and stops early once `shutdown` is set.
#[derive(Debug, Clone)]
pub struct InterruptibleSleeper {
    shutdown: Arc<AtomicBool>,
    slice: Duration,
}

impl InterruptibleSleeper {
    /// Sleeper cancelled by `shutdown`.
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            shutdown,
            slice: WAIT_SLICE,
        }
    }

    /// Overrides how often the shutdown flag is checked.
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }
}

impl Sleeper for InterruptibleSleeper {
    fn wait(&mut self, duration: Duration) -> Result<()> {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.shutdown.load(Ordering::Relaxed) {
                return Err(BoosterError::Interrupted);
            }
            let step = remaining.min(self.slice);
            thread::sleep(step);
            remaining -= step;
        }
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(BoosterError::Interrupted);
        }
        Ok(())
    }

    fn is_interrupted(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Budget counter for one run.
#[derive(Debug)]
pub struct RateLimitSchedule<W: Sleeper> {
    policy: RateLimitPolicy,
    queries_in_window: u32,
    sleeper: W,
}

impl<W: Sleeper> RateLimitSchedule<W> {
    /// Fresh window for `policy`.
    pub fn new(policy: RateLimitPolicy, sleeper: W) -> Self {
        Self {
            policy,
            queries_in_window: 0,
            sleeper,
        }
    }

    /// Policy in force.
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Queries issued since the last cooldown.
    pub fn queries_in_window(&self) -> u32 {
        self.queries_in_window
    }

    /// Whether the next query has to wait for a cooldown first.
    pub fn window_exhausted(&self) -> bool {
        self.queries_in_window >= self.policy.max_queries_per_window
    }

    /// Counts one issued query.
    pub fn record_query(&mut self) {
        self.queries_in_window += 1;
    }

    /// Waits for the cooldown and opens a new window.
    pub fn cool_down(&mut self) -> Result<()> {
        info!(
            "Number of queries {} reached. Cooldown: {} seconds",
            self.queries_in_window,
            self.policy.cooldown.as_secs()
        );
        self.sleeper.wait(self.policy.cooldown)?;
        self.queries_in_window = 0;
        Ok(())
    }

    /// Whether the sleeper reports a pending stop request.
    pub fn is_interrupted(&self) -> bool {
        self.sleeper.is_interrupted()
    }

    /// Sleeper used for cooldowns.
    pub fn sleeper(&self) -> &W {
        &self.sleeper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSleeper {
        waits: Vec<Duration>,
    }

    impl Sleeper for RecordingSleeper {
        fn wait(&mut self, duration: Duration) -> Result<()> {
            self.waits.push(duration);
            Ok(())
        }
    }

    #[test]
    fn budget_is_spent_then_reset() {
        let policy = RateLimitPolicy {
            max_queries_per_window: 2,
            cooldown: Duration::from_secs(70),
        };
        let mut schedule = RateLimitSchedule::new(policy, RecordingSleeper::default());

        assert!(!schedule.window_exhausted());
        schedule.record_query();
        schedule.record_query();
        assert!(schedule.window_exhausted());

        schedule.cool_down().unwrap();
        assert_eq!(schedule.queries_in_window(), 0);
        assert_eq!(schedule.sleeper().waits, vec![Duration::from_secs(70)]);
    }

    #[test]
    fn interruptible_sleeper_stops_when_flagged() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let mut sleeper = InterruptibleSleeper::new(shutdown).with_slice(Duration::from_millis(1));
        assert!(sleeper.is_interrupted());
        let err = sleeper.wait(Duration::from_secs(3600)).unwrap_err();
        assert!(matches!(err, BoosterError::Interrupted));
    }

    #[test]
    fn interruptible_sleeper_completes_without_flag() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut sleeper = InterruptibleSleeper::new(shutdown).with_slice(Duration::from_millis(1));
        assert!(!sleeper.is_interrupted());
        sleeper.wait(Duration::from_millis(3)).unwrap();
    }
}
