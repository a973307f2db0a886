//! Tick scheduling and timing utilities.
//!
//! The engine only needs a way to start and cancel recurring ticks, see
//! [`TickScheduler`]. [`IntervalTimer`] is a portable implementation without
//! async/await or platform-specific timers: the caller polls it with the
//! current time and is responsible for sleeping between polls.

use embassy_time::{Duration, Instant};

/// Timing primitive the engine needs from its host
pub trait TickScheduler {
    /// Start (or restart) recurring ticks at `interval`
    fn schedule_every(&mut self, interval: Duration);

    /// Stop recurring ticks
    fn cancel(&mut self);
}

/// Result of polling an [`IntervalTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPoll {
    /// Whether a tick is due now
    pub due: bool,
    /// How long to wait until the next poll (zero when disarmed)
    pub sleep_duration: Duration,
}

/// Portable interval timer with drift correction.
///
/// The first poll after arming only establishes the schedule: the engine
/// ticks once synchronously when it starts, so the next tick is one
/// interval later. If the caller falls behind by more than two intervals
/// the backlog is skipped instead of firing a burst of ticks.
///
/// # Usage
///
/// ```ignore
/// loop {
///     let now = Instant::from_millis(get_current_time_ms());
///     let poll = engine.poll(now);
///
///     // Platform-specific sleep
///     sleep_ms(poll.sleep_duration.as_millis());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    interval: Option<Duration>,
    next_tick: Option<Instant>,
}

impl IntervalTimer {
    pub const fn new() -> Self {
        Self {
            interval: None,
            next_tick: None,
        }
    }

    /// Whether recurring ticks are scheduled
    pub const fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Current tick interval
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Deadline of the next tick, once established
    pub const fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Check whether a tick is due and advance the schedule if so.
    pub fn poll(&mut self, now: Instant) -> TimerPoll {
        let Some(interval) = self.interval else {
            return TimerPoll {
                due: false,
                sleep_duration: Duration::from_millis(0),
            };
        };

        let Some(next_tick) = self.next_tick else {
            self.next_tick = Some(now + interval);
            return TimerPoll {
                due: false,
                sleep_duration: interval,
            };
        };

        if now < next_tick {
            return TimerPoll {
                due: false,
                sleep_duration: next_tick - now,
            };
        }

        // Drift correction: if we've fallen too far behind, reset to now
        let max_drift = Duration::from_millis(interval.as_millis() * 2);
        let next_tick = if now > next_tick + max_drift {
            now + interval
        } else {
            next_tick + interval
        };
        self.next_tick = Some(next_tick);

        let sleep_duration = if next_tick > now {
            next_tick - now
        } else {
            Duration::from_millis(0)
        };

        TimerPoll {
            due: true,
            sleep_duration,
        }
    }
}

impl TickScheduler for IntervalTimer {
    fn schedule_every(&mut self, interval: Duration) {
        self.interval = Some(interval);
        self.next_tick = None;
    }

    fn cancel(&mut self) {
        self.interval = None;
        self.next_tick = None;
    }
}
