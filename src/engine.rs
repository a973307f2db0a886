//! Oscillator engine - the main orchestrator
//!
//! Ties together parameter resolution, the channel oscillator, the actuator
//! and the tick scheduler. The engine is a two-state machine:
//!
//! - `start()` seeds the channels, runs one tick immediately and arms the
//!   scheduler
//! - `tick()` advances the channels and writes them to the actuator; it
//!   stops the engine by itself once the `enabled` parameter turns off
//! - `stop()` cancels the schedule and restores the captured output state
//!
//! All methods take `&mut self`, so ticks of one engine never overlap and
//! every tick sees the complete state of the previous one.

use embassy_time::{Duration, Instant};
use rand::RngCore;

use crate::actuator::{Actuator, ActuatorSnapshot};
use crate::channel::{ChannelId, ChannelState, ChannelValues, ColorMode};
use crate::config::{OscillatorConfig, OscillatorSettings};
use crate::identity::EngineIdentity;
use crate::interval_timer::{IntervalTimer, TickScheduler};
use crate::log::{log_debug, log_info, log_warn};
use crate::oscillator::{ChannelOscillator, TickMode};
use crate::resolver::{ConfigResolver, SourceLookup};

/// Brightness used when seeding from an output that reports none
pub const SNAPSHOT_BRIGHTNESS_FALLBACK: u8 = 1;

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Stopped,
    Running,
}

/// Summary of a tick that advanced the channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Algorithm the tick ran
    pub mode: TickMode,
    /// Whether any channel value changed
    pub changed: bool,
    /// Whether the actuator accepted the values
    pub applied: bool,
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine is not running, nothing happened
    Idle,
    /// The engine was disabled and stopped itself
    Stopped,
    /// Channels advanced
    Advanced(TickReport),
}

/// Result of [`OscillatorEngine::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnginePoll {
    /// Outcome of the tick, if one was due
    pub outcome: Option<TickOutcome>,
    /// How long to wait until the next poll
    pub sleep_duration: Duration,
}

/// Bounded channel oscillator engine
pub struct OscillatorEngine<'a, L, A, S, R>
where
    L: SourceLookup,
    A: Actuator,
    S: TickScheduler,
    R: RngCore,
{
    // External dependencies and configuration
    identity: EngineIdentity,
    settings: OscillatorSettings<'a>,
    sources: L,
    actuator: A,
    scheduler: S,

    // Internal state
    status: EngineStatus,
    armed_interval: Option<Duration>,
    config: OscillatorConfig,
    color_mode: ColorMode,
    snapshot: Option<ActuatorSnapshot>,
    oscillator: ChannelOscillator<R>,
}

impl<'a, L, A, S, R> OscillatorEngine<'a, L, A, S, R>
where
    L: SourceLookup,
    A: Actuator,
    S: TickScheduler,
    R: RngCore,
{
    /// Create a stopped engine
    ///
    /// The engine cannot exist without an [`EngineIdentity`], which refuses
    /// an empty target.
    pub fn new(
        identity: EngineIdentity,
        settings: OscillatorSettings<'a>,
        sources: L,
        actuator: A,
        scheduler: S,
        rng: R,
    ) -> Self {
        let color_mode = actuator.color_mode();
        let oscillator = ChannelOscillator::new(rng, settings.white_policy);
        Self {
            config: OscillatorConfig::from(settings.defaults),
            identity,
            settings,
            sources,
            actuator,
            scheduler,
            status: EngineStatus::Stopped,
            armed_interval: None,
            color_mode,
            snapshot: None,
            oscillator,
        }
    }

    /// Start the engine
    ///
    /// Stays stopped if the `enabled` parameter is off. Otherwise seeds every
    /// channel, runs one tick immediately and arms the scheduler. Starting a
    /// running engine does nothing.
    pub fn start(&mut self) -> EngineStatus {
        if self.status == EngineStatus::Running {
            return self.status;
        }

        let config = self.resolve_config();
        if !config.enabled {
            log_debug!(config.debug, self.identity.name(), "disabled, not starting");
            return self.status;
        }

        self.color_mode = self.actuator.color_mode();
        self.snapshot = if self.settings.restore_on_stop || config.start_from_current {
            self.actuator.capture_state()
        } else {
            None
        };
        self.seed_channels(&config);
        self.status = EngineStatus::Running;

        log_info!(
            self.identity.name(),
            "starting on {} in {} mode, interval {} s",
            self.identity.target(),
            self.color_mode.as_str(),
            config.trigger_interval.as_secs()
        );

        self.advance(&config);
        self.arm(config.trigger_interval);

        self.status
    }

    /// Run one scheduled tick
    ///
    /// A tick arriving after the engine stopped is a no-op. If the `enabled`
    /// parameter turned off, the engine stops without touching the channels.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status == EngineStatus::Stopped {
            return TickOutcome::Idle;
        }

        let config = self.resolve_config();
        if !config.enabled {
            log_info!(self.identity.name(), "disabled, stopping");
            self.stop();
            return TickOutcome::Stopped;
        }

        let report = self.advance(&config);

        if self.armed_interval != Some(config.trigger_interval) {
            log_debug!(
                config.debug,
                self.identity.name(),
                "trigger interval changed to {} s",
                config.trigger_interval.as_secs()
            );
            self.disarm();
            self.arm(config.trigger_interval);
        }

        TickOutcome::Advanced(report)
    }

    /// Stop the engine
    ///
    /// Safe to call at any time and more than once: the schedule is
    /// cancelled exactly once. Channel values stay readable until the next
    /// start. Restoring the captured output state is best effort.
    pub fn stop(&mut self) {
        if self.status == EngineStatus::Stopped {
            return;
        }
        self.status = EngineStatus::Stopped;
        self.disarm();

        if let Some(snapshot) = self.snapshot.take() {
            if self.settings.restore_on_stop {
                if let Err(err) = self.actuator.restore_state(&snapshot) {
                    log_warn!(
                        self.identity.name(),
                        "restoring {} failed: {:?}",
                        self.identity.target(),
                        err
                    );
                }
            }
        }

        log_info!(self.identity.name(), "stopped");
    }

    fn resolve_config(&mut self) -> OscillatorConfig {
        let config = ConfigResolver::new(&self.sources, self.identity.name())
            .resolve_config(&self.settings);
        self.config = config;
        config
    }

    fn seed_channels(&mut self, config: &OscillatorConfig) {
        let snapshot = if config.start_from_current {
            self.snapshot
        } else {
            None
        };
        let start_value = config.start_value;

        self.oscillator.clear();
        self.oscillator
            .seed_mode(self.color_mode, config, |id| match snapshot {
                Some(snapshot) => snapshot.channel_value(id).unwrap_or(match id {
                    ChannelId::Brightness => SNAPSHOT_BRIGHTNESS_FALLBACK,
                    _ => start_value,
                }),
                None => start_value,
            });

        log_debug!(
            config.debug,
            self.identity.name(),
            "seeded {:?}",
            self.oscillator.values()
        );
    }

    fn advance(&mut self, config: &OscillatorConfig) -> TickReport {
        let before = self.oscillator.values();
        let mode = self.oscillator.advance(config);
        let values = self.oscillator.values();

        log_debug!(
            config.debug,
            self.identity.name(),
            "{:?} tick: {:?}, remaining steps to default {:?}",
            mode,
            values,
            self.oscillator.remaining_steps_to_default()
        );

        let applied = match self.actuator.apply_values(&values) {
            Ok(()) => true,
            Err(err) => {
                log_warn!(
                    self.identity.name(),
                    "applying values to {} failed: {:?}",
                    self.identity.target(),
                    err
                );
                false
            }
        };

        TickReport {
            mode,
            changed: values != before,
            applied,
        }
    }

    fn arm(&mut self, interval: Duration) {
        self.scheduler.schedule_every(interval);
        self.armed_interval = Some(interval);
    }

    fn disarm(&mut self) {
        if self.armed_interval.take().is_some() {
            self.scheduler.cancel();
        }
    }

    /// Lifecycle state
    pub const fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == EngineStatus::Running
    }

    /// Config resolved by the last start or tick
    pub const fn config(&self) -> &OscillatorConfig {
        &self.config
    }

    /// Color mode the channels were seeded for
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Current value of a channel
    pub fn value(&self, id: ChannelId) -> Option<u8> {
        self.oscillator.channel(id).map(|state| state.value)
    }

    /// Full state of a channel
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelState> {
        self.oscillator.channel(id)
    }

    /// Active `(min, max)` range of a channel
    pub fn active_range(&self, id: ChannelId) -> Option<(u8, u8)> {
        self.oscillator
            .channel(id)
            .map(|state| (state.active_min, state.active_max))
    }

    /// Current value of every channel
    pub fn values(&self) -> ChannelValues {
        self.oscillator.values()
    }

    /// Remaining ticks of the default transition
    pub const fn remaining_steps_to_default(&self) -> Option<u8> {
        self.oscillator.remaining_steps_to_default()
    }

    /// Output state captured at start, until it is restored
    pub const fn snapshot(&self) -> Option<&ActuatorSnapshot> {
        self.snapshot.as_ref()
    }

    /// Interval the scheduler is armed with
    pub const fn armed_interval(&self) -> Option<Duration> {
        self.armed_interval
    }

    pub const fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    pub const fn sources(&self) -> &L {
        &self.sources
    }

    pub const fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<L, A, R> OscillatorEngine<'_, L, A, IntervalTimer, R>
where
    L: SourceLookup,
    A: Actuator,
    R: RngCore,
{
    /// Tick if the interval timer is due
    ///
    /// Hosts without a timer of their own call this in a loop and sleep
    /// for the returned duration.
    pub fn poll(&mut self, now: Instant) -> EnginePoll {
        let timer = self.scheduler.poll(now);
        if !timer.due {
            return EnginePoll {
                outcome: None,
                sleep_duration: timer.sleep_duration,
            };
        }

        let outcome = self.tick();

        // Re-armed with a new interval, establish the new schedule
        let rearmed = self.scheduler.is_armed() && self.scheduler.next_tick().is_none();
        let sleep_duration = if rearmed {
            self.scheduler.poll(now).sleep_duration
        } else {
            timer.sleep_duration
        };

        EnginePoll {
            outcome: Some(outcome),
            sleep_duration,
        }
    }
}
