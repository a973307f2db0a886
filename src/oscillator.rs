//! Bounded channel oscillator
//!
//! Every channel bounces between the boundaries of its active range,
//! advancing by `step` per tick and reversing direction when a boundary is
//! reached. On every bounce the opposite boundary is recomputed: the
//! configured one, or a random one when random limits are enabled.
//!
//! In default mode the channels instead approach the default value,
//! closing `1 / remaining_steps` of the gap per tick so that the default
//! is reached exactly after `steps_to_default` ticks.

use rand::{Rng, RngCore};

use crate::channel::{
    ChannelId, ChannelSet, ChannelState, ChannelValues, ColorMode, WhiteChannelPolicy,
};
use crate::config::OscillatorConfig;
use crate::math8::{approach8, step_down8, step_up8};

/// Which algorithm a tick ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Channels bounced inside their active ranges
    Bounce,
    /// Channels approached the default value
    DefaultTransition,
}

/// Per-channel oscillation state machine
#[derive(Debug, Clone)]
pub struct ChannelOscillator<R: RngCore> {
    channels: ChannelSet,
    /// Shared counter of the default transition, `None` until first used
    remaining_steps_to_default: Option<u8>,
    white_policy: WhiteChannelPolicy,
    rng: R,
}

impl<R: RngCore> ChannelOscillator<R> {
    /// Create an oscillator without channels
    pub const fn new(rng: R, white_policy: WhiteChannelPolicy) -> Self {
        Self {
            channels: ChannelSet::new(),
            remaining_steps_to_default: None,
            white_policy,
            rng,
        }
    }

    /// Seed a channel inside the full configured range, counting up
    pub fn seed(
        &mut self,
        id: ChannelId,
        value: u8,
        config: &OscillatorConfig,
    ) -> Result<(), ChannelState> {
        self.channels
            .insert(id, ChannelState::new(value, config.min, config.max))
    }

    /// Seed every channel of a color mode
    pub fn seed_mode(
        &mut self,
        mode: ColorMode,
        config: &OscillatorConfig,
        mut initial_value: impl FnMut(ChannelId) -> u8,
    ) {
        self.channels.clear();
        for &id in mode.channels() {
            // Color modes never exceed the channel capacity
            let _ = self.seed(id, initial_value(id), config);
        }
    }

    /// Drop all channel state
    pub fn clear(&mut self) {
        self.channels.clear();
        self.remaining_steps_to_default = None;
    }

    /// Advance every channel by one tick
    pub fn advance(&mut self, config: &OscillatorConfig) -> TickMode {
        let mode = if config.default_mode_enabled {
            self.advance_to_default(config);
            TickMode::DefaultTransition
        } else {
            self.remaining_steps_to_default = Some(config.steps_to_default);
            self.advance_bounce(config);
            TickMode::Bounce
        };

        if self.white_policy == WhiteChannelPolicy::ForceOff {
            if let Some(white) = self.channels.get_mut(ChannelId::White) {
                white.value = 0;
            }
        }

        mode
    }

    fn advance_to_default(&mut self, config: &OscillatorConfig) {
        let remaining = match self.remaining_steps_to_default {
            None | Some(0) => config.steps_to_default.max(1),
            Some(remaining) => remaining,
        };

        for (_, state) in self.channels.iter_mut() {
            state.value = approach8(state.value, config.default_value, remaining);
        }

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            for (_, state) in self.channels.iter_mut() {
                state.value = config.default_value;
            }
        }
        self.remaining_steps_to_default = Some(remaining);
    }

    fn advance_bounce(&mut self, config: &OscillatorConfig) {
        let skip_white = self.white_policy == WhiteChannelPolicy::ForceOff;
        for (id, state) in self.channels.iter_mut() {
            if skip_white && id == ChannelId::White {
                continue;
            }
            bounce(state, config, &mut self.rng);
        }
    }

    /// State of a channel
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelState> {
        self.channels.get(id)
    }

    /// All channel states
    pub const fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Current value of every channel
    pub fn values(&self) -> ChannelValues {
        self.channels.values()
    }

    /// Remaining ticks of the default transition
    pub const fn remaining_steps_to_default(&self) -> Option<u8> {
        self.remaining_steps_to_default
    }

    pub const fn white_policy(&self) -> WhiteChannelPolicy {
        self.white_policy
    }
}

/// Advance a single channel by one bounce step
///
/// Returns `true` if the channel reversed direction.
pub fn bounce<R: RngCore>(
    state: &mut ChannelState,
    config: &OscillatorConfig,
    rng: &mut R,
) -> bool {
    // Unnormalized configs may hold the bounds in either order
    let (min, max) = if config.min <= config.max {
        (config.min, config.max)
    } else {
        (config.max, config.min)
    };

    // Keep the active range inside the configured one
    state.active_min = state.active_min.clamp(min, max);
    state.active_max = state.active_max.clamp(state.active_min, max);

    if state.count_up {
        state.value = step_up8(state.value, config.step);
        if state.value < state.active_max {
            return false;
        }
        state.value = state.active_max;
        state.count_up = false;
        // New minimum is drawn below the boundary just hit
        state.active_min = if config.random_limits {
            rng.random_range(min..=state.active_max)
        } else {
            min
        };
    } else {
        state.value = step_down8(state.value, config.step);
        if state.value > state.active_min {
            return false;
        }
        state.value = state.active_min;
        state.count_up = true;
        state.active_max = if config.random_limits {
            rng.random_range(state.active_min..=max)
        } else {
            max
        };
    }
    true
}
