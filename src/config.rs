//! Oscillator parameters and their sources
//!
//! Every tunable value is described by a [`Parameter`]. The host tells the
//! engine where to look for it through [`OscillatorSettings`]: an optional
//! external source, an optional internal (manually set) source and a hard
//! default. The resolver turns these into an [`OscillatorConfig`] snapshot
//! once per tick.

use embassy_time::Duration;

use crate::channel::WhiteChannelPolicy;

pub const VALUE_MIN: u8 = 0;
pub const VALUE_MAX: u8 = 255;
pub const STEP_MIN: u8 = 1;
pub const STEP_MAX: u8 = 25;
pub const STEPS_TO_DEFAULT_MIN: u8 = 1;
pub const STEPS_TO_DEFAULT_MAX: u8 = 100;
pub const TRIGGER_INTERVAL_MIN_SECS: u16 = 1;
pub const TRIGGER_INTERVAL_MAX_SECS: u16 = 300;

const PARAMETER_NAME_ENABLED: &str = "enabled";
const PARAMETER_NAME_START_VALUE: &str = "start_value";
const PARAMETER_NAME_MIN_VALUE: &str = "min_value";
const PARAMETER_NAME_MAX_VALUE: &str = "max_value";
const PARAMETER_NAME_STEP: &str = "step";
const PARAMETER_NAME_TRIGGER_INTERVAL: &str = "trigger_interval";
const PARAMETER_NAME_RANDOM_LIMITS: &str = "random_limits";
const PARAMETER_NAME_DEFAULT_MODE_ENABLED: &str = "default_mode_enabled";
const PARAMETER_NAME_DEFAULT_VALUE: &str = "default_value";
const PARAMETER_NAME_STEPS_TO_DEFAULT: &str = "steps_to_default";
const PARAMETER_NAME_START_FROM_CURRENT: &str = "start_from_current";
const PARAMETER_NAME_DEBUG: &str = "debug";

/// Tunable oscillator parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Parameter {
    Enabled = 0,
    StartValue = 1,
    MinValue = 2,
    MaxValue = 3,
    Step = 4,
    TriggerInterval = 5,
    RandomLimits = 6,
    DefaultModeEnabled = 7,
    DefaultValue = 8,
    StepsToDefault = 9,
    StartFromCurrent = 10,
    Debug = 11,
}

impl Parameter {
    pub const COUNT: usize = 12;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Enabled,
        Self::StartValue,
        Self::MinValue,
        Self::MaxValue,
        Self::Step,
        Self::TriggerInterval,
        Self::RandomLimits,
        Self::DefaultModeEnabled,
        Self::DefaultValue,
        Self::StepsToDefault,
        Self::StartFromCurrent,
        Self::Debug,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => PARAMETER_NAME_ENABLED,
            Self::StartValue => PARAMETER_NAME_START_VALUE,
            Self::MinValue => PARAMETER_NAME_MIN_VALUE,
            Self::MaxValue => PARAMETER_NAME_MAX_VALUE,
            Self::Step => PARAMETER_NAME_STEP,
            Self::TriggerInterval => PARAMETER_NAME_TRIGGER_INTERVAL,
            Self::RandomLimits => PARAMETER_NAME_RANDOM_LIMITS,
            Self::DefaultModeEnabled => PARAMETER_NAME_DEFAULT_MODE_ENABLED,
            Self::DefaultValue => PARAMETER_NAME_DEFAULT_VALUE,
            Self::StepsToDefault => PARAMETER_NAME_STEPS_TO_DEFAULT,
            Self::StartFromCurrent => PARAMETER_NAME_START_FROM_CURRENT,
            Self::Debug => PARAMETER_NAME_DEBUG,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|parameter| parameter.as_str() == s)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Where a parameter is looked up before falling back to its hard default
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParameterSource<'a> {
    /// Tier 1: externally controlled source id
    pub external: Option<&'a str>,
    /// Tier 2: internal manual value source id
    pub internal: Option<&'a str>,
}

/// Tier 3 values, used when neither source is available
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct HardDefaults {
    pub enabled: bool,
    pub start_value: u8,
    pub min_value: u8,
    pub max_value: u8,
    pub step: u8,
    pub trigger_interval_secs: u16,
    pub random_limits: bool,
    pub default_mode_enabled: bool,
    pub default_value: u8,
    pub steps_to_default: u8,
    pub start_from_current: bool,
    pub debug: bool,
}

impl HardDefaults {
    pub const fn new() -> Self {
        Self {
            enabled: true,
            start_value: 125,
            min_value: VALUE_MIN,
            max_value: VALUE_MAX,
            step: 3,
            trigger_interval_secs: 2,
            random_limits: false,
            default_mode_enabled: false,
            default_value: 0,
            steps_to_default: 3,
            start_from_current: false,
            debug: false,
        }
    }
}

impl Default for HardDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Static engine settings: parameter sources, hard defaults and policies
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OscillatorSettings<'a> {
    sources: [ParameterSource<'a>; Parameter::COUNT],
    pub defaults: HardDefaults,
    pub white_policy: WhiteChannelPolicy,
    /// Restore the captured output state when the engine stops
    pub restore_on_stop: bool,
}

impl<'a> OscillatorSettings<'a> {
    pub const fn new() -> Self {
        Self {
            sources: [ParameterSource {
                external: None,
                internal: None,
            }; Parameter::COUNT],
            defaults: HardDefaults::new(),
            white_policy: WhiteChannelPolicy::ForceOff,
            restore_on_stop: true,
        }
    }

    /// Set the external (tier 1) source of a parameter
    #[must_use]
    pub fn with_external(mut self, parameter: Parameter, source: &'a str) -> Self {
        self.sources[parameter.index()].external = Some(source);
        self
    }

    /// Set the internal (tier 2) source of a parameter
    #[must_use]
    pub fn with_internal(mut self, parameter: Parameter, source: &'a str) -> Self {
        self.sources[parameter.index()].internal = Some(source);
        self
    }

    /// Replace the hard defaults
    #[must_use]
    pub fn with_defaults(mut self, defaults: HardDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the white channel policy
    #[must_use]
    pub fn with_white_policy(mut self, policy: WhiteChannelPolicy) -> Self {
        self.white_policy = policy;
        self
    }

    /// Enable or disable restoring the captured output state on stop
    #[must_use]
    pub fn with_restore_on_stop(mut self, restore: bool) -> Self {
        self.restore_on_stop = restore;
        self
    }

    /// Get the sources of a parameter
    pub const fn source(&self, parameter: Parameter) -> ParameterSource<'a> {
        self.sources[parameter.index()]
    }
}

impl Default for OscillatorSettings<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved and normalized parameters for one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct OscillatorConfig {
    pub enabled: bool,
    pub start_value: u8,
    /// Configured lower boundary, `min <= max`
    pub min: u8,
    /// Configured upper boundary
    pub max: u8,
    /// Step per tick, within `[1, 25]`
    pub step: u8,
    pub trigger_interval: Duration,
    pub random_limits: bool,
    pub default_mode_enabled: bool,
    pub default_value: u8,
    /// Ticks of a full default transition, within `[1, 100]`
    pub steps_to_default: u8,
    pub start_from_current: bool,
    pub debug: bool,
}

impl OscillatorConfig {
    /// Build a config from raw values, applying range normalization
    ///
    /// Values are clamped to their ranges and `min`/`max` are swapped when
    /// given out of order.
    pub fn normalized(raw: RawParameters) -> Self {
        let mut min = clamp_value(raw.min);
        let mut max = clamp_value(raw.max);
        if min > max {
            core::mem::swap(&mut min, &mut max);
        }

        Self {
            enabled: raw.enabled,
            start_value: clamp_value(raw.start_value),
            min,
            max,
            step: clamp_to(raw.step, STEP_MIN, STEP_MAX),
            trigger_interval: Duration::from_secs(clamp_interval_secs(raw.trigger_interval_secs)),
            random_limits: raw.random_limits,
            default_mode_enabled: raw.default_mode_enabled,
            default_value: clamp_value(raw.default_value),
            steps_to_default: clamp_to(
                raw.steps_to_default,
                STEPS_TO_DEFAULT_MIN,
                STEPS_TO_DEFAULT_MAX,
            ),
            start_from_current: raw.start_from_current,
            debug: raw.debug,
        }
    }

    /// Whether `min`/`max` had to be swapped for the given raw bounds
    pub fn bounds_swapped(raw_min: i32, raw_max: i32) -> bool {
        clamp_value(raw_min) > clamp_value(raw_max)
    }
}

impl From<HardDefaults> for OscillatorConfig {
    fn from(defaults: HardDefaults) -> Self {
        Self::normalized(RawParameters::from(defaults))
    }
}

/// Parameters as resolved from their sources, before normalization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RawParameters {
    pub enabled: bool,
    pub start_value: i32,
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub trigger_interval_secs: i32,
    pub random_limits: bool,
    pub default_mode_enabled: bool,
    pub default_value: i32,
    pub steps_to_default: i32,
    pub start_from_current: bool,
    pub debug: bool,
}

impl From<HardDefaults> for RawParameters {
    fn from(defaults: HardDefaults) -> Self {
        Self {
            enabled: defaults.enabled,
            start_value: i32::from(defaults.start_value),
            min: i32::from(defaults.min_value),
            max: i32::from(defaults.max_value),
            step: i32::from(defaults.step),
            trigger_interval_secs: i32::from(defaults.trigger_interval_secs),
            random_limits: defaults.random_limits,
            default_mode_enabled: defaults.default_mode_enabled,
            default_value: i32::from(defaults.default_value),
            steps_to_default: i32::from(defaults.steps_to_default),
            start_from_current: defaults.start_from_current,
            debug: defaults.debug,
        }
    }
}

fn clamp_value(value: i32) -> u8 {
    clamp_to(value, VALUE_MIN, VALUE_MAX)
}

#[allow(clippy::cast_sign_loss)]
fn clamp_interval_secs(secs: i32) -> u64 {
    secs.clamp(
        i32::from(TRIGGER_INTERVAL_MIN_SECS),
        i32::from(TRIGGER_INTERVAL_MAX_SECS),
    ) as u64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to(value: i32, min: u8, max: u8) -> u8 {
    value.clamp(i32::from(min), i32::from(max)) as u8
}
