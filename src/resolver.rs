//! Tiered parameter resolution
//!
//! Each parameter is read from the first available of three tiers:
//!
//! 1. the external source, if configured and available
//! 2. the internal manual value source, if configured and available
//! 3. the hard default
//!
//! A source is available when it exists and its raw value is not a sentinel
//! state (`unavailable`, `unknown`, `none` or empty). A value that cannot be
//! converted to the expected type is treated like an unavailable source. No
//! failure ever leaves the resolver: the worst case is the hard default.

use heapless::String;
use thiserror::Error;

use crate::config::{
    OscillatorConfig, OscillatorSettings, Parameter, ParameterSource, RawParameters,
};
use crate::log::{log_debug, log_warn};

/// Maximum length of a raw source value
pub const RAW_VALUE_CAPACITY: usize = 32;

/// Raw (string) value of a source
pub type RawValue = String<RAW_VALUE_CAPACITY>;

const SENTINEL_STATES: [&str; 3] = ["unavailable", "unknown", "none"];
const TRUE_TOKENS: [&str; 3] = ["on", "true", "1"];

/// Read access to the host's value sources
pub trait SourceLookup {
    /// Get the raw value of a source, `None` if the source does not exist
    fn source_value(&self, source: &str) -> Option<RawValue>;
}

impl<T: SourceLookup + ?Sized> SourceLookup for &T {
    fn source_value(&self, source: &str) -> Option<RawValue> {
        (**self).source_value(source)
    }
}

/// Conversion from a raw source value
pub trait FromRaw: Sized {
    fn from_raw(raw: &str) -> Option<Self>;
}

impl FromRaw for bool {
    /// `on`, `true` and `1` (any case) are true, everything else is false
    fn from_raw(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Some(TRUE_TOKENS.iter().any(|token| raw.eq_ignore_ascii_case(token)))
    }
}

impl FromRaw for i32 {
    /// Decimal numbers are accepted and truncated toward zero
    #[allow(clippy::cast_possible_truncation)]
    fn from_raw(raw: &str) -> Option<Self> {
        let number = raw.trim().parse::<f64>().ok()?;
        if !number.is_finite() {
            return None;
        }
        // Saturates at the i32 range, later clamps bring it into bounds
        Some(libm::trunc(number) as i32)
    }
}

/// Why a tier could not provide a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source does not exist
    #[error("source does not exist")]
    Missing,
    /// The source exists but is in a sentinel state
    #[error("source is unavailable: {0}")]
    Unavailable(RawValue),
    /// The raw value cannot be converted to the expected type
    #[error("cannot convert {0:?}")]
    TypeMismatch(RawValue),
}

/// The tier a value was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    External,
    Internal,
    Default,
}

/// A resolved value and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub tier: Tier,
}

/// Whether a raw value is one of the sentinel states
pub fn is_sentinel(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || SENTINEL_STATES.iter().any(|state| raw.eq_ignore_ascii_case(state))
}

/// Read a single tier
pub fn read_source<T: FromRaw, L: SourceLookup + ?Sized>(
    lookup: &L,
    source: &str,
) -> Result<T, SourceError> {
    let raw = lookup.source_value(source).ok_or(SourceError::Missing)?;
    if is_sentinel(&raw) {
        return Err(SourceError::Unavailable(raw));
    }
    T::from_raw(&raw).ok_or(SourceError::TypeMismatch(raw))
}

/// Resolve a value through the three tiers
///
/// `on_fallback` is called for every configured tier that could not
/// provide a value.
pub fn resolve<T: FromRaw, L: SourceLookup + ?Sized>(
    lookup: &L,
    source: ParameterSource<'_>,
    hard_default: T,
    mut on_fallback: impl FnMut(Tier, &str, &SourceError),
) -> Resolved<T> {
    let tiers = [
        (Tier::External, source.external),
        (Tier::Internal, source.internal),
    ];
    for (tier, id) in tiers {
        let Some(id) = id else {
            continue;
        };
        match read_source(lookup, id) {
            Ok(value) => return Resolved { value, tier },
            Err(err) => on_fallback(tier, id, &err),
        }
    }

    Resolved {
        value: hard_default,
        tier: Tier::Default,
    }
}

/// Resolves the full parameter set of an engine
pub struct ConfigResolver<'r, L: SourceLookup + ?Sized> {
    lookup: &'r L,
    name: &'r str,
    verbose: bool,
}

impl<'r, L: SourceLookup + ?Sized> ConfigResolver<'r, L> {
    /// Create a resolver, `name` prefixes its log lines
    pub const fn new(lookup: &'r L, name: &'r str) -> Self {
        Self {
            lookup,
            name,
            verbose: false,
        }
    }

    /// Resolve a single parameter, logging every fallback
    pub fn resolve<T: FromRaw>(
        &self,
        parameter: Parameter,
        source: ParameterSource<'_>,
        hard_default: T,
    ) -> Resolved<T> {
        let name = self.name;
        let verbose = self.verbose;
        resolve(self.lookup, source, hard_default, |tier, id, err| match err {
            SourceError::TypeMismatch(raw) => {
                log_warn!(
                    name,
                    "{}: {:?} source '{}' holds unusable value {:?}, falling back",
                    parameter.as_str(),
                    tier,
                    id,
                    raw.as_str()
                );
            }
            SourceError::Missing | SourceError::Unavailable(_) => {
                log_debug!(
                    verbose,
                    name,
                    "{}: {:?} source '{}' not available ({}), falling back",
                    parameter.as_str(),
                    tier,
                    id,
                    err
                );
            }
        })
    }

    fn number(
        &self,
        settings: &OscillatorSettings<'_>,
        parameter: Parameter,
        fallback: i32,
    ) -> i32 {
        self.resolve(parameter, settings.source(parameter), fallback).value
    }

    fn flag(
        &self,
        settings: &OscillatorSettings<'_>,
        parameter: Parameter,
        fallback: bool,
    ) -> bool {
        self.resolve(parameter, settings.source(parameter), fallback).value
    }

    /// Resolve and normalize every parameter
    pub fn resolve_config(&mut self, settings: &OscillatorSettings<'_>) -> OscillatorConfig {
        let defaults = RawParameters::from(settings.defaults);

        // Debug first so the remaining fallbacks honour it
        let debug = self.flag(settings, Parameter::Debug, defaults.debug);
        self.verbose = debug;

        let raw = RawParameters {
            enabled: self.flag(settings, Parameter::Enabled, defaults.enabled),
            start_value: self.number(settings, Parameter::StartValue, defaults.start_value),
            min: self.number(settings, Parameter::MinValue, defaults.min),
            max: self.number(settings, Parameter::MaxValue, defaults.max),
            step: self.number(settings, Parameter::Step, defaults.step),
            trigger_interval_secs: self.number(
                settings,
                Parameter::TriggerInterval,
                defaults.trigger_interval_secs,
            ),
            random_limits: self.flag(settings, Parameter::RandomLimits, defaults.random_limits),
            default_mode_enabled: self.flag(
                settings,
                Parameter::DefaultModeEnabled,
                defaults.default_mode_enabled,
            ),
            default_value: self.number(settings, Parameter::DefaultValue, defaults.default_value),
            steps_to_default: self.number(
                settings,
                Parameter::StepsToDefault,
                defaults.steps_to_default,
            ),
            start_from_current: self.flag(
                settings,
                Parameter::StartFromCurrent,
                defaults.start_from_current,
            ),
            debug,
        };

        if OscillatorConfig::bounds_swapped(raw.min, raw.max) {
            log_warn!(
                self.name,
                "min ({}) is above max ({}), swapping",
                raw.min,
                raw.max
            );
        }

        OscillatorConfig::normalized(raw)
    }
}
