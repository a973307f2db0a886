#![no_std]

pub mod actuator;
pub mod channel;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod interval_timer;
mod log;
pub mod math8;
pub mod oscillator;
pub mod resolver;
pub mod source_store;

pub use actuator::{Actuator, ActuatorSnapshot, StripActuator};
pub use channel::{ChannelId, ChannelState, ChannelValues, ColorMode, WhiteChannelPolicy};
pub use config::{HardDefaults, OscillatorConfig, OscillatorSettings, Parameter, ParameterSource};
pub use engine::{EnginePoll, EngineStatus, OscillatorEngine, TickOutcome, TickReport};
pub use error::EngineError;
pub use identity::EngineIdentity;
pub use interval_timer::{IntervalTimer, TickScheduler, TimerPoll};
pub use oscillator::{ChannelOscillator, TickMode};
pub use resolver::{ConfigResolver, SourceError, SourceLookup, Tier};
pub use source_store::{SourceStore, StoreError};

pub use color::Rgb;
pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to support different hardware platforms.
/// [`StripActuator`] is generic over this trait.
pub trait OutputDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);
}
