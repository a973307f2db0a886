//! Actuation side of the engine
//!
//! The engine hands the full channel map to an [`Actuator`] once per tick.
//! Actuators may also capture the state of the driven output before the
//! engine starts and restore it when the engine stops.

use core::convert::Infallible;

use crate::OutputDriver;
use crate::channel::{ChannelId, ChannelValues, ColorMode};
use crate::color::{BLACK, Rgb, gray};

/// State of the driven output captured before the engine starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorSnapshot {
    /// Whether the output was switched on
    pub is_on: bool,
    /// Brightness, if the output reports one
    pub brightness: Option<u8>,
    /// Color, if the output reports one
    pub color: Option<Rgb>,
    /// White component of RGBW outputs
    pub white: Option<u8>,
}

impl ActuatorSnapshot {
    /// Snapshot of a switched off output
    pub const fn off() -> Self {
        Self {
            is_on: false,
            brightness: None,
            color: None,
            white: None,
        }
    }

    /// Value the snapshot holds for a channel
    pub fn channel_value(&self, id: ChannelId) -> Option<u8> {
        match id {
            ChannelId::Brightness => self.brightness,
            ChannelId::Red => self.color.map(|color| color.r),
            ChannelId::Green => self.color.map(|color| color.g),
            ChannelId::Blue => self.color.map(|color| color.b),
            ChannelId::White => self.white,
        }
    }
}

/// Sink for channel values
///
/// Implement this trait to drive a real device. Failures are reported back
/// to the engine, which logs them and keeps running.
pub trait Actuator {
    type Error: core::fmt::Debug;

    /// Color mode of the driven output
    fn color_mode(&self) -> ColorMode {
        ColorMode::Brightness
    }

    /// Write the current channel values
    fn apply_values(&mut self, values: &ChannelValues) -> Result<(), Self::Error>;

    /// Capture the current output state, `None` if it is not known
    fn capture_state(&mut self) -> Option<ActuatorSnapshot> {
        None
    }

    /// Bring the output back to a captured state
    fn restore_state(&mut self, _snapshot: &ActuatorSnapshot) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Actuator filling an LED strip of `N` pixels with one color
///
/// Brightness mode renders a gray level, RGB(W) modes render the color.
/// The white component has no counterpart on RGB strips and is dropped.
pub struct StripActuator<D: OutputDriver, const N: usize> {
    driver: D,
    mode: ColorMode,
    frame: [Rgb; N],
    state: ActuatorSnapshot,
}

impl<D: OutputDriver, const N: usize> StripActuator<D, N> {
    /// Create a new strip actuator, the strip is assumed to be off
    pub const fn new(driver: D, mode: ColorMode) -> Self {
        Self {
            driver,
            mode,
            frame: [BLACK; N],
            state: ActuatorSnapshot::off(),
        }
    }

    /// Get a reference to the driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Last written state
    pub const fn state(&self) -> &ActuatorSnapshot {
        &self.state
    }

    fn fill(&mut self, color: Rgb) {
        for led in &mut self.frame {
            *led = color;
        }
        self.driver.write(&self.frame);
    }
}

impl<D: OutputDriver, const N: usize> Actuator for StripActuator<D, N> {
    type Error = Infallible;

    fn color_mode(&self) -> ColorMode {
        self.mode
    }

    fn apply_values(&mut self, values: &ChannelValues) -> Result<(), Self::Error> {
        let channel = |id: ChannelId| values.get(&id).copied().unwrap_or(0);
        let color = match self.mode {
            ColorMode::Brightness => {
                let level = channel(ChannelId::Brightness);
                self.state.brightness = Some(level);
                gray(level)
            }
            ColorMode::Rgb | ColorMode::Rgbw => {
                let color = Rgb::new(
                    channel(ChannelId::Red),
                    channel(ChannelId::Green),
                    channel(ChannelId::Blue),
                );
                self.state.color = Some(color);
                if self.mode == ColorMode::Rgbw {
                    self.state.white = Some(channel(ChannelId::White));
                }
                color
            }
        };
        self.state.is_on = true;
        self.fill(color);
        Ok(())
    }

    fn capture_state(&mut self) -> Option<ActuatorSnapshot> {
        Some(self.state)
    }

    fn restore_state(&mut self, snapshot: &ActuatorSnapshot) -> Result<(), Self::Error> {
        let color = if snapshot.is_on {
            match (snapshot.color, snapshot.brightness) {
                (Some(color), _) => color,
                (None, Some(level)) => gray(level),
                (None, None) => BLACK,
            }
        } else {
            BLACK
        };
        self.state = *snapshot;
        self.fill(color);
        Ok(())
    }
}
