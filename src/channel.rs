//! Oscillating output channels
//!
//! A channel is one independently bouncing 8-bit output, e.g. the brightness
//! of a dimmable light or a single component of an RGB(W) color.

use heapless::{LinearMap, Vec};

/// Maximum number of channels a single engine drives (r, g, b, w)
pub const MAX_CHANNELS: usize = 4;

const CHANNEL_NAME_BRIGHTNESS: &str = "brightness";
const CHANNEL_NAME_RED: &str = "r";
const CHANNEL_NAME_GREEN: &str = "g";
const CHANNEL_NAME_BLUE: &str = "b";
const CHANNEL_NAME_WHITE: &str = "w";

const COLOR_MODE_NAME_BRIGHTNESS: &str = "brightness";
const COLOR_MODE_NAME_RGB: &str = "rgb";
const COLOR_MODE_NAME_RGBW: &str = "rgbw";

/// Known channel names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Brightness,
    Red,
    Green,
    Blue,
    White,
}

impl ChannelId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => CHANNEL_NAME_BRIGHTNESS,
            Self::Red => CHANNEL_NAME_RED,
            Self::Green => CHANNEL_NAME_GREEN,
            Self::Blue => CHANNEL_NAME_BLUE,
            Self::White => CHANNEL_NAME_WHITE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            CHANNEL_NAME_BRIGHTNESS => Some(Self::Brightness),
            CHANNEL_NAME_RED => Some(Self::Red),
            CHANNEL_NAME_GREEN => Some(Self::Green),
            CHANNEL_NAME_BLUE => Some(Self::Blue),
            CHANNEL_NAME_WHITE => Some(Self::White),
            _ => None,
        }
    }
}

/// Color mode of the driven light, selects the channel set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Single brightness channel
    #[default]
    Brightness,
    /// Red, green and blue channels
    Rgb,
    /// Red, green, blue and white channels
    Rgbw,
}

impl ColorMode {
    /// Pick the richest supported mode, falling back to brightness
    pub fn detect(supported_modes: &[&str]) -> Self {
        if supported_modes.contains(&COLOR_MODE_NAME_RGBW) {
            Self::Rgbw
        } else if supported_modes.contains(&COLOR_MODE_NAME_RGB) {
            Self::Rgb
        } else {
            Self::Brightness
        }
    }

    /// Channels driven in this mode
    pub const fn channels(self) -> &'static [ChannelId] {
        match self {
            Self::Brightness => &[ChannelId::Brightness],
            Self::Rgb => &[ChannelId::Red, ChannelId::Green, ChannelId::Blue],
            Self::Rgbw => &[
                ChannelId::Red,
                ChannelId::Green,
                ChannelId::Blue,
                ChannelId::White,
            ],
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => COLOR_MODE_NAME_BRIGHTNESS,
            Self::Rgb => COLOR_MODE_NAME_RGB,
            Self::Rgbw => COLOR_MODE_NAME_RGBW,
        }
    }
}

/// What happens to the white channel in RGBW mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhiteChannelPolicy {
    /// White is written as 0 on every tick
    #[default]
    ForceOff,
    /// White bounces like any other channel
    Oscillate,
}

/// Runtime state of a single channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelState {
    /// Current output value
    pub value: u8,
    /// Lower boundary of the current bounce range
    pub active_min: u8,
    /// Upper boundary of the current bounce range
    pub active_max: u8,
    /// Current direction, `true` while increasing
    pub count_up: bool,
}

impl ChannelState {
    /// Create a channel counting up inside the full configured range
    pub const fn new(value: u8, min: u8, max: u8) -> Self {
        Self {
            value,
            active_min: min,
            active_max: max,
            count_up: true,
        }
    }
}

/// Channel values handed to the actuator once per tick
pub type ChannelValues = LinearMap<ChannelId, u8, MAX_CHANNELS>;

/// Per-channel state owned by the oscillator
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    entries: Vec<(ChannelId, ChannelState), MAX_CHANNELS>,
}

impl ChannelSet {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace the state of a channel
    ///
    /// Returns the state back if the set is full.
    pub fn insert(&mut self, id: ChannelId, state: ChannelState) -> Result<(), ChannelState> {
        if let Some(existing) = self.get_mut(id) {
            *existing = state;
            return Ok(());
        }
        self.entries.push((id, state)).map_err(|(_, state)| state)
    }

    pub fn get(&self, id: ChannelId) -> Option<&ChannelState> {
        self.entries
            .iter()
            .find(|(channel, _)| *channel == id)
            .map(|(_, state)| state)
    }

    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut ChannelState> {
        self.entries
            .iter_mut()
            .find(|(channel, _)| *channel == id)
            .map(|(_, state)| state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &ChannelState)> {
        self.entries.iter().map(|(id, state)| (*id, state))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ChannelId, &mut ChannelState)> {
        self.entries.iter_mut().map(|(id, state)| (*id, state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current value of every channel
    pub fn values(&self) -> ChannelValues {
        let mut values = ChannelValues::new();
        for (id, state) in self.iter() {
            // Capacity matches the set, insertion cannot fail
            let _ = values.insert(id, state.value);
        }
        values
    }
}
