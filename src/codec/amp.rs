//! `SET_AMP_GAIN_MUTE` payload.
//!
//! - Bit 15: set output amp
//! - Bit 14: set input amp
//! - Bit 13: set left channel
//! - Bit 12: set right channel
//! - Bits 11:8: amp index (input connection)
//! - Bit 7: mute
//! - Bits 6:0: gain step

use crate::error::{AppResult, HdaError};

const AMP_SET_OUTPUT: u16 = 1 << 15;
const AMP_SET_INPUT: u16 = 1 << 14;
const AMP_SET_LEFT: u16 = 1 << 13;
const AMP_SET_RIGHT: u16 = 1 << 12;
const AMP_INDEX_SHIFT: u16 = 8;
const AMP_MUTE: u16 = 1 << 7;

/// Largest amp index (4 bits).
pub const MAX_AMP_INDEX: u8 = 0x0f;
/// Largest gain step (7 bits).
pub const MAX_AMP_GAIN: u8 = 0x7f;

/// Which amplifier of a widget to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmpDirection {
    /// Input amp.
    Input,
    /// Output amp.
    Output,
    /// Both amps.
    Both,
}

/// Which channels of a stereo amp to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmpChannels {
    /// Left only.
    Left,
    /// Right only.
    Right,
    /// Left and right.
    Both,
}

/// Builder for an amp gain/mute payload.
///
/// ```
/// use hda_fixup::codec::{AmpChannels, AmpDirection, AmpGainMute};
///
/// let payload = AmpGainMute::new(AmpDirection::Input, AmpChannels::Right)
///     .index(1)
///     .mute(true)
///     .payload()
///     .unwrap();
/// assert_eq!(payload, 0x5180);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmpGainMute {
    direction: AmpDirection,
    channels: AmpChannels,
    index: u8,
    mute: bool,
    gain: u8,
}

impl AmpGainMute {
    /// Unmuted, zero gain, index 0.
    pub fn new(direction: AmpDirection, channels: AmpChannels) -> Self {
        Self {
            direction,
            channels,
            index: 0,
            mute: false,
            gain: 0,
        }
    }

    /// Select the amp index (input connection number).
    pub fn index(mut self, index: u8) -> Self {
        self.index = index;
        self
    }

    /// Set the mute bit.
    pub fn mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    /// Set the gain step.
    pub fn gain(mut self, gain: u8) -> Self {
        self.gain = gain;
        self
    }

    /// Assemble the 16-bit payload.
    pub fn payload(&self) -> AppResult<u16> {
        if self.index > MAX_AMP_INDEX {
            return Err(HdaError::InvalidVerb(format!(
                "amp index {} exceeds {}",
                self.index, MAX_AMP_INDEX
            )));
        }
        if self.gain > MAX_AMP_GAIN {
            return Err(HdaError::InvalidVerb(format!(
                "amp gain {} exceeds {}",
                self.gain, MAX_AMP_GAIN
            )));
        }

        Ok(self.bits())
    }

    /// Assemble the payload, truncating index and gain to their fields.
    pub(crate) fn bits(&self) -> u16 {
        let mut bits = match self.direction {
            AmpDirection::Input => AMP_SET_INPUT,
            AmpDirection::Output => AMP_SET_OUTPUT,
            AmpDirection::Both => AMP_SET_INPUT | AMP_SET_OUTPUT,
        };
        bits |= match self.channels {
            AmpChannels::Left => AMP_SET_LEFT,
            AmpChannels::Right => AMP_SET_RIGHT,
            AmpChannels::Both => AMP_SET_LEFT | AMP_SET_RIGHT,
        };
        bits |= u16::from(self.index & MAX_AMP_INDEX) << AMP_INDEX_SHIFT;
        if self.mute {
            bits |= AMP_MUTE;
        }
        bits | u16::from(self.gain & MAX_AMP_GAIN)
    }
}
