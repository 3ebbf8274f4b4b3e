//! HD-audio codec command encoding.
//!
//! Pure data: nothing here touches a device.

pub mod amp;
pub mod verb;

pub use amp::{AmpChannels, AmpDirection, AmpGainMute};
pub use verb::{word_nid, VerbCommand, AC_VERB_SET_AMP_GAIN_MUTE};
