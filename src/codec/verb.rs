//! Verb command words.
//!
//! `HDA_IOCTL_VERB_WRITE` takes a single 32-bit word:
//!
//! ```text
//!  31      24 23                 8 7       0
//! +----------+--------------------+---------+
//! |   nid    |        verb        |  param  |
//! +----------+--------------------+---------+
//! ```
//!
//! The kernel re-splits bits 19:0 into the codec's verb/payload field, so a
//! 4-bit verb such as `SET_AMP_GAIN_MUTE` is written as `0x300` with a 16-bit
//! payload OR-ed underneath it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, HdaError};

/// Highest addressable node id (7 bits).
pub const MAX_NODE_ID: u8 = 0x7f;

/// Mask of the combined verb + payload field.
pub const VERB_PAYLOAD_MASK: u32 = 0x000F_FFFF;

/// `AC_VERB_SET_AMP_GAIN_MUTE`
pub const AC_VERB_SET_AMP_GAIN_MUTE: u16 = 0x300;

/// One command addressed to a codec node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbCommand {
    /// Target node id.
    pub nid: u8,
    /// Verb id, pre-shifted for 4-bit verbs (e.g. `0x300`).
    pub verb: u16,
    /// Parameter or payload.
    pub param: u16,
}

impl VerbCommand {
    /// Create a command. Nothing is checked until [`VerbCommand::encode`].
    pub const fn new(nid: u8, verb: u16, param: u16) -> Self {
        Self { nid, verb, param }
    }

    /// `SET_AMP_GAIN_MUTE` on `nid` with the given 16-bit payload.
    pub const fn set_amp_gain_mute(nid: u8, payload: u16) -> Self {
        Self::new(nid, AC_VERB_SET_AMP_GAIN_MUTE, payload)
    }

    /// Pack into the ioctl word, rejecting fields the kernel would refuse.
    pub fn encode(&self) -> AppResult<u32> {
        if self.nid > MAX_NODE_ID {
            return Err(HdaError::InvalidVerb(format!(
                "node id {:#04x} exceeds {:#04x}",
                self.nid, MAX_NODE_ID
            )));
        }

        let body = (u32::from(self.verb) << 8) | u32::from(self.param);
        if body > VERB_PAYLOAD_MASK {
            return Err(HdaError::InvalidVerb(format!(
                "verb {:#05x} with param {:#06x} does not fit the 20-bit verb field",
                self.verb, self.param
            )));
        }

        Ok((u32::from(self.nid) << 24) | body)
    }
}

impl fmt::Display for VerbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nid={:#04x} verb={:#05x} param={:#06x}",
            self.nid, self.verb, self.param
        )
    }
}

/// Node id of a packed word.
pub fn word_nid(word: u32) -> u8 {
    // top byte, always fits
    (word >> 24) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_amp_mute_words() {
        let right = VerbCommand::new(0x0c, 0x300, 0x5180);
        let left = VerbCommand::new(0x0c, 0x300, 0x6180);
        assert_eq!(right.encode().unwrap(), 0x0c03_5180);
        assert_eq!(left.encode().unwrap(), 0x0c03_6180);
    }

    #[test]
    fn test_set_amp_gain_mute_constructor() {
        let cmd = VerbCommand::set_amp_gain_mute(0x0c, 0x5180);
        assert_eq!(cmd, VerbCommand::new(0x0c, 0x300, 0x5180));
    }

    #[test]
    fn test_encode_twelve_bit_verb() {
        // 12-bit verb (GET_AMP_GAIN_MUTE) with an 8-bit parameter
        let cmd = VerbCommand::new(0x02, 0xb00, 0x80);
        assert_eq!(cmd.encode().unwrap(), 0x020b_0080);
    }

    #[test]
    fn test_node_id_out_of_range() {
        let err = VerbCommand::new(0x80, 0x300, 0x5180).encode().unwrap_err();
        assert!(matches!(err, HdaError::InvalidVerb(_)));
    }

    #[test]
    fn test_verb_overflows_field() {
        let err = VerbCommand::new(0x0c, 0x1000, 0).encode().unwrap_err();
        assert!(err.to_string().contains("20-bit"));
    }

    #[test]
    fn test_word_nid() {
        assert_eq!(word_nid(0x0c03_5180), 0x0c);
    }

    #[test]
    fn test_display() {
        let cmd = VerbCommand::new(0x0c, 0x300, 0x5180);
        assert_eq!(cmd.to_string(), "nid=0x0c verb=0x300 param=0x5180");
    }
}
