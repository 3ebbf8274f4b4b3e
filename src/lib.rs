//! One-shot HD-audio codec fixup over the ALSA hwdep interface.
//!
//! Opens a codec's hwdep node, checks that it is an HD-audio codec speaking a
//! supported protocol, and writes a short list of verbs. By default that list
//! is the white-noise fix: mute input amp index 1 of node `0x0c` on both
//! channels.
//!
//! Hardware access goes through the traits in [`hardware::capabilities`], so
//! the sequence in [`fixup`] runs unchanged against [`hardware::MockCodec`].
//!
//! # Example
//!
//! ```
//! use hda_fixup::config::FixupConfig;
//! use hda_fixup::fixup::CodecFixup;
//! use hda_fixup::hardware::MockCodec;
//!
//! let codec = MockCodec::new();
//! let fixup = CodecFixup::new(&FixupConfig::default()).unwrap();
//! let report = fixup.run(&codec).unwrap();
//!
//! assert_eq!(codec.written_words(), vec![0x0c03_5180, 0x0c03_6180]);
//! assert_eq!(report.verbs.len(), 2);
//! assert!(codec.is_released());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod fixup;
pub mod hardware;
pub mod logging;

pub use config::FixupConfig;
pub use error::{AppResult, HdaError};
pub use fixup::{CodecFixup, FixupReport};
