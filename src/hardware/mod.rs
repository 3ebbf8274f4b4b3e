//! Device-session backends.
//!
//! - `capabilities` - traits the fixup sequence is written against
//! - `hwdep` - real ALSA hwdep device (Linux only)
//! - `mock` - simulated codec for tests and dry runs

pub mod capabilities;
#[cfg(target_os = "linux")]
pub mod hwdep;
pub mod mock;

pub use capabilities::{
    CodecSession, HwdepIdentity, IdentityQuery, ProtocolVersion, SessionOpener, VerbWriter,
    VersionQuery,
};
#[cfg(target_os = "linux")]
pub use hwdep::{HwdepDevice, HwdepOpener};
pub use mock::{MockCodec, MockSession};
