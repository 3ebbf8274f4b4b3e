//! Capability traits for an open hwdep session.
//!
//! Each control request the fixup needs is its own trait, so a backend only
//! has to provide what it can answer and tests can substitute any of them.
//! A session releases its handle when dropped.

use std::ffi::CStr;
use std::fmt;
use std::path::Path;

use hda_hwdep_sys::snd_hwdep_info;

use crate::error::AppResult;

// =============================================================================
// Device-reported values
// =============================================================================

/// Identity record returned by `SNDRV_HWDEP_IOCTL_INFO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwdepIdentity {
    /// Device number on the card.
    pub device: u32,
    /// Card number.
    pub card: i32,
    /// Short id string.
    pub id: String,
    /// Descriptive name, e.g. `"HDA Codec 0"`.
    pub name: String,
    /// `SNDRV_HWDEP_IFACE_*` value.
    pub iface: i32,
}

impl HwdepIdentity {
    /// Identity with only a name, as a simulated device would report.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            device: 0,
            card: 0,
            id: "HDA Codec".to_string(),
            name: name.into(),
            iface: hda_hwdep_sys::SNDRV_HWDEP_IFACE_HDA,
        }
    }

    /// Whether the descriptive name starts with `prefix`.
    pub fn matches_family(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

impl From<&snd_hwdep_info> for HwdepIdentity {
    fn from(raw: &snd_hwdep_info) -> Self {
        Self {
            device: raw.device,
            card: raw.card,
            id: fixed_c_string(&raw.id),
            name: fixed_c_string(&raw.name),
            iface: raw.iface,
        }
    }
}

/// Decode a NUL-terminated string stored in a fixed array.
fn fixed_c_string(bytes: &[u8]) -> String {
    match CStr::from_bytes_until_nul(bytes) {
        Ok(s) => s.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// hwdep protocol version, `major << 16 | minor << 8 | subminor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion(u32);

impl ProtocolVersion {
    /// Wrap a raw version word.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Build from components.
    pub const fn new(major: u16, minor: u8, subminor: u8) -> Self {
        Self(((major as u32) << 16) | ((minor as u32) << 8) | subminor as u32)
    }

    /// Raw version word.
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Major component.
    pub const fn major(&self) -> u32 {
        self.0 >> 16
    }

    /// Minor component.
    pub const fn minor(&self) -> u32 {
        (self.0 >> 8) & 0xff
    }

    /// Subminor component.
    pub const fn subminor(&self) -> u32 {
        self.0 & 0xff
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.subminor())
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Answers the device identity query.
pub trait IdentityQuery {
    /// Read the identity record.
    fn identity(&mut self) -> AppResult<HwdepIdentity>;
}

/// Answers the protocol version query.
pub trait VersionQuery {
    /// Read the protocol version.
    fn protocol_version(&mut self) -> AppResult<ProtocolVersion>;
}

/// Accepts verb writes.
pub trait VerbWriter {
    /// Send one packed verb word. Returns the codec response word.
    fn write_verb(&mut self, word: u32) -> AppResult<u32>;
}

/// Everything the fixup needs from an open device.
pub trait CodecSession: IdentityQuery + VersionQuery + VerbWriter {}

impl<T: IdentityQuery + VersionQuery + VerbWriter> CodecSession for T {}

/// Opens sessions on a device path.
pub trait SessionOpener {
    /// Session type handed out by this opener.
    type Session: CodecSession;

    /// Open `path` for exclusive use. Dropping the session closes it.
    fn open(&self, path: &Path) -> AppResult<Self::Session>;
}
