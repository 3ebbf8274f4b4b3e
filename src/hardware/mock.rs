//! Mock hwdep device for testing
//!
//! Simulates an HD-audio codec without physical hardware. It provides:
//! - Configurable identity name and protocol version
//! - Controllable failure injection (open, identity, verb write)
//! - Call logging and open/close accounting for test verification
//!
//! Clones of a [`MockCodec`] share state, so a test keeps one clone for
//! assertions while the fixup consumes another.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{AppResult, HdaError};
use crate::hardware::capabilities::{
    HwdepIdentity, IdentityQuery, ProtocolVersion, SessionOpener, VerbWriter, VersionQuery,
};

#[derive(Debug)]
struct MockCodecState {
    identity: HwdepIdentity,
    version: ProtocolVersion,
    fail_open: bool,
    fail_identity: bool,
    fail_write_at: Option<usize>,
    opens: usize,
    closes: usize,
    opened_paths: Vec<PathBuf>,
    written: Vec<u32>,
    call_log: Vec<String>,
}

/// Simulated codec and the opener that hands out sessions on it.
///
/// # Example
///
/// ```
/// use hda_fixup::hardware::{MockCodec, SessionOpener, VerbWriter};
/// use std::path::Path;
///
/// let codec = MockCodec::new();
/// {
///     let mut session = codec.open(Path::new("/dev/snd/hwC0D0")).unwrap();
///     session.write_verb(0x0c03_5180).unwrap();
/// }
/// assert_eq!(codec.written_words(), vec![0x0c03_5180]);
/// assert_eq!(codec.close_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockCodec {
    state: Arc<Mutex<MockCodecState>>,
}

impl Default for MockCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCodec {
    /// A codec named `"HDA Codec 0"` speaking protocol 1.0.0.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockCodecState {
                identity: HwdepIdentity::named("HDA Codec 0"),
                version: ProtocolVersion::from_raw(hda_hwdep_sys::HDA_HWDEP_VERSION),
                fail_open: false,
                fail_identity: false,
                fail_write_at: None,
                opens: 0,
                closes: 0,
                opened_paths: Vec::new(),
                written: Vec::new(),
                call_log: Vec::new(),
            })),
        }
    }

    /// Report `name` as the identity name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.state.lock().identity.name = name.into();
        self
    }

    /// Report `version` as the protocol version.
    pub fn with_version(self, version: ProtocolVersion) -> Self {
        self.state.lock().version = version;
        self
    }

    /// Make the next open fail with `ENOENT`.
    pub fn inject_open_failure(&self) {
        self.state.lock().fail_open = true;
    }

    /// Make the identity query fail with `ENOTTY`.
    pub fn inject_identity_failure(&self) {
        self.state.lock().fail_identity = true;
    }

    /// Make the verb write with zero-based position `index` fail with `EIO`.
    pub fn inject_write_failure_at(&self, index: usize) {
        self.state.lock().fail_write_at = Some(index);
    }

    /// Words accepted so far, in order.
    pub fn written_words(&self) -> Vec<u32> {
        self.state.lock().written.clone()
    }

    /// Number of successful opens.
    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    /// Number of sessions dropped.
    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    /// Whether every opened session has been closed.
    pub fn is_released(&self) -> bool {
        let state = self.state.lock();
        state.opens == state.closes
    }

    /// Paths passed to successful opens.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.state.lock().opened_paths.clone()
    }

    /// Get the call log
    pub fn call_log(&self) -> Vec<String> {
        self.state.lock().call_log.clone()
    }

    /// Clear the call log
    pub fn clear_log(&self) {
        self.state.lock().call_log.clear();
    }

    fn log_call(&self, call: String) {
        self.state.lock().call_log.push(call);
    }
}

impl SessionOpener for MockCodec {
    type Session = MockSession;

    fn open(&self, path: &Path) -> AppResult<MockSession> {
        self.log_call(format!("open: {}", path.display()));

        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_open) {
            return Err(HdaError::Io(std::io::Error::from_raw_os_error(
                libc::ENOENT,
            )));
        }
        state.opens += 1;
        state.opened_paths.push(path.to_path_buf());
        drop(state);

        debug!(device = %path.display(), "mock codec opened");
        Ok(MockSession {
            codec: self.clone(),
        })
    }
}

/// An open session on a [`MockCodec`]. Counts as closed once dropped.
#[derive(Debug)]
pub struct MockSession {
    codec: MockCodec,
}

impl IdentityQuery for MockSession {
    fn identity(&mut self) -> AppResult<HwdepIdentity> {
        self.codec.log_call("identity".to_string());
        let state = self.codec.state.lock();
        if state.fail_identity {
            return Err(HdaError::Ioctl {
                request: "SNDRV_HWDEP_IOCTL_INFO",
                source: std::io::Error::from_raw_os_error(libc::ENOTTY),
            });
        }
        Ok(state.identity.clone())
    }
}

impl VersionQuery for MockSession {
    fn protocol_version(&mut self) -> AppResult<ProtocolVersion> {
        self.codec.log_call("protocol_version".to_string());
        Ok(self.codec.state.lock().version)
    }
}

impl VerbWriter for MockSession {
    fn write_verb(&mut self, word: u32) -> AppResult<u32> {
        self.codec.log_call(format!("write_verb: {word:#010x}"));
        let mut state = self.codec.state.lock();
        if state.fail_write_at == Some(state.written.len()) {
            return Err(HdaError::Ioctl {
                request: "HDA_IOCTL_VERB_WRITE",
                source: std::io::Error::from_raw_os_error(libc::EIO),
            });
        }
        state.written.push(word);
        // SET verbs answer with an empty response
        Ok(0)
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.codec.log_call("close".to_string());
        self.codec.state.lock().closes += 1;
    }
}
