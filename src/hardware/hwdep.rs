//! Linux hwdep device backed by `ioctl(2)`.
//!
//! Opens `/dev/snd/hwC<card>D<device>` read-only and issues the three control
//! requests of the HD-audio hwdep protocol. The file descriptor is closed when
//! the [`HwdepDevice`] is dropped.

#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use hda_hwdep_sys::{
    hda_verb_ioctl, snd_hwdep_info, HDA_IOCTL_PVERSION, HDA_IOCTL_VERB_WRITE,
    SNDRV_HWDEP_IOCTL_INFO,
};
use tracing::{debug, trace};

use crate::error::{AppResult, HdaError};
use crate::hardware::capabilities::{
    HwdepIdentity, IdentityQuery, ProtocolVersion, SessionOpener, VerbWriter, VersionQuery,
};

/// Opens real hwdep device nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HwdepOpener;

impl SessionOpener for HwdepOpener {
    type Session = HwdepDevice;

    fn open(&self, path: &Path) -> AppResult<HwdepDevice> {
        HwdepDevice::open(path)
    }
}

/// An open hwdep device node.
#[derive(Debug)]
pub struct HwdepDevice {
    file: File,
    path: PathBuf,
}

impl HwdepDevice {
    /// Open `path` for read access.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).open(&path)?;
        debug!(device = %path.display(), fd = file.as_raw_fd(), "hwdep device opened");
        Ok(Self { file, path })
    }

    /// Path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Issue `request` with `arg` as the in/out buffer.
    ///
    /// `T` must be the exact `#[repr(C)]` layout encoded in `request`.
    fn ioctl<T>(&self, name: &'static str, request: u32, arg: &mut T) -> AppResult<()> {
        trace!(request = name, code = %format!("{request:#010x}"), "ioctl");
        // SAFETY: the fd is owned by `self.file` and open for the duration of the
        // call. `arg` is a live, exclusively borrowed `#[repr(C)]` value whose
        // size matches the size field of `request`, so the kernel reads and
        // writes only within it.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg as *mut T) };
        if rc < 0 {
            return Err(HdaError::Ioctl {
                request: name,
                source: std::io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

impl IdentityQuery for HwdepDevice {
    fn identity(&mut self) -> AppResult<HwdepIdentity> {
        let mut info = snd_hwdep_info::default();
        self.ioctl("SNDRV_HWDEP_IOCTL_INFO", SNDRV_HWDEP_IOCTL_INFO, &mut info)?;
        Ok(HwdepIdentity::from(&info))
    }
}

impl VersionQuery for HwdepDevice {
    fn protocol_version(&mut self) -> AppResult<ProtocolVersion> {
        let mut version: libc::c_int = 0;
        self.ioctl("HDA_IOCTL_PVERSION", HDA_IOCTL_PVERSION, &mut version)?;
        // the kernel writes an unsigned version into an int slot
        Ok(ProtocolVersion::from_raw(version as u32))
    }
}

impl VerbWriter for HwdepDevice {
    fn write_verb(&mut self, word: u32) -> AppResult<u32> {
        let mut verb = hda_verb_ioctl { verb: word, res: 0 };
        self.ioctl("HDA_IOCTL_VERB_WRITE", HDA_IOCTL_VERB_WRITE, &mut verb)?;
        Ok(verb.res)
    }
}

impl Drop for HwdepDevice {
    fn drop(&mut self) {
        debug!(device = %self.path.display(), "hwdep device closed");
    }
}
