//! Raw ABI definitions for the ALSA HD-audio hwdep interface.
//!
//! Mirrors `include/uapi/sound/asound.h` (`snd_hwdep_info`) and
//! `sound/pci/hda/hda_hwdep.c` (`hda_verb_ioctl` and the `HDA_IOCTL_*` codes).
//! Request codes use the generic Linux `_IOC` layout (x86, ARM, RISC-V).
//!
//! No safe wrappers live here; see `hda_fixup::hardware::hwdep`.

#![allow(non_camel_case_types)]

use libc::{c_int, c_uchar, c_uint};

// =============================================================================
// _IOC encoding
// =============================================================================

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// `_IOR(ty, nr, T)`
pub const fn ior<T>(ty: u8, nr: u8) -> u32 {
    ioc(IOC_READ, ty, nr, core::mem::size_of::<T>())
}

/// `_IOWR(ty, nr, T)`
pub const fn iowr<T>(ty: u8, nr: u8) -> u32 {
    ioc(IOC_READ | IOC_WRITE, ty, nr, core::mem::size_of::<T>())
}

// =============================================================================
// Structures
// =============================================================================

/// `struct snd_hwdep_info`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct snd_hwdep_info {
    /// WR: device number
    pub device: c_uint,
    /// R: card number
    pub card: c_int,
    /// ID (user selectable)
    pub id: [c_uchar; 64],
    /// hwdep name
    pub name: [c_uchar; 80],
    /// hwdep interface
    pub iface: c_int,
    /// reserved for future
    pub reserved: [c_uchar; 64],
}

impl Default for snd_hwdep_info {
    fn default() -> Self {
        Self {
            device: 0,
            card: 0,
            id: [0; 64],
            name: [0; 80],
            iface: 0,
            reserved: [0; 64],
        }
    }
}

/// `struct hda_verb_ioctl`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct hda_verb_ioctl {
    /// HDA_VERB() packed `nid << 24 | verb << 8 | param`
    pub verb: u32,
    /// response, filled in by the kernel
    pub res: u32,
}

// =============================================================================
// Constants
// =============================================================================

/// ioctl type byte shared by all hwdep requests.
pub const SNDRV_HWDEP_IOCTL_MAGIC: u8 = b'H';

/// `SNDRV_HWDEP_IFACE_HDA`
pub const SNDRV_HWDEP_IFACE_HDA: c_int = 16;

/// Protocol version implemented by current kernels (1.0.0).
pub const HDA_HWDEP_VERSION: u32 = 1 << 16;

/// `SNDRV_HWDEP_IOCTL_INFO`
pub const SNDRV_HWDEP_IOCTL_INFO: u32 = ior::<snd_hwdep_info>(SNDRV_HWDEP_IOCTL_MAGIC, 0x01);

/// `HDA_IOCTL_PVERSION`
pub const HDA_IOCTL_PVERSION: u32 = ior::<c_int>(SNDRV_HWDEP_IOCTL_MAGIC, 0x10);

/// `HDA_IOCTL_VERB_WRITE`
pub const HDA_IOCTL_VERB_WRITE: u32 = iowr::<hda_verb_ioctl>(SNDRV_HWDEP_IOCTL_MAGIC, 0x11);
