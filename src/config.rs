//! Configuration using Figment
//!
//! Layers, lowest to highest precedence:
//! 1. Compiled-in defaults (the white-noise fix on `/dev/snd/hwC1D0`)
//! 2. Optional TOML file
//! 3. Environment variables prefixed with `HDA_FIXUP_`
//!
//! # Environment Variable Overrides
//!
//! Nested keys are separated by a double underscore:
//!
//! ```text
//! HDA_FIXUP_DEVICE__PATH=/dev/snd/hwC0D0
//! HDA_FIXUP_LOGGING__LEVEL=debug
//! HDA_FIXUP_DEVICE__MINIMUM_VERSION=0x00010000
//! ```
//!
//! `minimum_version` takes an integer or a string, decimal or `0x` hex.
//!
//! # Example
//!
//! ```no_run
//! use hda_fixup::config::FixupConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FixupConfig::load_from("config/hda_fixup.toml")?;
//!     println!("Device: {}", config.device.path.display());
//!     println!("Verbs: {}", config.verbs.len());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::codec::{AmpChannels, AmpDirection, AmpGainMute, VerbCommand};
use crate::error::{AppResult, HdaError};
use crate::hardware::ProtocolVersion;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "HDA_FIXUP_";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixupConfig {
    /// Target device and its acceptance checks
    pub device: DeviceConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Commands sent in order once the device is accepted
    pub verbs: Vec<VerbDefinition>,
}

/// Target device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// hwdep node (e.g., "/dev/snd/hwC1D0")
    pub path: PathBuf,
    /// Required start of the device's descriptive name
    pub expected_name_prefix: String,
    /// Minimum protocol version, `major << 16 | minor << 8 | subminor`
    #[serde(deserialize_with = "deserialize_version_word")]
    pub minimum_version: u32,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub level: String,
}

/// One verb in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbDefinition {
    /// Target node id
    pub nid: u8,
    /// Verb id
    pub verb: u16,
    /// Parameter or payload
    pub param: u16,
    /// Free-form note shown in logs
    #[serde(default)]
    pub label: Option<String>,
}

impl VerbDefinition {
    /// Entry for `command` with a log label.
    pub fn from_command(command: VerbCommand, label: &str) -> Self {
        Self {
            nid: command.nid,
            verb: command.verb,
            param: command.param,
            label: Some(label.to_string()),
        }
    }

    /// The command this entry describes.
    pub fn command(&self) -> VerbCommand {
        VerbCommand::new(self.nid, self.verb, self.param)
    }
}

/// Node whose input amp picks up the noise.
const WHITE_NOISE_NID: u8 = 0x0c;

/// Mute input amp index 1 of the noisy node on one channel.
fn white_noise_mute(channels: AmpChannels) -> VerbDefinition {
    let payload = AmpGainMute::new(AmpDirection::Input, channels)
        .index(1)
        .mute(true)
        .bits();
    VerbDefinition::from_command(
        VerbCommand::set_amp_gain_mute(WHITE_NOISE_NID, payload),
        "SET_AMP_GAIN_MUTE",
    )
}

/// Accept a version word as an integer or as a decimal or `0x` hex string.
///
/// Environment values always arrive as strings, so hex needs the string form.
fn deserialize_version_word<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct VersionWord;

    impl<'de> de::Visitor<'de> for VersionWord {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a 32-bit version word, decimal or 0x-prefixed hex")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u32, E> {
            u32::try_from(value)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u32, E> {
            u32::try_from(value)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u32, E> {
            let trimmed = value.trim();
            let parsed = match trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
            {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => trimmed.parse(),
            };
            parsed.map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(VersionWord)
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/snd/hwC1D0"),
            expected_name_prefix: "HDA Codec".to_string(),
            minimum_version: hda_hwdep_sys::HDA_HWDEP_VERSION,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            logging: LoggingConfig::default(),
            verbs: vec![
                white_noise_mute(AmpChannels::Right),
                white_noise_mute(AmpChannels::Left),
            ],
        }
    }
}

// ============================================================================
// Configuration Loading and Validation
// ============================================================================

impl FixupConfig {
    /// Load defaults overlaid with environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value has the wrong type or the
    /// result fails validation.
    pub fn load() -> AppResult<Self> {
        Self::extract(Self::base_figment())
    }

    /// Load defaults, then `path`, then environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or if validation
    /// fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HdaError::Configuration(format!(
                "config file '{}' not found",
                path.display()
            )));
        }

        Self::extract(
            Figment::from(Serialized::defaults(FixupConfig::default()))
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(FixupConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn extract(figment: Figment) -> AppResult<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - Log level is valid (trace, debug, info, warn, error)
    /// - Device path and name prefix are non-empty
    /// - At least one verb is configured
    /// - Every verb packs into a valid command word
    ///
    /// # Errors
    ///
    /// Returns `HdaError::Configuration` naming the first failure.
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(HdaError::Configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        if self.device.path.as_os_str().is_empty() {
            return Err(HdaError::Configuration(
                "device.path must not be empty".to_string(),
            ));
        }

        if self.device.expected_name_prefix.is_empty() {
            return Err(HdaError::Configuration(
                "device.expected_name_prefix must not be empty".to_string(),
            ));
        }

        if self.verbs.is_empty() {
            return Err(HdaError::Configuration(
                "at least one verb must be configured".to_string(),
            ));
        }

        for (index, def) in self.verbs.iter().enumerate() {
            def.command().encode().map_err(|err| {
                HdaError::Configuration(format!("verbs[{index}]: {err}"))
            })?;
        }

        Ok(())
    }

    /// Minimum accepted protocol version.
    pub fn minimum_version(&self) -> ProtocolVersion {
        ProtocolVersion::from_raw(self.device.minimum_version)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|err| HdaError::Configuration(format!("cannot render config: {err}")))
    }
}
