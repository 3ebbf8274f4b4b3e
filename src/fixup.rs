//! The codec fixup sequence.
//!
//! Open the hwdep node, check that it is an HD-audio codec speaking a
//! supported protocol, then send the configured verbs in order. Both checks
//! run before the first write. The session is dropped, and so closed, on
//! every return path.

use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};

use crate::codec::{word_nid, VerbCommand};
use crate::config::FixupConfig;
use crate::error::{AppResult, HdaError};
use crate::hardware::{
    HwdepIdentity, IdentityQuery, ProtocolVersion, SessionOpener, VerbWriter, VersionQuery,
};

/// A verb ready to send: validated and packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedVerb {
    /// Source command.
    pub command: VerbCommand,
    /// Packed ioctl word.
    pub word: u32,
    /// Optional note from configuration.
    pub label: Option<String>,
}

/// A verb the device accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbResult {
    /// Packed ioctl word that was sent.
    pub word: u32,
    /// Response word written back by the kernel.
    pub response: u32,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupReport {
    /// Device node that was configured.
    pub device: PathBuf,
    /// Identity the device reported.
    pub identity: HwdepIdentity,
    /// Protocol version the device reported.
    pub version: ProtocolVersion,
    /// Verbs in the order they were sent.
    pub verbs: Vec<VerbResult>,
}

/// The fixup sequence for one device.
#[derive(Debug, Clone)]
pub struct CodecFixup {
    device: PathBuf,
    expected_name_prefix: String,
    minimum_version: ProtocolVersion,
    verbs: Vec<PlannedVerb>,
}

impl CodecFixup {
    /// Build the sequence from configuration, packing every verb up front.
    pub fn new(config: &FixupConfig) -> AppResult<Self> {
        let verbs = config
            .verbs
            .iter()
            .map(|def| {
                let command = def.command();
                Ok(PlannedVerb {
                    command,
                    word: command.encode()?,
                    label: def.label.clone(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            device: config.device.path.clone(),
            expected_name_prefix: config.device.expected_name_prefix.clone(),
            minimum_version: config.minimum_version(),
            verbs,
        })
    }

    /// Target a different device node.
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = device.into();
        self
    }

    /// Device node this sequence opens.
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Verbs in send order.
    pub fn planned(&self) -> &[PlannedVerb] {
        &self.verbs
    }

    /// Packed words in send order.
    pub fn planned_words(&self) -> Vec<u32> {
        self.verbs.iter().map(|v| v.word).collect()
    }

    /// Run the sequence against a device opened through `opener`.
    ///
    /// # Errors
    ///
    /// - `HdaError::DeviceMismatch` if the identity name lacks the expected prefix
    /// - `HdaError::UnsupportedVersion` if the protocol is older than the minimum
    /// - `HdaError::Io` / `HdaError::Ioctl` if the device cannot be opened or a
    ///   request fails; remaining verbs are not sent
    pub fn run<O: SessionOpener>(&self, opener: &O) -> AppResult<FixupReport> {
        let span = info_span!("codec_fixup", device = %self.device.display());
        let _enter = span.enter();

        let mut session = opener.open(&self.device)?;

        let identity = self.verify_identity(&mut session)?;
        let version = self.verify_version(&mut session)?;
        let verbs = self.send_verbs(&mut session)?;

        info!(count = verbs.len(), "codec fixup applied");
        Ok(FixupReport {
            device: self.device.clone(),
            identity,
            version,
            verbs,
        })
    }

    fn verify_identity<S: IdentityQuery>(&self, session: &mut S) -> AppResult<HwdepIdentity> {
        let identity = session.identity()?;
        info!(
            name = %identity.name,
            card = identity.card,
            device = identity.device,
            iface = identity.iface,
            "hwdep identity"
        );

        if !identity.matches_family(&self.expected_name_prefix) {
            warn!(
                name = %identity.name,
                expected = %self.expected_name_prefix,
                "unknown hwdep interface"
            );
            return Err(HdaError::DeviceMismatch {
                name: identity.name,
                expected_prefix: self.expected_name_prefix.clone(),
            });
        }
        Ok(identity)
    }

    fn verify_version<S: VersionQuery>(&self, session: &mut S) -> AppResult<ProtocolVersion> {
        let version = session.protocol_version()?;
        info!(version = %version, minimum = %self.minimum_version, "hwdep protocol version");

        if version < self.minimum_version {
            warn!(version = %version, "unsupported hwdep version");
            return Err(HdaError::UnsupportedVersion {
                found: version,
                minimum: self.minimum_version,
            });
        }
        Ok(version)
    }

    fn send_verbs<S: VerbWriter>(&self, session: &mut S) -> AppResult<Vec<VerbResult>> {
        let mut sent = Vec::with_capacity(self.verbs.len());
        for planned in &self.verbs {
            let response = session.write_verb(planned.word)?;
            debug!(
                word = %format!("{:#010x}", planned.word),
                nid = %format!("{:#04x}", word_nid(planned.word)),
                response = %format!("{response:#010x}"),
                label = planned.label.as_deref().unwrap_or(""),
                "verb written"
            );
            sent.push(VerbResult {
                word: planned.word,
                response,
            });
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerbDefinition;
    use crate::hardware::MockCodec;
    use tracing_test::traced_test;

    #[test]
    fn test_planned_words_from_defaults() {
        let fixup = CodecFixup::new(&FixupConfig::default()).unwrap();
        assert_eq!(fixup.planned_words(), vec![0x0c03_5180, 0x0c03_6180]);
        assert_eq!(fixup.device(), Path::new("/dev/snd/hwC1D0"));
        assert_eq!(
            fixup.planned()[0].label.as_deref(),
            Some("SET_AMP_GAIN_MUTE")
        );
    }

    #[test]
    fn test_new_rejects_unencodable_verb() {
        let mut config = FixupConfig::default();
        config.verbs.push(VerbDefinition {
            nid: 0xff,
            verb: 0x300,
            param: 0,
            label: None,
        });
        assert!(matches!(
            CodecFixup::new(&config),
            Err(HdaError::InvalidVerb(_))
        ));
    }

    #[test]
    fn test_with_device_overrides_path() {
        let codec = MockCodec::new();
        let fixup = CodecFixup::new(&FixupConfig::default())
            .unwrap()
            .with_device("/dev/snd/hwC0D3");
        let report = fixup.run(&codec).unwrap();
        assert_eq!(report.device, PathBuf::from("/dev/snd/hwC0D3"));
        assert_eq!(codec.opened_paths(), vec![PathBuf::from("/dev/snd/hwC0D3")]);
    }

    #[test]
    #[traced_test]
    fn test_run_logs_identity_and_version() {
        let codec = MockCodec::new();
        CodecFixup::new(&FixupConfig::default())
            .unwrap()
            .run(&codec)
            .unwrap();
        assert!(logs_contain("hwdep identity"));
        assert!(logs_contain("HDA Codec 0"));
        assert!(logs_contain("1.0.0"));
        assert!(logs_contain("codec fixup applied"));
    }

    #[test]
    #[traced_test]
    fn test_mismatch_is_logged() {
        let codec = MockCodec::new().with_name("USB Audio");
        let result = CodecFixup::new(&FixupConfig::default())
            .unwrap()
            .run(&codec);
        assert!(result.is_err());
        assert!(logs_contain("unknown hwdep interface"));
    }
}
