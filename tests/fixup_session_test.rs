//! Integration tests for the codec fixup sequence
//!
//! These tests verify that CodecFixup, run against a simulated codec:
//! - Sends the configured verb words in order to an accepted device
//! - Refuses mismatched devices and old protocols before writing anything
//! - Stops at the first failed write
//! - Releases the device handle on every exit path

use std::path::PathBuf;

use hda_fixup::config::{FixupConfig, VerbDefinition};
use hda_fixup::fixup::CodecFixup;
use hda_fixup::hardware::{MockCodec, ProtocolVersion};
use hda_fixup::HdaError;

const AMP_MUTE_RIGHT: u32 = 0x0c03_5180;
const AMP_MUTE_LEFT: u32 = 0x0c03_6180;

fn default_fixup() -> CodecFixup {
    CodecFixup::new(&FixupConfig::default()).expect("default config must be valid")
}

/// Accepted device receives both amp mute words and is closed afterwards
#[test]
fn test_expected_device_receives_both_verbs() {
    let codec = MockCodec::new();

    let report = default_fixup().run(&codec).expect("fixup failed");

    assert_eq!(codec.written_words(), vec![AMP_MUTE_RIGHT, AMP_MUTE_LEFT]);
    assert_eq!(codec.open_count(), 1);
    assert_eq!(codec.close_count(), 1);

    assert_eq!(report.device, PathBuf::from("/dev/snd/hwC1D0"));
    assert_eq!(report.identity.name, "HDA Codec 0");
    assert_eq!(report.version, ProtocolVersion::new(1, 0, 0));
    let sent: Vec<u32> = report.verbs.iter().map(|v| v.word).collect();
    assert_eq!(sent, vec![AMP_MUTE_RIGHT, AMP_MUTE_LEFT]);
}

/// Requests happen in protocol order: identity, version, then writes
#[test]
fn test_request_order() {
    let codec = MockCodec::new();
    default_fixup().run(&codec).expect("fixup failed");

    assert_eq!(
        codec.call_log(),
        vec![
            "open: /dev/snd/hwC1D0".to_string(),
            "identity".to_string(),
            "protocol_version".to_string(),
            "write_verb: 0x0c035180".to_string(),
            "write_verb: 0x0c036180".to_string(),
            "close".to_string(),
        ]
    );
}

/// A newer protocol than the minimum is accepted
#[test]
fn test_newer_version_accepted() {
    let codec = MockCodec::new().with_version(ProtocolVersion::new(1, 2, 0));
    default_fixup().run(&codec).expect("fixup failed");
    assert_eq!(codec.written_words().len(), 2);
}

/// Mismatched identity fails before any write and still closes the handle
#[test]
fn test_device_mismatch_sends_nothing() {
    let codec = MockCodec::new().with_name("Emu10k1 FX8010");

    let err = default_fixup().run(&codec).unwrap_err();

    match &err {
        HdaError::DeviceMismatch {
            name,
            expected_prefix,
        } => {
            assert_eq!(name, "Emu10k1 FX8010");
            assert_eq!(expected_prefix, "HDA Codec");
        }
        other => panic!("expected DeviceMismatch, got {other}"),
    }
    assert!(err.is_validation_failure());
    assert!(codec.written_words().is_empty());
    assert_eq!(codec.open_count(), 1);
    assert!(codec.is_released());
}

/// The prefix check is case-sensitive and anchored at the start
#[test]
fn test_prefix_must_lead_name() {
    let codec = MockCodec::new().with_name("Generic HDA Codec");
    let result = default_fixup().run(&codec);
    assert!(matches!(result, Err(HdaError::DeviceMismatch { .. })));
    assert!(codec.is_released());
}

/// Sub-minimum protocol version fails before any write and still closes the handle
#[test]
fn test_unsupported_version_sends_nothing() {
    let codec = MockCodec::new().with_version(ProtocolVersion::new(0, 9, 0));

    let err = default_fixup().run(&codec).unwrap_err();

    match &err {
        HdaError::UnsupportedVersion { found, minimum } => {
            assert_eq!(*found, ProtocolVersion::new(0, 9, 0));
            assert_eq!(*minimum, ProtocolVersion::new(1, 0, 0));
        }
        other => panic!("expected UnsupportedVersion, got {other}"),
    }
    assert!(codec.written_words().is_empty());
    assert!(codec.is_released());
    assert!(!codec
        .call_log()
        .iter()
        .any(|call| call.starts_with("write_verb")));
}

/// A failed write stops the sequence and the handle is still closed
#[test]
fn test_write_failure_aborts_remaining_verbs() {
    let codec = MockCodec::new();
    codec.inject_write_failure_at(0);

    let err = default_fixup().run(&codec).unwrap_err();

    assert!(matches!(
        err,
        HdaError::Ioctl {
            request: "HDA_IOCTL_VERB_WRITE",
            ..
        }
    ));
    assert!(codec.written_words().is_empty());
    let attempts = codec
        .call_log()
        .iter()
        .filter(|call| call.starts_with("write_verb"))
        .count();
    assert_eq!(attempts, 1);
    assert_eq!(codec.call_log().last().map(String::as_str), Some("close"));
    assert!(codec.is_released());
}

/// A failure on the second verb keeps the first and sends nothing after it
#[test]
fn test_write_failure_after_first_verb() {
    let mut config = FixupConfig::default();
    config.verbs.push(VerbDefinition {
        nid: 0x0c,
        verb: 0x300,
        param: 0x5100,
        label: None,
    });
    let fixup = CodecFixup::new(&config).expect("config must be valid");
    let codec = MockCodec::new();
    codec.inject_write_failure_at(1);

    assert!(fixup.run(&codec).is_err());

    assert_eq!(codec.written_words(), vec![AMP_MUTE_RIGHT]);
    assert_eq!(
        codec.call_log(),
        vec![
            "open: /dev/snd/hwC1D0".to_string(),
            "identity".to_string(),
            "protocol_version".to_string(),
            "write_verb: 0x0c035180".to_string(),
            "write_verb: 0x0c036180".to_string(),
            "close".to_string(),
        ]
    );
}

/// A failed identity request is surfaced as an ioctl error
#[test]
fn test_identity_request_failure() {
    let codec = MockCodec::new();
    codec.inject_identity_failure();

    let err = default_fixup().run(&codec).unwrap_err();

    assert!(matches!(err, HdaError::Ioctl { .. }));
    assert!(!err.is_validation_failure());
    assert!(codec.is_released());
}

/// An open failure sends nothing and leaves nothing to close
#[test]
fn test_open_failure() {
    let codec = MockCodec::new();
    codec.inject_open_failure();

    let err = default_fixup().run(&codec).unwrap_err();

    assert!(matches!(err, HdaError::Io(_)));
    assert_eq!(codec.open_count(), 0);
    assert_eq!(codec.close_count(), 0);
    assert!(codec.written_words().is_empty());
}

/// Custom configuration drives the prefix, minimum version, and verb list
#[test]
fn test_custom_configuration() {
    let mut config = FixupConfig::default();
    config.device.path = PathBuf::from("/dev/snd/hwC0D2");
    config.device.expected_name_prefix = "HDA Codec 2".to_string();
    config.device.minimum_version = ProtocolVersion::new(1, 1, 0).raw();
    config.verbs = vec![VerbDefinition {
        nid: 0x14,
        verb: 0x300,
        param: 0xb080,
        label: Some("mute headphone out".to_string()),
    }];
    let fixup = CodecFixup::new(&config).expect("config must be valid");

    let old = MockCodec::new().with_name("HDA Codec 2");
    assert!(matches!(
        fixup.run(&old),
        Err(HdaError::UnsupportedVersion { .. })
    ));

    let codec = MockCodec::new()
        .with_name("HDA Codec 2")
        .with_version(ProtocolVersion::new(1, 1, 0));
    fixup.run(&codec).expect("fixup failed");
    assert_eq!(codec.written_words(), vec![0x1403_b080]);
    assert_eq!(codec.opened_paths(), vec![PathBuf::from("/dev/snd/hwC0D2")]);
}

/// Running the same sequence twice opens and closes the device twice
#[test]
fn test_repeat_runs_release_each_session() {
    let codec = MockCodec::new();
    let fixup = default_fixup();

    fixup.run(&codec).expect("first run failed");
    fixup.run(&codec).expect("second run failed");

    assert_eq!(codec.open_count(), 2);
    assert_eq!(codec.close_count(), 2);
    assert_eq!(codec.written_words().len(), 4);
}
