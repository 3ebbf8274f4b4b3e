//! Apply the configured codec fixup to an HD-audio hwdep device.
//!
//! With no arguments this opens `/dev/snd/hwC1D0`, checks that it is an HDA
//! codec speaking hwdep protocol 1.0.0 or newer, and mutes the two input amp
//! paths of node `0x0c`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use hda_fixup::config::FixupConfig;
use hda_fixup::fixup::CodecFixup;
use hda_fixup::logging;

#[derive(Parser, Debug)]
#[command(version, about = "Send fixup verbs to an HD-audio codec over hwdep")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// hwdep device node, overriding the configuration
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Log the verb words without opening the device
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FixupConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => FixupConfig::load().context("loading configuration")?,
    };
    if let Some(device) = args.device {
        config.device.path = device;
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    logging::init(&config.logging)?;

    let fixup = CodecFixup::new(&config)?;

    if args.dry_run {
        for planned in fixup.planned() {
            info!(
                device = %fixup.device().display(),
                command = %planned.command,
                word = %format!("{:#010x}", planned.word),
                "dry run"
            );
        }
        return Ok(());
    }

    run(&fixup).map_err(|err| {
        error!(error = %format!("{err:#}"), "codec fixup failed");
        err
    })
}

#[cfg(target_os = "linux")]
fn run(fixup: &CodecFixup) -> Result<()> {
    use hda_fixup::hardware::HwdepOpener;

    let report = fixup
        .run(&HwdepOpener)
        .with_context(|| format!("applying fixup to {}", fixup.device().display()))?;
    info!(
        device = %report.device.display(),
        codec = %report.identity.name,
        verbs = report.verbs.len(),
        "done"
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(_fixup: &CodecFixup) -> Result<()> {
    anyhow::bail!("hwdep devices are only available on Linux")
}
