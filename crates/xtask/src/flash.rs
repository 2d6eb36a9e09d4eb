use anyhow::Result;
use std::process::Command;

use crate::constants::{app_elf, CHIP};
use crate::process::run_checked;

pub fn erase_command() -> Command {
    let mut cmd = Command::new("probe-rs");
    cmd.args(["erase", "--chip", CHIP, "--allow-erase-all"]);
    cmd
}

/// Writes only the sectors that differ from `elf`.
pub fn download_command(elf: &str) -> Command {
    let mut cmd = Command::new("probe-rs");
    cmd.args([
        "download",
        "--chip",
        CHIP,
        elf,
        "--preverify",
        "--restore-unwritten",
    ]);
    cmd
}

pub fn flash_firmware(
    features: Option<&str>,
    release: bool,
    force: bool,
) -> Result<()> {
    crate::build::build_firmware(features, release)?;

    if force {
        println!("Erasing chip...");
        run_checked(erase_command(), "Chip erase")?;
    }

    println!("Flashing {}...", app_elf(release));
    run_checked(download_command(&app_elf(release)), "Flashing")
}
