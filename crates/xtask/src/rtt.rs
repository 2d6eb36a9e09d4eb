use anyhow::Result;
use std::process::Command;

use crate::constants::CHIP;
use crate::process::run_checked;

/// Streams the defmt log of a running `elf` over RTT.
pub fn attach_command(elf: &str) -> Command {
    let mut cmd = Command::new("probe-rs");
    cmd.args(["attach", "--chip", CHIP, elf]);
    cmd
}

pub fn run(elf: &str) -> Result<()> {
    run_checked(attach_command(elf), "RTT attach")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::argv;

    #[test]
    fn attach_reads_the_given_elf() {
        let elf = crate::constants::app_elf(true);
        assert_eq!(
            argv(&attach_command(&elf)),
            ["probe-rs", "attach", "--chip", CHIP, elf.as_str()]
        );
    }
}
