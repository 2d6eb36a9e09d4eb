use anyhow::{Context, Result};
use std::process::Command;

/// Runs `cmd` to completion and fails unless it exits successfully.
pub fn run_checked(mut cmd: Command, what: &str) -> Result<()> {
    let status = cmd.status().with_context(|| format!("Failed to start {what}"))?;
    if !status.success() {
        anyhow::bail!("{what} failed ({status})");
    }
    Ok(())
}

/// Program and arguments of `cmd`, for inspection.
#[cfg(test)]
pub fn argv(cmd: &Command) -> Vec<String> {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect()
}
