use crate::constants::{APP_FEATURES, APP_MANIFEST, TARGET};
use crate::process::run_checked;
use anyhow::Result;
use std::process::Command;

/// Checks a comma separated feature list against the firmware's features.
pub fn check_features(features: &str) -> Result<()> {
    for feature in features.split(',').map(str::trim) {
        if !APP_FEATURES.contains(&feature) {
            anyhow::bail!(
                "Unknown firmware feature `{feature}` (expected one of {})",
                APP_FEATURES.join(", ")
            );
        }
    }
    Ok(())
}

pub fn build_command(features: Option<&str>, release: bool) -> Command {
    let mut cargo_build = Command::new("cargo");
    cargo_build
        .arg("build")
        .arg("--no-default-features")
        .arg("--manifest-path")
        .arg(APP_MANIFEST)
        .arg("--target")
        .arg(TARGET);

    if release {
        cargo_build.arg("--release");
    }

    if let Some(features) = features {
        cargo_build.args(["--features", features]);
    }
    cargo_build
}

pub fn build_firmware(features: Option<&str>, release: bool) -> Result<()> {
    if let Some(features) = features {
        check_features(features)?;
    }
    run_checked(
        build_command(features, release),
        &format!("Build of {APP_MANIFEST}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::argv;

    #[test]
    fn debug_build_without_features() {
        assert_eq!(
            argv(&build_command(None, false)),
            [
                "cargo",
                "build",
                "--no-default-features",
                "--manifest-path",
                "crates/arbiter-app/Cargo.toml",
                "--target",
                "thumbv7em-none-eabihf",
            ]
        );
    }

    #[test]
    fn release_build_passes_features_through() {
        let args = argv(&build_command(Some("defmt,demo"), true));
        assert!(args.contains(&"--release".to_string()));
        assert!(args.ends_with(&["--features".into(), "defmt,demo".into()]));
    }

    #[test]
    fn firmware_features_are_checked() {
        assert!(check_features("defmt").is_ok());
        assert!(check_features("defmt, auto-release,demo").is_ok());

        let err = check_features("defmt,bluetooth").unwrap_err();
        assert!(err.to_string().contains("`bluetooth`"));
    }
}
