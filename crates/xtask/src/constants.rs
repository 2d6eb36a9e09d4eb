pub const TARGET: &str = "thumbv7em-none-eabihf";
pub const CHIP: &str = "nRF52840_xxAA";
pub const APP_MANIFEST: &str = "crates/arbiter-app/Cargo.toml";
pub const APP_NAME: &str = "arbiter-app";
/// Cargo features of the firmware crate.
pub const APP_FEATURES: [&str; 3] = ["defmt", "auto-release", "demo"];

/// Path of the firmware ELF for the chosen profile.
pub fn app_elf(release: bool) -> String {
    let profile = if release { "release" } else { "debug" };
    format!("target/{TARGET}/{profile}/{APP_NAME}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elf_path_follows_profile() {
        assert_eq!(
            app_elf(false),
            "target/thumbv7em-none-eabihf/debug/arbiter-app"
        );
        assert_eq!(
            app_elf(true),
            "target/thumbv7em-none-eabihf/release/arbiter-app"
        );
    }
}
