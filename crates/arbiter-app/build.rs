//! Copies `memory.x` next to the build output so the linker finds it from
//! inside the workspace, and stamps the firmware version.

use std::{env, fs::File, io::Write, path::PathBuf};

fn linker_data() -> &'static [u8] {
    include_bytes!("memory.x")
}

fn main() {
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(linker_data())
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var("CARGO_FEATURE_DEFMT").is_ok() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Build info. Outside a git checkout the hash is just left out.
    let pkg_version = env!("CARGO_PKG_VERSION");
    let git_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_owned())
        .unwrap_or_default();

    if git_hash.is_empty() {
        println!("cargo:rustc-env=FW_VERSION={pkg_version}");
    } else {
        println!("cargo:rustc-env=FW_VERSION={pkg_version}-{git_hash}");
    }
}
