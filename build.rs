/// Build script for scinapse
/// Embeds build metadata shown by `scinapse version`

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=presets");

    if let Ok(version) = std::env::var("CARGO_PKG_VERSION") {
        println!("cargo:rustc-env=SCINAPSE_VERSION={version}");
    }

    // Short hash; left unset outside a git checkout
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=SCINAPSE_GIT_HASH={}", hash.trim());
            }
        }
    }

    println!(
        "cargo:rustc-env=SCINAPSE_BUILD_TIMESTAMP={}",
        unix_timestamp()
    );
}

/// Seconds since the Unix epoch
fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}
