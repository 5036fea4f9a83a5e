//! Stamps the binary with where and how it was built
//!
//! Sets `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` for `env!`.

use std::process::Command;

/// Abbreviated commit, with `-dirty` appended for uncommitted changes
fn describe_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_owned()).filter(|s| !s.is_empty())
}

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    let commit = describe_commit().unwrap_or_else(|| "unknown".to_owned());
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_owned());

    set_env("GIT_HASH", &commit);
    set_env("BUILD_TIMESTAMP", &built_at);
    set_env("BUILD_PROFILE", &profile);

    for path in ["ui/index.html", "ui/app.js", "../.git/HEAD", "../.git/index"] {
        println!("cargo:rerun-if-changed={}", path);
    }
}
