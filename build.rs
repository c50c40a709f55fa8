use std::env;

fn main() {
    // Expose the package version under a stable name for the user agent and --version
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=ICONIFY_DL_VERSION={}", version);

    println!("cargo:rerun-if-changed=templates/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
