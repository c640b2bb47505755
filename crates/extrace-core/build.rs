//! Build script for extrace-core
//!
//! Checks the minimum Rust version before compilation. The crate relies on
//! standard-library APIs stabilized in 1.70 (`Option::is_some_and` and
//! friends), so fail early with a readable message instead of a page of
//! resolution errors.

fn main()
{
    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::parse("1.70.0").unwrap();

        if rustc_version < min_rust_version {
            panic!(
                "extrace-core requires Rust {} or newer, found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get the version (e.g. in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }
}
