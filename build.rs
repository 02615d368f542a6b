// Build script to ensure all FFI exports are included in the DLL on Windows
use std::env;

fn main() {
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        let target = env::var("TARGET").unwrap_or_default();

        if target.contains("gnu") {
            println!("cargo:rustc-cdylib-link-arg=-Wl,--export-all-symbols");
        } else if target.contains("msvc") {
            println!("cargo:rustc-cdylib-link-arg=/DEF:rail_core.def");
        }
    }

    println!("cargo:rerun-if-changed=rail_core.def");
}
