//! Build script embedding `site/`
//!
//! The tree mixes directory names that need escaping (`mod`, `self`, `3d`,
//! `a-b` next to `a_b`) with a file `a` beside a directory `a.bin`.

use std::env;
use std::path::Path;

use resfs_compiler::{build_script, Config};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let site = Path::new(&manifest_dir).join("site");

    let mut config = Config::default();
    // Every file, extensionless ones included
    config.compile.include = String::new();

    println!("cargo:rerun-if-changed=build.rs");
    if let Err(e) = build_script(&site, config) {
        panic!("Failed to embed {}: {}", site.display(), e);
    }
}
