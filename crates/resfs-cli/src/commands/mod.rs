pub mod cat;
pub mod compile;
pub mod ls;
pub mod plan;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use resfs::Registry;
use resfs_compiler::{Compiler, Config};

/// Config from `--config`, else `<dir>/resfs.toml`, else the defaults.
pub fn load_config(dir: &Path, config: Option<&Path>) -> anyhow::Result<Config> {
    match config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::discover(dir)
            .with_context(|| format!("Failed to load config from {}", dir.display())),
    }
}

/// Compile `dir` and mount it in memory.
pub fn mount(dir: &Path, config: Option<&Path>) -> anyhow::Result<Arc<Registry>> {
    let compiler = Compiler::new(load_config(dir, config)?)?;
    compiler
        .mount(dir)
        .with_context(|| format!("Failed to compile {}", dir.display()))
}
