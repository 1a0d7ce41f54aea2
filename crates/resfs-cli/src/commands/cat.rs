//! `resfs cat`: Stream a file through the VFS to stdout.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;

pub fn execute(dir: &Path, path: &str, config: Option<&Path>) -> anyhow::Result<()> {
    let root = super::mount(dir, config)?;
    let mut handle = root
        .open(path)
        .with_context(|| format!("Cannot open {}", path))?
        .into_file()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut handle, &mut out).with_context(|| format!("Failed to read {}", path))?;
    out.flush()?;
    handle.close();
    Ok(())
}
