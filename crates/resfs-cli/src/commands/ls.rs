//! `resfs ls`: List a directory through the VFS.

use std::path::Path;

use anyhow::Context;
use resfs::{Handle, Metadata, VfsError};

pub fn execute(
    dir: &Path,
    path: &str,
    page: isize,
    json: bool,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let root = super::mount(dir, config)?;
    let mut handle = root
        .open(path)
        .with_context(|| format!("Cannot open {}", path))?;

    let entries = if handle.is_dir() {
        collect(&mut handle, page)?
    } else {
        vec![handle.stat()?]
    };
    handle.close();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    }
    Ok(())
}

/// Drain the directory handle `page` entries at a time.
fn collect(handle: &mut Handle, page: isize) -> anyhow::Result<Vec<Metadata>> {
    let mut entries = Vec::new();
    loop {
        match handle.list(page) {
            Ok(listing) => {
                entries.extend(listing.entries);
                if listing.exhausted {
                    break;
                }
            }
            Err(VfsError::EndOfDirectory { .. }) => break,
            Err(err) => return Err(err).context("Listing failed"),
        }
    }
    Ok(entries)
}

/// `dr-xr-xr-x          0  css/`
pub fn format_entry(entry: &Metadata) -> String {
    let mut mode = String::with_capacity(10);
    mode.push(if entry.is_dir() { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (entry.mode() >> shift) & 0o7;
        mode.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        mode.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        mode.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    let suffix = if entry.is_dir() { "/" } else { "" };
    format!("{} {:>10}  {}{}", mode, entry.size(), entry.name(), suffix)
}
