//! `resfs plan`: Show the selection without translating anything.

use std::path::Path;

use anyhow::Context;
use resfs_compiler::select::slash_path;
use resfs_compiler::Compiler;

pub fn execute(dir: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let compiler = Compiler::new(super::load_config(dir, config)?)?;
    let selection = compiler
        .plan(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    if selection.is_empty() {
        println!("No files selected.");
        return Ok(());
    }

    let mut total = 0;
    for (directory, files) in &selection {
        let label = slash_path(directory);
        println!("{}/", if label.is_empty() { "." } else { label.as_str() });
        for file in files {
            println!("  {}", file);
        }
        total += files.len();
    }
    println!();
    println!("{} files in {} directories", total, selection.len());
    Ok(())
}
