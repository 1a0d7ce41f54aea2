//! `resfs compile`: Generate the embedding source.

use std::path::{Path, PathBuf};

use anyhow::Context;
use resfs_compiler::{Compiler, Config};

/// Command-line overrides on top of the config file
#[derive(Debug, Default)]
pub struct CompileOptions {
    pub config: Option<PathBuf>,
    pub dest: Option<PathBuf>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub max_uncompressed_k: Option<u64>,
    pub min_ratio: Option<f64>,
    pub no_overwrite: bool,
    pub dry_run: bool,
}

impl CompileOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(dest) = &self.dest {
            config.compile.dest = dest.clone();
        }
        if let Some(include) = &self.include {
            config.compile.include = include.clone();
        }
        if let Some(exclude) = &self.exclude {
            config.compile.exclude = exclude.clone();
        }
        if let Some(k) = self.max_uncompressed_k {
            config.compression.max_uncompressed_k = k;
        }
        if let Some(ratio) = self.min_ratio {
            config.compression.min_ratio = ratio;
        }
        if self.no_overwrite {
            config.compile.overwrite = false;
        }
    }
}

pub fn execute(dir: &Path, options: CompileOptions) -> anyhow::Result<()> {
    let mut config = super::load_config(dir, options.config.as_deref())?;
    options.apply(&mut config);
    let compiler = Compiler::new(config)?;

    if options.dry_run {
        let tree = compiler
            .compile(dir)
            .with_context(|| format!("Failed to compile {}", dir.display()))?;
        for resource in tree.resources() {
            println!(
                "{:<10} {:>10} -> {:>10}  {}",
                format!("{:?}", resource.encoding).to_lowercase(),
                resource.size,
                resource.payload.len(),
                resource.source_path
            );
        }
        println!();
        println!(
            "(Dry run - {} files in {} directories, nothing written)",
            tree.resources().count(),
            tree.units().count()
        );
        return Ok(());
    }

    let report = compiler
        .emit(dir)
        .with_context(|| format!("Failed to compile {}", dir.display()))?;
    if report.skipped {
        println!("{} is up to date.", report.output.display());
    } else {
        println!("Wrote {}", report.output.display());
        println!(
            "{} files in {} directories, {} compressed ({} -> {} bytes)",
            report.resources, report.units, report.compressed, report.raw_bytes, report.stored_bytes
        );
    }
    Ok(())
}
