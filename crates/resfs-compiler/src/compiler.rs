//! Compiler driver: select, translate, then emit or mount.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resfs::{CompressionPolicy, Registry};
use serde::Serialize;
use tracing::{info, warn};

use crate::codegen::{write_bundle, GENERATED_FILE};
use crate::config::Config;
use crate::error::{CompileError, Result};
use crate::mount::mount_tree;
use crate::select::{FileSelector, Selection};
use crate::tree::CompiledTree;

/// Subdirectory of `OUT_DIR` used by [`build_script`].
pub const OUT_SUBDIR: &str = "resfs";

/// Summary of one `emit` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmitReport {
    /// Path of the generated `resources.rs`
    pub output: PathBuf,
    pub units: usize,
    pub resources: usize,
    /// Resources stored as zlib streams
    pub compressed: usize,
    /// Sum of uncompressed sizes
    pub raw_bytes: u64,
    /// Sum of stored payload sizes
    pub stored_bytes: u64,
    /// Output was newer than every source and was left alone
    pub skipped: bool,
}

#[derive(Debug, Clone)]
pub struct Compiler {
    config: Config,
    selector: FileSelector,
    policy: CompressionPolicy,
}

impl Compiler {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let selector = FileSelector::from_config(&config.compile)?;
        let policy = config.compression.policy();
        Ok(Self {
            config,
            selector,
            policy,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &CompressionPolicy {
        &self.policy
    }

    /// Files that would be embedded, grouped by directory.
    pub fn plan(&self, source: &Path) -> Result<Selection> {
        self.selector.select(source)
    }

    pub fn compile(&self, source: &Path) -> Result<CompiledTree> {
        let selection = self.plan(source)?;
        CompiledTree::build(source, &selection, &self.policy)
    }

    /// Generate into the configured destination.
    pub fn emit(&self, source: &Path) -> Result<EmitReport> {
        let dest = self.config.compile.dest.clone();
        self.emit_to(source, &dest)
    }

    pub fn emit_to(&self, source: &Path, dest: &Path) -> Result<EmitReport> {
        let selection = self.plan(source)?;
        self.emit_selection(source, &selection, dest)
    }

    fn emit_selection(&self, source: &Path, selection: &Selection, dest: &Path) -> Result<EmitReport> {
        let output = dest.join(GENERATED_FILE);
        if !self.config.compile.overwrite && is_up_to_date(source, selection, &output)? {
            warn!(output = %output.display(), "output is up to date, skipping");
            return Ok(EmitReport {
                output,
                skipped: true,
                ..EmitReport::default()
            });
        }

        let tree = CompiledTree::build(source, selection, &self.policy)?;
        let output = write_bundle(&tree, dest)?;
        let report = EmitReport {
            output,
            units: tree.units().count(),
            resources: tree.resources().count(),
            compressed: tree
                .resources()
                .filter(|r| r.encoding.is_compressed())
                .count(),
            raw_bytes: tree.resources().map(|r| r.size).sum(),
            stored_bytes: tree.resources().map(|r| r.payload.len() as u64).sum(),
            skipped: false,
        };
        info!(
            units = report.units,
            resources = report.resources,
            compressed = report.compressed,
            raw_bytes = report.raw_bytes,
            stored_bytes = report.stored_bytes,
            "emitted resources"
        );
        Ok(report)
    }

    /// Compile and register into in-memory registries.
    pub fn mount(&self, source: &Path) -> Result<Arc<Registry>> {
        let tree = self.compile(source)?;
        mount_tree(&tree)
    }
}

/// True when `output` exists and is at least as new as every selected file.
fn is_up_to_date(source: &Path, selection: &Selection, output: &Path) -> Result<bool> {
    let generated = match fs::metadata(output).and_then(|meta| meta.modified()) {
        Ok(time) => time,
        Err(_) => return Ok(false),
    };
    for (dir, names) in selection {
        for name in names {
            let path = source.join(dir).join(name);
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .map_err(CompileError::io(&path))?;
            if modified > generated {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Entry point for a `build.rs`.
///
/// Compiles `source` into `$OUT_DIR/resfs/` and tells cargo to rerun when
/// the source tree changes. The application then includes the output with
/// `include!(concat!(env!("OUT_DIR"), "/resfs/resources.rs"))`.
pub fn build_script(source: &Path, config: Config) -> Result<EmitReport> {
    let out_dir = std::env::var_os("OUT_DIR")
        .ok_or_else(|| CompileError::Invalid("OUT_DIR is not set".to_string()))?;
    let compiler = Compiler::new(config)?;
    let selection = compiler.plan(source)?;

    println!("cargo:rerun-if-changed={}", source.display());
    for (dir, names) in &selection {
        println!("cargo:rerun-if-changed={}", source.join(dir).display());
        for name in names {
            println!("cargo:rerun-if-changed={}", source.join(dir).join(name).display());
        }
    }

    compiler.emit_selection(source, &selection, &PathBuf::from(out_dir).join(OUT_SUBDIR))
}
