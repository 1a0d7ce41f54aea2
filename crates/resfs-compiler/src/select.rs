//! Source file selection.
//!
//! Walks the source root and keeps the regular files whose root-relative,
//! `/`-separated path matches the include pattern and not the exclude
//! pattern. Results are grouped by directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::config::CompileConfig;
use crate::error::{CompileError, Result};

/// Selected file names keyed by their root-relative directory (`""` is the
/// root). Both levels are sorted.
pub type Selection = BTreeMap<PathBuf, Vec<String>>;

/// Include/exclude filter; the default selects every file.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl FileSelector {
    /// Empty patterns disable the respective filter.
    pub fn new(include: &str, exclude: &str) -> Result<Self> {
        let compile = |pattern: &str| -> Result<Option<Regex>> {
            if pattern.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Regex::new(pattern)?))
            }
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn from_config(config: &CompileConfig) -> Result<Self> {
        Self::new(&config.include, &config.exclude)
    }

    pub fn is_selected(&self, relative: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(relative) {
                return false;
            }
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(relative),
            None => true,
        }
    }

    /// Select files under `root`.
    pub fn select(&self, root: &Path) -> Result<Selection> {
        if !root.is_dir() {
            return Err(CompileError::NotADirectory(root.to_path_buf()));
        }
        let mut selection = Selection::new();
        self.walk(root, Path::new(""), &mut selection)?;
        for names in selection.values_mut() {
            names.sort();
        }
        Ok(selection)
    }

    fn walk(&self, root: &Path, relative: &Path, selection: &mut Selection) -> Result<()> {
        let dir = root.join(relative);
        let entries = fs::read_dir(&dir).map_err(CompileError::io(&dir))?;
        for entry in entries {
            let entry = entry.map_err(CompileError::io(&dir))?;
            let file_type = entry.file_type().map_err(CompileError::io(entry.path()))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 name");
                    continue;
                }
            };
            let child = relative.join(&name);

            if file_type.is_dir() {
                self.walk(root, &child, selection)?;
            } else if file_type.is_file() {
                let key = slash_path(&child);
                if self.is_selected(&key) {
                    debug!(file = %key, "selected");
                    selection
                        .entry(relative.to_path_buf())
                        .or_default()
                        .push(name);
                }
            }
        }
        Ok(())
    }
}

/// `a/b/c` regardless of the platform separator.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
