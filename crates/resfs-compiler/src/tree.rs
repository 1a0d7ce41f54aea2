//! Directory hierarchy of compiled units.
//!
//! Every directory that holds a selected file becomes a unit, and so does
//! every ancestor between it and the source root, so that each unit can be
//! reached from the root through `register_dir` links.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use resfs::CompressionPolicy;
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::select::{slash_path, Selection};
use crate::translate::{epoch_parts, translate, CompiledResource};

/// Registry name of the source root.
pub const ROOT_UNIT: &str = ".";

/// One directory of the source tree.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Root-relative directory; empty for the root
    pub path: PathBuf,
    pub name: String,
    pub modified_at: SystemTime,
    pub resources: Vec<CompiledResource>,
    /// Names of child units, sorted
    pub children: Vec<String>,
}

impl CompiledUnit {
    pub fn is_root(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Root-relative path of a child unit.
    pub fn child_path(&self, child: &str) -> PathBuf {
        self.path.join(child)
    }

    /// `/`-separated directory, `""` for the root.
    pub fn slash_path(&self) -> String {
        slash_path(&self.path)
    }

    pub fn modified_parts(&self) -> (u64, u32) {
        epoch_parts(self.modified_at)
    }
}

/// All units of one source root, keyed by root-relative path.
#[derive(Debug, Clone)]
pub struct CompiledTree {
    source: PathBuf,
    units: BTreeMap<PathBuf, CompiledUnit>,
}

impl CompiledTree {
    /// Translate every selected file and lay out the unit hierarchy.
    pub fn build(source: &Path, selection: &Selection, policy: &CompressionPolicy) -> Result<Self> {
        let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
        dirs.insert(PathBuf::new());
        for dir in selection.keys() {
            let mut current = Some(dir.as_path());
            while let Some(path) = current {
                if !dirs.insert(path.to_path_buf()) {
                    break;
                }
                current = path.parent();
            }
        }

        let mut units = BTreeMap::new();
        for dir in &dirs {
            let full = source.join(dir);
            let modified_at = fs::metadata(&full)
                .and_then(|meta| meta.modified())
                .map_err(CompileError::io(&full))?;

            let resources = selection
                .get(dir)
                .map(|names| {
                    names
                        .iter()
                        .map(|name| translate(source, &dir.join(name), policy))
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?
                .unwrap_or_default();

            let name = match dir.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => ROOT_UNIT.to_string(),
            };
            let children = dirs
                .iter()
                .filter(|candidate| candidate.parent() == Some(dir.as_path()))
                .filter_map(|candidate| candidate.file_name())
                .map(|child| child.to_string_lossy().into_owned())
                .collect();

            debug!(
                unit = %slash_path(dir),
                files = resources.len(),
                "planned unit"
            );
            units.insert(
                dir.clone(),
                CompiledUnit {
                    path: dir.clone(),
                    name,
                    modified_at,
                    resources,
                    children,
                },
            );
        }

        Ok(Self {
            source: source.to_path_buf(),
            units,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn root(&self) -> &CompiledUnit {
        &self.units[Path::new("")]
    }

    pub fn unit(&self, path: &Path) -> Option<&CompiledUnit> {
        self.units.get(path)
    }

    /// Units in path order, parents before children.
    pub fn units(&self) -> impl Iterator<Item = &CompiledUnit> {
        self.units.values()
    }

    pub fn children<'a>(&'a self, unit: &'a CompiledUnit) -> impl Iterator<Item = &'a CompiledUnit> {
        unit.children
            .iter()
            .filter_map(move |child| self.units.get(&unit.child_path(child)))
    }

    pub fn resources(&self) -> impl Iterator<Item = &CompiledResource> {
        self.units.values().flat_map(|unit| unit.resources.iter())
    }

    /// Newest modification time among the translated files.
    pub fn newest_resource(&self) -> Option<SystemTime> {
        self.resources().map(|r| r.modified_at).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_become_units() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("static").join("js").join("lib");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("x.js"), b"x").unwrap();
        fs::write(dir.path().join("index.html"), b"<p>").unwrap();

        let mut selection = Selection::new();
        selection.insert(PathBuf::new(), vec!["index.html".to_string()]);
        selection.insert(["static", "js", "lib"].iter().collect(), vec!["x.js".to_string()]);

        let tree =
            CompiledTree::build(dir.path(), &selection, &CompressionPolicy::default()).unwrap();
        let paths: Vec<String> = tree.units().map(|u| u.slash_path()).collect();
        assert_eq!(paths, vec!["", "static", "static/js", "static/js/lib"]);

        let root = tree.root();
        assert!(root.is_root());
        assert_eq!(root.name, ROOT_UNIT);
        assert_eq!(root.children, vec!["static"]);
        assert_eq!(root.resources[0].name, "index.html");

        let lib = tree.unit(&["static", "js", "lib"].iter().collect::<PathBuf>()).unwrap();
        assert_eq!(lib.name, "lib");
        assert!(lib.children.is_empty());
        assert_eq!(lib.resources[0].source_path, "static/js/lib/x.js");

        let static_unit = tree.unit(Path::new("static")).unwrap();
        assert!(static_unit.resources.is_empty());
        let child_names: Vec<&str> = tree.children(static_unit).map(|u| u.name.as_str()).collect();
        assert_eq!(child_names, vec!["js"]);
    }

    #[test]
    fn test_empty_selection_has_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let tree =
            CompiledTree::build(dir.path(), &Selection::new(), &CompressionPolicy::default())
                .unwrap();
        assert_eq!(tree.units().count(), 1);
        assert!(tree.newest_resource().is_none());
    }
}
