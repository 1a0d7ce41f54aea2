//! In-process mounting of a compiled tree.
//!
//! Does at runtime what the generated `register_tree()` does at startup of
//! an application: one registry per unit, linked through `register_dir`.
//! Useful for inspecting a source tree through the VFS without generating
//! and building code.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use resfs::{timestamp, Registry};
use tracing::debug;

use crate::error::Result;
use crate::tree::CompiledTree;

/// Register every unit of `tree` and return the root registry.
pub fn mount_tree(tree: &CompiledTree) -> Result<Arc<Registry>> {
    let registries: BTreeMap<PathBuf, Arc<Registry>> = tree
        .units()
        .map(|unit| (unit.path.clone(), Arc::new(Registry::named(unit.name.clone()))))
        .collect();

    // Children before parents; registries accept any order
    for unit in tree.units().collect::<Vec<_>>().into_iter().rev() {
        let registry = &registries[&unit.path];
        let (secs, nanos) = unit.modified_parts();
        registry.register_root(timestamp(secs, nanos))?;
        for resource in &unit.resources {
            registry.register_file(resource.to_descriptor())?;
        }
        for child in &unit.children {
            if let Some(child_registry) = registries.get(&unit.child_path(child)) {
                registry.register_dir(child.as_str(), Arc::clone(child_registry))?;
            }
        }
    }

    debug!(
        source = %tree.source().display(),
        units = registries.len(),
        "mounted compiled tree"
    );
    Ok(Arc::clone(&registries[&PathBuf::new()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Selection;
    use resfs::CompressionPolicy;
    use std::fs;
    use std::io::Read;

    #[test]
    fn test_mounted_tree_serves_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();
        fs::write(dir.path().join("a").join("b").join("c.js"), b"let c = 1;").unwrap();

        let mut selection = Selection::new();
        selection.insert(PathBuf::from("a/b"), vec!["c.js".to_string()]);
        let tree =
            CompiledTree::build(dir.path(), &selection, &CompressionPolicy::default()).unwrap();

        let root = mount_tree(&tree).unwrap();
        let mut body = String::new();
        root.open("a/b/c.js").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "let c = 1;");

        let listing = root.list(0, 0).unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name(), "a");
        assert!(listing.entries[0].is_dir());
    }
}
