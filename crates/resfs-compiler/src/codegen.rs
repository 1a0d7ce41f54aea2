//! Rust source generation
//!
//! A compiled tree becomes one `resources.rs` plus one blob per resource:
//!
//! ```text
//! <dest>/resources.rs
//! <dest>/blobs/0/index.html.bin
//! <dest>/blobs/2/app.js.bin
//! ```
//!
//! Blob directories are numbered by unit in path order, so a file and a
//! directory can never claim the same blob path.
//!
//! The root unit's items sit at the top level of `resources.rs`; each child
//! unit is a nested `pub mod`. Every unit gets a static [`resfs::Registry`]
//! and a `register()` function that fills it. Applications call the root's
//! `register_tree()` once at startup, or call the per-unit `register()`
//! functions themselves in whatever order suits them.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{CompileError, Result};
use crate::tree::{CompiledTree, CompiledUnit};
use crate::translate::CompiledResource;

/// Name of the generated source file.
pub const GENERATED_FILE: &str = "resources.rs";

/// Directory holding the payloads, next to the generated source.
pub const BLOB_DIR: &str = "blobs";

const INDENT: &str = "    ";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Module identifier for a directory name.
pub fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if !ident.starts_with(|c: char| c.is_ascii_alphabetic()) {
        ident.insert_str(0, "dir_");
    }
    if KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Identifiers for sibling directories, suffixed where two names collapse
/// to the same identifier.
pub fn child_identifiers(names: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    names
        .iter()
        .map(|name| {
            let base = identifier(name);
            let mut ident = base.clone();
            let mut n = 2;
            while !used.insert(ident.clone()) {
                ident = format!("{}_{}", base, n);
                n += 1;
            }
            ident
        })
        .collect()
}

/// Blob directory number of every unit.
fn unit_numbers(tree: &CompiledTree) -> HashMap<&Path, usize> {
    tree.units()
        .enumerate()
        .map(|(n, unit)| (unit.path.as_path(), n))
        .collect()
}

/// Blob location relative to the generated file, `/`-separated.
pub fn blob_path(unit_number: usize, resource: &CompiledResource) -> String {
    format!("{}/{}/{}.bin", BLOB_DIR, unit_number, resource.name)
}

/// Render the Rust source for `tree`.
pub fn render(tree: &CompiledTree) -> String {
    let numbers = unit_numbers(tree);
    let mut code = String::new();
    code.push_str("// @generated by resfs-compiler. Do not edit.\n");
    code.push_str("//\n");
    code.push_str("// Call `register_tree()` once before the first lookup.\n\n");
    render_unit(tree, &numbers, tree.root(), 0, &mut code);
    code
}

fn line(code: &mut String, depth: usize, text: &str) {
    if !text.is_empty() {
        for _ in 0..depth {
            code.push_str(INDENT);
        }
        code.push_str(text);
    }
    code.push('\n');
}

fn render_unit(
    tree: &CompiledTree,
    numbers: &HashMap<&Path, usize>,
    unit: &CompiledUnit,
    depth: usize,
    code: &mut String,
) {
    let idents = child_identifiers(&unit.children);
    let (secs, nanos) = unit.modified_parts();
    let number = numbers.get(unit.path.as_path()).copied().unwrap_or_default();

    line(code, depth, "#[allow(dead_code)]");
    line(
        code,
        depth,
        &format!(
            "pub static REGISTRY: ::resfs::Registry = ::resfs::Registry::new({:?});",
            unit.name
        ),
    );
    line(code, depth, "");

    line(code, depth, "/// Register this directory's files and subdirectories.");
    line(code, depth, "#[allow(dead_code)]");
    line(code, depth, "pub fn register() -> ::resfs::Result<()> {");
    line(
        code,
        depth + 1,
        &format!("REGISTRY.register_root(::resfs::timestamp({}, {}))?;", secs, nanos),
    );
    for resource in &unit.resources {
        let (secs, nanos) = resource.modified_parts();
        let encoding = if resource.encoding.is_compressed() {
            "Compressed"
        } else {
            "Raw"
        };
        line(code, depth + 1, "REGISTRY.register_file(::resfs::ResourceDescriptor::new(");
        line(code, depth + 2, &format!("{:?},", resource.name));
        line(code, depth + 2, &format!("{:?},", resource.source_path));
        line(code, depth + 2, &format!("::resfs::Encoding::{},", encoding));
        line(
            code,
            depth + 2,
            &format!("&include_bytes!({:?})[..],", blob_path(number, resource)),
        );
        line(code, depth + 2, &format!("{},", resource.size));
        line(code, depth + 2, &format!("::resfs::timestamp({}, {}),", secs, nanos));
        line(code, depth + 1, "))?;");
    }
    for (child, ident) in unit.children.iter().zip(&idents) {
        line(
            code,
            depth + 1,
            &format!("REGISTRY.register_dir({:?}, &{}::REGISTRY)?;", child, ident),
        );
    }
    line(code, depth + 1, "Ok(())");
    line(code, depth, "}");
    line(code, depth, "");

    line(code, depth, "/// Register this directory and everything below it.");
    line(code, depth, "#[allow(dead_code)]");
    line(code, depth, "pub fn register_tree() -> ::resfs::Result<()> {");
    line(code, depth + 1, "register()?;");
    for ident in &idents {
        line(code, depth + 1, &format!("{}::register_tree()?;", ident));
    }
    line(code, depth + 1, "Ok(())");
    line(code, depth, "}");
    line(code, depth, "");

    line(code, depth, "#[allow(dead_code)]");
    line(code, depth, "pub fn mount() -> &'static ::resfs::Registry {");
    line(code, depth + 1, "&REGISTRY");
    line(code, depth, "}");

    for (child, ident) in unit.children.iter().zip(&idents) {
        let Some(child_unit) = tree.unit(&unit.child_path(child)) else {
            continue;
        };
        line(code, depth, "");
        line(code, depth, &format!("pub mod {} {{", ident));
        render_unit(tree, numbers, child_unit, depth + 1, code);
        line(code, depth, "}");
    }
}

/// Write `resources.rs` and the blobs under `dest`. Returns the path of the
/// generated source.
pub fn write_bundle(tree: &CompiledTree, dest: &Path) -> Result<PathBuf> {
    let blobs = dest.join(BLOB_DIR);
    if blobs.is_dir() {
        fs::remove_dir_all(&blobs).map_err(CompileError::io(&blobs))?;
    }

    let mut written = 0usize;
    for (number, unit) in tree.units().enumerate() {
        for resource in &unit.resources {
            let path = dest.join(blob_path(number, resource));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(CompileError::io(parent))?;
            }
            fs::write(&path, &resource.payload).map_err(CompileError::io(&path))?;
            written += 1;
        }
    }

    fs::create_dir_all(dest).map_err(CompileError::io(dest))?;
    let output = dest.join(GENERATED_FILE);
    fs::write(&output, render(tree)).map_err(CompileError::io(&output))?;

    info!(
        output = %output.display(),
        blobs = written,
        "wrote resource bundle"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Selection;
    use resfs::CompressionPolicy;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("css"), "css");
        assert_eq!(identifier("Static-Files"), "static_files");
        assert_eq!(identifier("3rd.party"), "dir_3rd_party");
        assert_eq!(identifier("_private"), "dir__private");
        assert_eq!(identifier("mod"), "mod_");
        assert_eq!(identifier("self"), "self_");
        assert_eq!(identifier(""), "dir_");
    }

    #[test]
    fn test_sibling_collisions() {
        let names = vec!["a-b".to_string(), "a_b".to_string(), "A.B".to_string()];
        assert_eq!(child_identifiers(&names), vec!["a_b", "a_b_2", "a_b_3"]);
    }

    #[test]
    fn test_render_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("index.html"), b"<h1>\"hi\"</h1>").unwrap();
        fs::write(dir.path().join("css").join("site.css"), b"h1{}").unwrap();

        let mut selection = Selection::new();
        selection.insert(PathBuf::new(), vec!["index.html".to_string()]);
        selection.insert(PathBuf::from("css"), vec!["site.css".to_string()]);
        let tree =
            CompiledTree::build(dir.path(), &selection, &CompressionPolicy::default()).unwrap();

        let code = render(&tree);
        assert!(code.contains("pub static REGISTRY: ::resfs::Registry = ::resfs::Registry::new(\".\");"));
        assert!(code.contains("include_bytes!(\"blobs/0/index.html.bin\")"));
        assert!(code.contains("REGISTRY.register_dir(\"css\", &css::REGISTRY)?;"));
        assert!(code.contains("    css::register_tree()?;"));
        assert!(code.contains("pub mod css {"));
        assert!(code.contains("        \"css/site.css\","));
        assert!(code.contains("include_bytes!(\"blobs/1/site.css.bin\")"));
        assert!(code.contains("::resfs::Encoding::Raw,"));
        assert_eq!(
            code.matches("#[allow(dead_code)]\n    pub fn mount()").count(),
            1,
            "child unit items carry the allow"
        );
        assert!(code.contains("#[allow(dead_code)]\npub fn mount()"));
        assert!(code.contains("#[allow(dead_code)]\npub static REGISTRY"));
    }

    #[test]
    fn test_write_bundle() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(src.path().join("app.js"), b"run()").unwrap();

        let mut selection = Selection::new();
        selection.insert(PathBuf::new(), vec!["app.js".to_string()]);
        let tree =
            CompiledTree::build(src.path(), &selection, &CompressionPolicy::default()).unwrap();

        // Leftovers from an earlier run are removed
        fs::create_dir_all(out.path().join(BLOB_DIR)).unwrap();
        fs::write(out.path().join(BLOB_DIR).join("old.js.bin"), b"old").unwrap();

        let output = write_bundle(&tree, out.path()).unwrap();
        assert_eq!(output, out.path().join(GENERATED_FILE));
        assert_eq!(fs::read(out.path().join("blobs/0/app.js.bin")).unwrap(), b"run()");
        assert!(!out.path().join("blobs/old.js.bin").exists());
        assert_eq!(fs::read_to_string(&output).unwrap(), render(&tree));
    }
}
