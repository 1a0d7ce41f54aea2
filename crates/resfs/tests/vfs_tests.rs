//! Integration tests for resolution, delegation and handles across units.

use std::io::{Read, Write};
use std::sync::Arc;
use std::thread;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use resfs::{
    timestamp, CompressionPolicy, Encoding, Entry, Handle, Registry, ResourceDescriptor, VfsError,
};

/// Roughly 9000 bytes of stylesheet that compresses to well under half.
fn stylesheet() -> Vec<u8> {
    let mut css = String::new();
    let mut i = 0;
    while css.len() < 9000 {
        css.push_str(&format!(
            ".item-{i} {{ margin: {}px; padding: {}px; color: #{:06x}; }}\n",
            i % 17,
            i % 5,
            (i * 2654435761u64 as usize) & 0xffffff
        ));
        i += 1;
    }
    css.truncate(9000);
    css.into_bytes()
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn compressed_file(name: &str, source: &str, data: &[u8]) -> ResourceDescriptor {
    ResourceDescriptor::new(
        name,
        source,
        Encoding::Compressed,
        zlib(data),
        data.len() as u64,
        timestamp(1_700_000_000, 0),
    )
}

fn read_all(handle: &mut Handle) -> Vec<u8> {
    let mut out = Vec::new();
    handle.read_to_end(&mut out).unwrap();
    out
}

fn names(entries: &[resfs::Metadata]) -> Vec<String> {
    entries.iter().map(|m| m.name().to_string()).collect()
}

/// Root with `a.txt` (12 bytes, raw) and `pkg/` (another unit holding a
/// compressed 9000-byte `b.css`).
fn example() -> (Arc<Registry>, Arc<Registry>, Vec<u8>) {
    let css = stylesheet();
    let policy = CompressionPolicy::default();
    assert_eq!(policy.decide(css.len() as u64, zlib(&css).len() as u64), Encoding::Compressed);

    let pkg = Arc::new(Registry::named("pkg"));
    pkg.register_root(timestamp(1_700_000_100, 0)).unwrap();
    pkg.register_file(compressed_file("b.css", "pkg/b.css", &css))
        .unwrap();

    let root = Arc::new(Registry::named("."));
    root.register_root(timestamp(1_700_000_200, 0)).unwrap();
    root.register_file(ResourceDescriptor::raw(
        "a.txt",
        &b"hello, world"[..],
        timestamp(1_700_000_000, 0),
    ))
    .unwrap();
    root.register_dir("pkg", Arc::clone(&pkg)).unwrap();

    (root, pkg, css)
}

#[test]
fn test_example_scenario() {
    let (root, _pkg, css) = example();

    let mut a = root.open("a.txt").unwrap();
    assert_eq!(read_all(&mut a), b"hello, world");

    let mut b = root.open("pkg/b.css").unwrap();
    let body = read_all(&mut b);
    assert_eq!(body.len(), 9000);
    assert_eq!(body, css);

    let mut dir = root.mount().unwrap();
    let first = dir.list(1).unwrap();
    assert_eq!(names(&first.entries), vec!["a.txt"]);
    assert!(!first.exhausted);
    let second = dir.list(1).unwrap();
    assert_eq!(names(&second.entries), vec!["pkg"]);
    assert!(second.exhausted);
    assert!(matches!(dir.list(1), Err(VfsError::EndOfDirectory { .. })));
}

#[test]
fn test_stat_size_is_uncompressed_size() {
    let (root, _pkg, _css) = example();
    let meta = root.stat("pkg/b.css").unwrap();
    assert_eq!(meta.size(), 9000);
    assert_eq!(meta.encoding(), Some(Encoding::Compressed));
    assert_eq!(root.open("pkg/b.css").unwrap().stat().unwrap().size(), 9000);
}

#[test]
fn test_delegation_is_transparent() {
    let (root, pkg, _css) = example();
    let mut via_root = root.open("pkg/b.css").unwrap();
    let mut direct = pkg.open("b.css").unwrap();
    assert_eq!(via_root.stat().unwrap(), direct.stat().unwrap());
    assert_eq!(read_all(&mut via_root), read_all(&mut direct));
}

#[test]
fn test_self_reference_terminates() {
    let (root, pkg, _css) = example();
    // The unit also lists itself under "."
    pkg.register(".", Entry::dir(".", Arc::clone(&pkg))).unwrap();

    let meta = root.stat("pkg/.").unwrap();
    assert_eq!(meta.name(), "pkg");
    assert!(meta.is_dir());

    let mut dir = root.open("pkg/./.").unwrap();
    assert_eq!(dir.stat().unwrap().name(), "pkg");
    let listing = dir.list(0).unwrap();
    assert_eq!(names(&listing.entries), vec!["b.css"]);
}

#[test]
fn test_paged_listing_matches_unpaged() {
    let root = Registry::named(".");
    for i in 0..7 {
        let name = format!("file-{}.txt", i);
        root.register_file(ResourceDescriptor::raw(
            name,
            format!("{}", i).into_bytes(),
            timestamp(0, 0),
        ))
        .unwrap();
    }
    let sub = Arc::new(Registry::named("sub"));
    sub.register_root(timestamp(0, 0)).unwrap();
    root.register_dir("sub", sub).unwrap();

    let all = names(&root.mount().unwrap().list(0).unwrap().entries);
    assert_eq!(all.len(), 8);

    for page in 1..=9 {
        let mut dir = root.mount().unwrap();
        let mut collected = Vec::new();
        loop {
            let listing = dir.list(page).unwrap();
            collected.extend(names(&listing.entries));
            if listing.exhausted {
                break;
            }
        }
        assert_eq!(collected, all, "page size {}", page);
    }
}

#[test]
fn test_mounted_dir_handle_forwards_listing() {
    let (root, _pkg, _css) = example();
    let mut dir = root.open("pkg").unwrap();
    let listing = dir.list(5).unwrap();
    assert_eq!(names(&listing.entries), vec!["b.css"]);
    assert!(listing.exhausted);
    assert!(matches!(dir.list(5), Err(VfsError::EndOfDirectory { .. })));
}

#[test]
fn test_path_forms() {
    let (root, _pkg, _css) = example();
    for path in ["a.txt", "/a.txt", "./a.txt", "pkg/../a.txt", "//a.txt"] {
        assert_eq!(root.stat(path).unwrap().name(), "a.txt", "{}", path);
    }
    for path in ["pkg/b.css", "./pkg/./b.css", "/pkg//b.css"] {
        assert_eq!(root.stat(path).unwrap().size(), 9000, "{}", path);
    }
    assert!(matches!(root.open("../a.txt"), Err(VfsError::OutsideRoot { .. })));
}

#[test]
fn test_lookup_errors() {
    let (root, _pkg, _css) = example();
    match root.open("pkg/missing.css") {
        Err(VfsError::NotFound { path }) => assert_eq!(path, "pkg/missing.css"),
        other => panic!("expected not found, got {:?}", other),
    }
    assert!(matches!(root.open("pkg/nodir/x.css"), Err(VfsError::NotFound { .. })));
    assert!(matches!(root.open("a.txt/b"), Err(VfsError::NotADirectory { .. })));
    assert!(matches!(root.open("nothing"), Err(VfsError::NotFound { .. })));
}

#[test]
fn test_operations_on_wrong_handle_kind() {
    let (root, _pkg, _css) = example();
    let mut file = root.open("a.txt").unwrap();
    assert!(matches!(file.list(-1), Err(VfsError::NotADirectory { .. })));

    let mut dir = root.open("pkg").unwrap();
    assert!(matches!(dir.read(&mut [0u8; 4]), Err(VfsError::NotAFile { .. })));
    assert!(matches!(
        dir.seek(std::io::SeekFrom::Start(0)),
        Err(VfsError::NotAFile { .. })
    ));
}

#[test]
fn test_close_twice() {
    let (root, _pkg, _css) = example();
    for path in ["a.txt", "pkg/b.css", ".", "pkg"] {
        let mut handle = root.open(path).unwrap();
        if !handle.is_dir() {
            handle.read(&mut [0u8; 8]).unwrap();
        }
        handle.close();
        handle.close();
    }
}

#[test]
fn test_dangling_mount_is_not_found() {
    let (root, _pkg, _css) = example();
    root.register_dir("ghost", Arc::new(Registry::named("ghost")))
        .unwrap();

    assert!(matches!(root.open("ghost"), Err(VfsError::NotFound { .. })));
    assert!(matches!(root.stat("ghost"), Err(VfsError::NotFound { .. })));
    match root.open("ghost/x.js") {
        Err(VfsError::NotFound { path }) => assert_eq!(path, "ghost/x.js"),
        other => panic!("expected not found, got {:?}", other),
    }

    let listing = root.mount().unwrap().list(0).unwrap();
    assert_eq!(names(&listing.entries), vec!["a.txt", "ghost", "pkg"]);
    assert!(listing.entries[1].is_dir());
}

#[test]
fn test_dangling_mount_reports_mount_path() {
    let (root, pkg, _css) = example();
    root.register_dir("assets", Arc::new(Registry::named("static")))
        .unwrap();
    pkg.register_dir("vendor", Arc::new(Registry::named("third_party")))
        .unwrap();

    for (path, expected) in [
        ("assets", "assets"),
        ("/assets/", "assets"),
        ("pkg/vendor", "pkg/vendor"),
        ("assets/app.js", "assets/app.js"),
    ] {
        match root.open(path) {
            Err(VfsError::NotFound { path }) => assert_eq!(path, expected),
            other => panic!("expected not found for {}, got {:?}", path, other),
        }
    }
    match root.stat("pkg/vendor") {
        Err(VfsError::NotFound { path }) => assert_eq!(path, "pkg/vendor"),
        other => panic!("expected not found, got {:?}", other),
    }
}

#[test]
fn test_nested_units() {
    let leaf = Arc::new(Registry::named("sub"));
    leaf.register_file(ResourceDescriptor::raw("c.js", &b"let c;"[..], timestamp(0, 0)))
        .unwrap();
    let middle = Arc::new(Registry::named("pkg"));
    middle.register_dir("sub", Arc::clone(&leaf)).unwrap();
    let root = Registry::named(".");
    root.register_dir("pkg", Arc::clone(&middle)).unwrap();

    let mut handle = root.open("pkg/sub/c.js").unwrap();
    assert_eq!(read_all(&mut handle), b"let c;");
    match root.open("pkg/sub/missing.js") {
        Err(VfsError::NotFound { path }) => assert_eq!(path, "pkg/sub/missing.js"),
        other => panic!("expected not found, got {:?}", other),
    }
    assert_eq!(root.stat("pkg/sub").unwrap().name(), "sub");
}

#[test]
fn test_concurrent_handles_on_one_descriptor() {
    let (root, _pkg, css) = example();
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let mut handle = root.open("pkg/b.css").unwrap();
                assert_eq!(read_all(&mut handle), css);
            });
        }
    });
}

#[test]
fn test_metadata_serializes() {
    let (root, _pkg, _css) = example();
    let json = serde_json::to_value(root.stat("pkg/b.css").unwrap()).unwrap();
    assert_eq!(json["name"], "b.css");
    assert_eq!(json["kind"], "file");
    assert_eq!(json["encoding"], "compressed");
    assert_eq!(json["size"], 9000);
}
