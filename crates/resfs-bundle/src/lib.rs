//! The `site/` directory of this crate, compiled into static registries by
//! `build.rs`.
//!
//! ```ignore
//! resfs_bundle::site::register_tree()?;
//! let page = resfs_bundle::site::mount().open("index.html")?;
//! ```

pub mod site {
    include!(concat!(env!("OUT_DIR"), "/resfs/resources.rs"));
}
