//! resfs runtime
//!
//! A read-only, in-memory filesystem over resources compiled into the
//! binary by `resfs-compiler`:
//! - **registry**: one per compiled directory, filled by startup registration
//!   calls in any order, sealed on first use
//! - **delegate**: the capabilities a parent uses to reach a child unit
//! - **resolver**: path walking with hand-off across units
//! - **handle**: file reads/seeks (lazy inflation) and paged directory listings
//! - **subtree**: serve one directory as the root of its own filesystem
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/resfs/resources.rs"));
//!
//! register_tree()?;
//! let mut handle = REGISTRY.open("css/style.css")?;
//! ```

pub mod delegate;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod node;
pub mod path;
pub mod policy;
pub mod registry;
mod resolver;
pub mod subtree;

pub use delegate::{DirectoryDelegate, FileSystem, Listing};
pub use descriptor::{timestamp, EntryKind, Metadata, ResourceDescriptor};
pub use error::{Result, VfsError};
pub use handle::{DirHandle, FileHandle, Handle};
pub use node::{DirectoryNode, Entry, Mount};
pub use policy::{decide, CompressionPolicy, Encoding};
pub use registry::Registry;
pub use subtree::Subtree;
