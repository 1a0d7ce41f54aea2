//! resfs resource compiler
//!
//! Turns a directory of static files into Rust source that embeds them:
//! - **select**: include/exclude patterns over the source tree
//! - **translate**: per-file zlib compression and the raw/compressed decision
//! - **tree**: one unit per directory, ancestors included
//! - **codegen**: `resources.rs` with one static registry per unit
//! - **mount**: the same registration done in-process, for inspection
//!
//! Typical use from a `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     let config = resfs_compiler::Config::discover("web".as_ref()).unwrap();
//!     resfs_compiler::build_script("web".as_ref(), config).unwrap();
//! }
//! ```

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod mount;
pub mod select;
pub mod translate;
pub mod tree;

pub use codegen::{render, write_bundle};
pub use compiler::{build_script, Compiler, EmitReport};
pub use config::{CompileConfig, CompressionConfig, Config};
pub use error::{CompileError, Result};
pub use mount::mount_tree;
pub use select::{FileSelector, Selection};
pub use translate::{translate, CompiledResource};
pub use tree::{CompiledTree, CompiledUnit};
