//! Path normalization
//!
//! Paths are POSIX-style and always relative to the root of the filesystem
//! being queried. A leading `/` is accepted and ignored.

use crate::error::{Result, VfsError};

/// Normalize a requested path.
///
/// - Empty components and `.` are dropped
/// - `..` removes the preceding component
/// - A leading `/` rebases onto the root
///
/// The root itself normalizes to `""`. A `..` that would leave the root is
/// an error.
pub fn normalize(path: &str) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(VfsError::OutsideRoot {
                        path: path.to_string(),
                    });
                }
            }
            name => parts.push(name),
        }
    }
    Ok(parts.join("/"))
}

/// Split a normalized path into its first component and the remainder.
pub fn split_first(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((head, rest)) => (head, rest),
        None => (path, ""),
    }
}

/// Join a parent path and a child name, treating `""` and `"."` as the root.
pub fn join(parent: &str, name: &str) -> String {
    match parent {
        "" | "." => name.to_string(),
        parent => format!("{}/{}", parent.trim_end_matches('/'), name),
    }
}
