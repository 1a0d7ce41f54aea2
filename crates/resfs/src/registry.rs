//! Per-unit registries
//!
//! Every compiled directory owns one [`Registry`]. Its contents arrive as
//! registration calls that may run on any thread, in any order, before the
//! filesystem is used. The registry goes through two phases:
//!
//! 1. **Open**: registrations are appended under a single mutex.
//! 2. **Sealed**: on the first `open`/`stat`/`list` (or an explicit
//!    [`Registry::seal`]) the pending entries are frozen into a
//!    [`DirectoryNode`]. From then on lookups read the frozen table without
//!    taking any lock.
//!
//! Name collisions cannot be detected reliably while registrations are still
//! arriving, so they are recorded when the registry seals and reported on
//! every access through the colliding name.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::delegate::{DirectoryDelegate, FileSystem, Listing};
use crate::descriptor::{Metadata, ResourceDescriptor};
use crate::error::{Result, VfsError};
use crate::handle::Handle;
use crate::node::{DirectoryNode, Entry};
use crate::resolver::{Conflict, Table};

/// The name that refers to a directory itself.
pub const SELF_NAME: &str = ".";

struct Window {
    open: bool,
    present: bool,
    modified_at: Option<SystemTime>,
    pending: Vec<(String, Entry)>,
}

impl Window {
    const fn new() -> Self {
        Self {
            open: true,
            present: false,
            modified_at: None,
            pending: Vec::new(),
        }
    }
}

/// Registration target and lookup root for one compiled directory.
pub struct Registry {
    name: Cow<'static, str>,
    window: Mutex<Window>,
    table: OnceCell<Table>,
}

impl Registry {
    /// A registry usable as a `static`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            window: parking_lot::const_mutex(Window::new()),
            table: OnceCell::new(),
        }
    }

    /// A registry with a runtime name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            window: Mutex::new(Window::new()),
            table: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_sealed(&self) -> bool {
        self.table.get().is_some()
    }

    /// Add an entry.
    ///
    /// Registering `"."` marks the unit as present without adding a child.
    /// Repeating an identical registration is a no-op, also after sealing;
    /// anything else after sealing is [`VfsError::Sealed`].
    pub fn register(&self, name: impl Into<String>, entry: Entry) -> Result<()> {
        let name = name.into();
        if name == SELF_NAME {
            trace!(unit = %self.name, "self entry registered");
            return self.mark_present(None);
        }
        if name.is_empty() || name == ".." || name.contains('/') {
            return Err(VfsError::InvalidName { name });
        }

        {
            let mut window = self.window.lock();
            if window.open {
                trace!(unit = %self.name, entry = %name, "register");
                window.present = true;
                window.pending.push((name, entry));
                return Ok(());
            }
        }

        let table = self.table();
        match table.root.get(&name) {
            Some(existing) if existing.is_same(&entry) && !table.conflicts.contains_key(&name) => {
                Ok(())
            }
            _ => {
                warn!(unit = %self.name, entry = %name, "registration after seal rejected");
                Err(VfsError::Sealed {
                    unit: self.name.to_string(),
                    name,
                })
            }
        }
    }

    /// Mark the unit as present and record its modification time.
    pub fn register_root(&self, modified_at: SystemTime) -> Result<()> {
        self.mark_present(Some(modified_at))
    }

    pub fn register_file(&self, descriptor: ResourceDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();
        self.register(name, Entry::file(descriptor))
    }

    /// Mount another unit as the child directory `name`.
    pub fn register_dir<D>(&self, name: impl Into<String>, delegate: D) -> Result<()>
    where
        D: DirectoryDelegate + 'static,
    {
        let name = name.into();
        let entry = Entry::dir(name.as_str(), delegate);
        self.register(name, entry)
    }

    fn mark_present(&self, modified_at: Option<SystemTime>) -> Result<()> {
        {
            let mut window = self.window.lock();
            if window.open {
                window.present = true;
                if let Some(time) = modified_at {
                    window.modified_at = Some(window.modified_at.map_or(time, |t| t.max(time)));
                }
                return Ok(());
            }
        }

        let table = self.table();
        let unchanged = modified_at.map_or(true, |time| time <= table.root.modified_at());
        if table.present && unchanged {
            Ok(())
        } else {
            warn!(unit = %self.name, "root registration after seal rejected");
            Err(VfsError::Sealed {
                unit: self.name.to_string(),
                name: SELF_NAME.to_string(),
            })
        }
    }

    /// Close the registration window. Lookups do this implicitly.
    pub fn seal(&self) {
        self.table();
    }

    fn table(&self) -> &Table {
        self.table.get_or_init(|| self.freeze())
    }

    fn freeze(&self) -> Table {
        let (present, modified_at, pending) = {
            let mut window = self.window.lock();
            window.open = false;
            (
                window.present,
                window.modified_at,
                std::mem::take(&mut window.pending),
            )
        };

        let mut children: BTreeMap<String, Entry> = BTreeMap::new();
        let mut conflicts: HashMap<String, Conflict> = HashMap::new();
        for (name, entry) in pending {
            match children.get(&name) {
                None => {
                    children.insert(name, entry);
                }
                Some(existing) if existing.is_same(&entry) => {
                    trace!(unit = %self.name, entry = %name, "identical registration ignored");
                }
                Some(existing) => {
                    let conflict = Conflict {
                        first: existing.source(),
                        second: entry.source(),
                    };
                    error!(
                        unit = %self.name,
                        entry = %name,
                        first = %conflict.first,
                        second = %conflict.second,
                        "duplicate registration"
                    );
                    conflicts.entry(name).or_insert(conflict);
                }
            }
        }

        let modified_at = modified_at
            .or_else(|| {
                children
                    .values()
                    .filter_map(|entry| match entry {
                        Entry::File(desc) => Some(desc.modified_at()),
                        Entry::Dir(_) => None,
                    })
                    .max()
            })
            .unwrap_or(UNIX_EPOCH);

        debug!(
            unit = %self.name,
            entries = children.len(),
            conflicts = conflicts.len(),
            present,
            "registry sealed"
        );

        Table {
            root: Arc::new(DirectoryNode::new(self.name.to_string(), modified_at, children)),
            conflicts,
            present,
        }
    }

    /// Open a file or directory.
    pub fn open(&self, path: &str) -> Result<Handle> {
        self.table().open(path)
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        self.table().stat(path)
    }

    /// Handle on this unit's root directory.
    pub fn mount(&self) -> Result<Handle> {
        self.table().open(SELF_NAME)
    }

    /// A page of root entries starting at `cursor`.
    pub fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing> {
        self.table().list(cursor, max_entries)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

impl DirectoryDelegate for Registry {
    fn open(&self, path: &str) -> Result<Handle> {
        Registry::open(self, path)
    }

    fn stat(&self) -> Result<Metadata> {
        self.table().stat_root()
    }

    fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing> {
        Registry::list(self, cursor, max_entries)
    }
}

impl FileSystem for Registry {
    fn open(&self, path: &str) -> Result<Handle> {
        Registry::open(self, path)
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        Registry::stat(self, path)
    }

    fn mount(&self) -> Result<Handle> {
        Registry::mount(self)
    }
}
