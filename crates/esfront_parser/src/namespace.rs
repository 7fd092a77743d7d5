//! Collision-free internal names.
//!
//! Every parse owns one [`Namespace`] tree. The root hands out function
//! names; each function gets a child that hands out renamed parameters. A
//! lookup walks from a child to the root and bumps the counter of the first
//! directory that already knows the base name, so `f`, `f-1`, `f-2` are
//! unique across the whole chain.

use rustc_hash::FxHashMap;

/// Handle to one directory of a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(usize);

#[derive(Debug, Default)]
struct Directory {
    parent: Option<NamespaceId>,
    names: FxHashMap<String, u32>,
}

#[derive(Debug)]
pub struct Namespace {
    directories: Vec<Directory>,
}

impl Namespace {
    pub const ROOT: NamespaceId = NamespaceId(0);

    pub fn new() -> Self {
        Self {
            directories: vec![Directory::default()],
        }
    }

    /// Create a directory whose lookups fall back to `parent`.
    pub fn child(&mut self, parent: NamespaceId) -> NamespaceId {
        let id = NamespaceId(self.directories.len());
        self.directories.push(Directory {
            parent: Some(parent),
            names: FxHashMap::default(),
        });
        id
    }

    /// Record `name` as taken in `id` without renaming it.
    pub fn reserve(&mut self, id: NamespaceId, name: &str) {
        self.directories[id.0].names.entry(name.to_string()).or_insert(0);
    }

    /// `base` if no directory on the chain has seen it, otherwise
    /// `base-N` with the next free counter.
    pub fn unique_name(&mut self, id: NamespaceId, base: &str) -> String {
        let mut current = Some(id);
        while let Some(NamespaceId(index)) = current {
            let directory = &mut self.directories[index];
            if let Some(counter) = directory.names.get_mut(base) {
                *counter += 1;
                return format!("{}-{}", base, counter);
            }
            current = directory.parent;
        }
        self.directories[id.0].names.insert(base.to_string(), 0);
        base.to_string()
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}
