//! In-memory hierarchical filesystem.
//!
//! The disk is a flat map from absolute path keys (`/a/b`) to entries; a
//! directory entry additionally keeps its child names in creation order,
//! which is the order listings hand back. Every operation resolves its path
//! against the current directory first, and unresolvable paths behave
//! exactly like absent ones: reads miss and writes fail, nothing faults.

mod path;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use self::path::{join, resolve};

/// Entry type code: nothing at the path.
pub const TYPE_NONE: i64 = 0;
/// Entry type code: a file.
pub const TYPE_FILE: i64 = 1;
/// Entry type code: a directory.
pub const TYPE_DIR: i64 = 2;

#[derive(Clone, Debug)]
enum Node {
    File(String),
    Dir(Vec<String>),
}

#[derive(Clone, Debug)]
struct Entry {
    node: Node,
    created_at: i64,
    edited_at: i64,
}

impl Entry {
    fn new(node: Node) -> Entry {
        let stamp = now_millis();
        Entry { node, created_at: stamp, edited_at: stamp }
    }
}

/// The virtual disk plus the shell's current directory.
pub struct MemoryFs {
    entries: HashMap<String, Entry>,
    cwd: Vec<String>,
}

impl MemoryFs {
    /// An empty disk holding only the root directory, with the current
    /// directory at the root.
    pub fn new() -> MemoryFs {
        let mut entries = HashMap::new();
        entries.insert("/".to_string(), Entry::new(Node::Dir(Vec::new())));
        MemoryFs { entries, cwd: Vec::new() }
    }

    /// Current directory as absolute components; empty at the root.
    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    fn entry(&self, path: &str) -> Option<&Entry> {
        let parts = resolve(&self.cwd, path)?;
        self.entries.get(&join(&parts))
    }

    /// Entry type at a path: [`TYPE_NONE`], [`TYPE_FILE`] or [`TYPE_DIR`].
    pub fn file_type(&self, path: &str) -> i64 {
        match self.entry(path).map(|entry| &entry.node) {
            None => TYPE_NONE,
            Some(Node::File(_)) => TYPE_FILE,
            Some(Node::Dir(_)) => TYPE_DIR,
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.file_type(path) != TYPE_NONE
    }

    /// A file's content. Directories and absent paths read as `None`.
    pub fn read_file(&self, path: &str) -> Option<String> {
        match &self.entry(path)?.node {
            Node::File(content) => Some(content.clone()),
            Node::Dir(_) => None,
        }
    }

    /// A directory's child names in creation order. Files and absent paths
    /// list as `None`.
    pub fn read_dir(&self, path: &str) -> Option<Vec<String>> {
        match &self.entry(path)?.node {
            Node::Dir(children) => Some(children.clone()),
            Node::File(_) => None,
        }
    }

    /// Milliseconds since the epoch when the entry was created.
    pub fn created_at(&self, path: &str) -> Option<i64> {
        self.entry(path).map(|entry| entry.created_at)
    }

    /// Milliseconds since the epoch when the entry last changed. For a
    /// directory that includes children being linked or unlinked.
    pub fn edited_at(&self, path: &str) -> Option<i64> {
        self.entry(path).map(|entry| entry.edited_at)
    }

    /// Creates or overwrites a file.
    ///
    /// Fails when the path is unresolvable or the root, names an existing
    /// directory, or its parent is not an existing directory. Overwriting
    /// keeps the creation timestamp and the parent's single child link.
    pub fn write_file(&mut self, path: &str, content: &str) -> bool {
        let Some(parts) = resolve(&self.cwd, path) else {
            return false;
        };
        let Some((name, ancestors)) = parts.split_last() else {
            return false;
        };
        let key = join(&parts);

        let exists_as_file = match self.entries.get(&key).map(|entry| &entry.node) {
            Some(Node::Dir(_)) => return false,
            Some(Node::File(_)) => true,
            None => false,
        };
        if exists_as_file {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.node = Node::File(content.to_string());
                entry.edited_at = now_millis();
            }
            return true;
        }

        if !self.link_child(&join(ancestors), name) {
            return false;
        }
        self.entries.insert(key, Entry::new(Node::File(content.to_string())));
        true
    }

    /// Creates a directory, missing ancestors included. True when the path
    /// already is a directory; false when it or any ancestor is a file.
    pub fn mkdir(&mut self, path: &str) -> bool {
        let Some(parts) = resolve(&self.cwd, path) else {
            return false;
        };
        self.mkdir_parts(&parts)
    }

    fn mkdir_parts(&mut self, parts: &[String]) -> bool {
        let key = join(parts);
        match self.entries.get(&key).map(|entry| &entry.node) {
            Some(Node::Dir(_)) => return true,
            Some(Node::File(_)) => return false,
            None => {}
        }
        // The root always exists, so absent paths have a last component.
        let Some((name, ancestors)) = parts.split_last() else {
            return true;
        };
        if !self.mkdir_parts(ancestors) {
            return false;
        }
        if !self.link_child(&join(ancestors), name) {
            return false;
        }
        self.entries.insert(key, Entry::new(Node::Dir(Vec::new())));
        true
    }

    /// Removes an empty directory. The root is never removable.
    pub fn rmdir(&mut self, path: &str) -> bool {
        let Some(parts) = resolve(&self.cwd, path) else {
            return false;
        };
        let key = join(&parts);
        let removable = !parts.is_empty()
            && matches!(
                self.entries.get(&key),
                Some(Entry { node: Node::Dir(children), .. }) if children.is_empty()
            );
        if !removable {
            return false;
        }
        self.entries.remove(&key);
        if let Some((name, ancestors)) = parts.split_last() {
            self.unlink_child(&join(ancestors), name);
        }
        true
    }

    /// Removes a file.
    pub fn rm_file(&mut self, path: &str) -> bool {
        let Some(parts) = resolve(&self.cwd, path) else {
            return false;
        };
        let key = join(&parts);
        if !matches!(
            self.entries.get(&key),
            Some(Entry { node: Node::File(_), .. })
        ) {
            return false;
        }
        self.entries.remove(&key);
        if let Some((name, ancestors)) = parts.split_last() {
            self.unlink_child(&join(ancestors), name);
        }
        true
    }

    /// Moves the current directory to `path` when something exists there.
    pub fn change_dir(&mut self, path: &str) -> bool {
        match resolve(&self.cwd, path) {
            Some(parts) if self.entries.contains_key(&join(&parts)) => {
                self.cwd = parts;
                true
            }
            _ => false,
        }
    }

    /// Records `name` as a child of `parent_key`. Fails when the parent is
    /// not an existing directory.
    fn link_child(&mut self, parent_key: &str, name: &str) -> bool {
        match self.entries.get_mut(parent_key) {
            Some(Entry { node: Node::Dir(children), edited_at, .. }) => {
                children.push(name.to_string());
                *edited_at = now_millis();
                true
            }
            _ => false,
        }
    }

    fn unlink_child(&mut self, parent_key: &str, name: &str) {
        if let Some(Entry { node: Node::Dir(children), edited_at, .. }) =
            self.entries.get_mut(parent_key)
        {
            children.retain(|child| child != name);
            *edited_at = now_millis();
        }
    }
}

impl Default for MemoryFs {
    fn default() -> MemoryFs {
        MemoryFs::new()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
