// src/graph/store.rs
// =============================================================================
// The shared dependency graph built during one crawl.
//
// The store is the dedup authority: it hands out exactly one node per
// identifier, no matter how many parents declare it or how many parse tasks
// race to create it.
//
// Layout:
// - nodes live in a Vec (an "arena") and are addressed by ArtifactId
// - an index maps identifier -> ArtifactId
// - a dependency list is a Vec<ArtifactId>, so two parents that depend on
//   the same module hold the *same* handle
//
// Everything sits behind ONE Mutex. There is no read/write split: every
// operation is short and the parse stage is the only writer.
//
// Rust concepts:
// - Mutex<T>: exclusive access to shared data from many tasks
// - Newtype (ArtifactId): a usize that can't be mixed up with other numbers
// =============================================================================

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::tree::Artifact;

/// Handle to a node in a GraphStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(usize);

/// One module in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNode {
    pub name: String,
    /// Empty for the root
    pub version: String,
    /// In the order append_dependency was called
    pub dependencies: Vec<ArtifactId>,
}

#[derive(Debug, Default)]
pub(super) struct Graph {
    index: HashMap<String, ArtifactId>,
    nodes: Vec<ArtifactNode>,
}

impl Graph {
    pub(super) fn node(&self, id: ArtifactId) -> Option<&ArtifactNode> {
        self.nodes.get(id.0)
    }
}

/// Lock-protected graph shared by every stage of a crawl
#[derive(Debug, Default)]
pub struct GraphStore {
    inner: Mutex<Graph>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic in another task while it held the lock can't leave the graph
    // half-written (every mutation is a single push), so a poisoned lock is
    // still safe to use.
    fn lock(&self) -> MutexGuard<'_, Graph> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates the root node (empty version) or returns the existing one
    pub fn insert_root(&self, name: &str) -> ArtifactId {
        self.get_or_create(name, "").0
    }

    // Returns the node for `name`, creating it if needed
    //
    // Returns: (id, was_created)
    //   was_created = true only for the single caller that inserted the node.
    //   The parse stage uses this to decide whether to queue the identifier,
    //   which is what stops the crawl from looping on repeated modules.
    //
    // The version is recorded on creation only; later declarations of the
    // same module with another version don't change it.
    pub fn get_or_create(&self, name: &str, version: &str) -> (ArtifactId, bool) {
        let mut graph = self.lock();

        if let Some(id) = graph.index.get(name) {
            return (*id, false);
        }

        let id = ArtifactId(graph.nodes.len());
        graph.nodes.push(ArtifactNode {
            name: name.to_string(),
            version: version.to_string(),
            dependencies: Vec::new(),
        });
        graph.index.insert(name.to_string(), id);
        (id, true)
    }

    // Makes `name` resolve to an existing node
    //
    // Used for the root, which is named after the seed address
    // (https://github.com/user/repo) while go.mod files spell the same
    // module github.com/user/repo. An index entry that already exists is
    // left alone.
    pub fn alias(&self, name: &str, id: ArtifactId) {
        let mut graph = self.lock();
        if id.0 < graph.nodes.len() {
            graph.index.entry(name.to_string()).or_insert(id);
        }
    }

    /// Records that `parent` depends on `child`
    pub fn append_dependency(&self, parent: ArtifactId, child: ArtifactId) {
        let mut graph = self.lock();
        debug_assert!(child.0 < graph.nodes.len(), "foreign artifact handle");
        if let Some(node) = graph.nodes.get_mut(parent.0) {
            node.dependencies.push(child);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ArtifactId> {
        self.lock().index.get(name).copied()
    }

    /// A copy of one node
    pub fn artifact(&self, id: ArtifactId) -> Option<ArtifactNode> {
        self.lock().node(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Expands the graph below `root` into an owned tree
    pub fn tree(&self, root: ArtifactId) -> Option<Artifact> {
        let graph = self.lock();
        Artifact::expand(&graph, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_or_create_dedups() {
        let store = GraphStore::new();
        let (first, created) = store.get_or_create("github.com/a/b", "v1.0.0");
        assert!(created);

        let (second, created) = store.get_or_create("github.com/a/b", "v9.9.9");
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);

        // The first version wins
        assert_eq!(store.artifact(first).unwrap().version, "v1.0.0");
    }

    #[test]
    fn test_root_has_empty_version() {
        let store = GraphStore::new();
        let root = store.insert_root("https://github.com/user/repo");
        let node = store.artifact(root).unwrap();
        assert_eq!(node.version, "");
        assert!(node.dependencies.is_empty());
        assert_eq!(store.insert_root("https://github.com/user/repo"), root);
    }

    #[test]
    fn test_shared_child_is_same_handle() {
        let store = GraphStore::new();
        let left = store.insert_root("left");
        let (right, _) = store.get_or_create("right", "v1");
        let (shared, _) = store.get_or_create("shared", "v2");

        store.append_dependency(left, shared);
        store.append_dependency(right, shared);

        let left_deps = store.artifact(left).unwrap().dependencies;
        let right_deps = store.artifact(right).unwrap().dependencies;
        assert_eq!(left_deps, vec![shared]);
        assert_eq!(right_deps, vec![shared]);
    }

    #[test]
    fn test_concurrent_get_or_create_creates_once() {
        let store = Arc::new(GraphStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_or_create("github.com/x/y", "v1").1)
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_alias_resolves_to_existing_node() {
        let store = GraphStore::new();
        let root = store.insert_root("https://github.com/user/repo");
        store.alias("github.com/user/repo", root);

        let (id, created) = store.get_or_create("github.com/user/repo", "v1.0.0");
        assert!(!created);
        assert_eq!(id, root);
        assert_eq!(store.len(), 1);

        // An existing entry is not redirected
        let (other, _) = store.get_or_create("github.com/other/repo", "v1");
        store.alias("github.com/other/repo", root);
        assert_eq!(store.lookup("github.com/other/repo"), Some(other));
    }

    #[test]
    fn test_lookup_unknown() {
        let store = GraphStore::new();
        assert!(store.lookup("nothing").is_none());
    }
}
