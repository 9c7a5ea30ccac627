// src/graph/tree.rs
// =============================================================================
// The owned, serializable view of a crawl result.
//
// The graph store is a graph: two parents can share a child, and a module can
// (indirectly) depend on one of its ancestors. Callers want a tree, so we
// walk from the root and copy every node we reach.
//
// Shared children are copied under each parent. A child that is already on
// the path from the root is a back-edge; it is emitted once, without its
// dependencies, and flagged with `cycle: true` so the walk terminates.
//
// Rust concepts:
// - Recursion with a `&mut Vec` path: push on the way down, pop on the way up
// - #[serde(skip_serializing_if)]: `cycle` only shows up in JSON when true
// =============================================================================

use serde::Serialize;

use super::store::{ArtifactId, Graph};

/// A module and everything it (transitively) depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub version: String,
    /// Set when this entry points back to one of its own ancestors
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cycle: bool,
    pub dependencies: Vec<Artifact>,
}

impl Artifact {
    pub(super) fn expand(graph: &Graph, root: ArtifactId) -> Option<Self> {
        graph.node(root)?;
        let mut path = Vec::new();
        Some(Self::expand_node(graph, root, &mut path))
    }

    fn expand_node(graph: &Graph, id: ArtifactId, path: &mut Vec<ArtifactId>) -> Self {
        // Handles only come from this store, so this can't really miss
        let Some(node) = graph.node(id) else {
            return Self::leaf(String::new(), String::new(), false);
        };

        // Back-edge to an ancestor
        if path.contains(&id) {
            return Self::leaf(node.name.clone(), node.version.clone(), true);
        }

        path.push(id);
        let dependencies = node
            .dependencies
            .iter()
            .map(|child| Self::expand_node(graph, *child, path))
            .collect();
        path.pop();

        Self {
            name: node.name.clone(),
            version: node.version.clone(),
            cycle: false,
            dependencies,
        }
    }

    fn leaf(name: String, version: String, cycle: bool) -> Self {
        Self {
            name,
            version,
            cycle,
            dependencies: Vec::new(),
        }
    }

    /// Number of entries in this tree, including self
    pub fn size(&self) -> usize {
        1 + self.dependencies.iter().map(Artifact::size).sum::<usize>()
    }

    /// Longest root-to-leaf chain, counting both ends
    pub fn depth(&self) -> usize {
        1 + self.dependencies.iter().map(Artifact::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphStore;

    #[test]
    fn test_tree_copies_shared_children() {
        let store = GraphStore::new();
        let root = store.insert_root("root");
        let (a, _) = store.get_or_create("a", "v1");
        let (b, _) = store.get_or_create("b", "v1");
        let (shared, _) = store.get_or_create("shared", "v2");
        store.append_dependency(root, a);
        store.append_dependency(root, b);
        store.append_dependency(a, shared);
        store.append_dependency(b, shared);

        let tree = store.tree(root).unwrap();
        assert_eq!(tree.dependencies.len(), 2);
        assert_eq!(tree.dependencies[0].dependencies[0].name, "shared");
        assert_eq!(tree.dependencies[1].dependencies[0].name, "shared");
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_tree_stops_at_back_edge() {
        let store = GraphStore::new();
        let root = store.insert_root("root");
        let (child, _) = store.get_or_create("child", "v1");
        store.append_dependency(root, child);
        store.append_dependency(child, root);

        let tree = store.tree(root).unwrap();
        let back = &tree.dependencies[0].dependencies[0];
        assert_eq!(back.name, "root");
        assert!(back.cycle);
        assert!(back.dependencies.is_empty());
    }

    #[test]
    fn test_cycle_flag_omitted_from_json() {
        let store = GraphStore::new();
        let root = store.insert_root("github.com/user/repo");

        let json = serde_json::to_value(store.tree(root).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "github.com/user/repo",
                "version": "",
                "dependencies": []
            })
        );
    }
}
