// Node registry - the node collection and current selection
use crate::domain::node::{NewNode, Node, NodeError};
use chrono::Utc;
use std::collections::HashSet;

/// Owned by the presentation root and handed to components by reference.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    selected_id: Option<String>,
}

impl NodeRegistry {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut registry = Self::default();
        registry.set_nodes(nodes);
        registry
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Replaces the whole collection. The selection id is kept as is and
    /// resolves to nothing if its node is gone.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        let mut seen = HashSet::new();
        self.nodes = nodes
            .into_iter()
            .filter(|node| {
                let fresh = seen.insert(node.id.clone());
                if !fresh {
                    tracing::warn!(id = %node.id, "Dropping node with duplicate id");
                }
                fresh
            })
            .collect();
    }

    /// Returns false and leaves the selection alone if no node has this id.
    pub fn select_node(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(id, "Ignoring selection of unknown node");
            return false;
        }
        self.selected_id = Some(id.to_string());
        true
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn add_node(&mut self, input: NewNode) -> Result<Node, NodeError> {
        let node = input.into_node(self.next_id())?;
        let mut nodes = self.nodes.clone();
        nodes.push(node.clone());
        self.set_nodes(nodes);
        Ok(node)
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let removed = self.get(id).cloned()?;
        let nodes = self.nodes.iter().filter(|n| n.id != id).cloned().collect();
        self.set_nodes(nodes);
        Some(removed)
    }

    /// Millisecond timestamp, bumped past any id already taken.
    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}
