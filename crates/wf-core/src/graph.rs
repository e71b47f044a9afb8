//! The workflow graph store.
//!
//! Nodes and edges live in a `StableDiGraph` so indices survive removals and
//! deleting a node drops its incident edges in the same step. Lookups by id
//! go through `node_index` / `edge_index`; document order is kept in
//! explicit order lists because the stable graph recycles vacant slots.

use crate::error::{Result, WorkflowError};
use crate::id::{EdgeId, NodeId};
use crate::model::*;
use crate::palette::PaletteItem;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::HashMap;

/// The authoritative node/edge collections plus the viewport.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    graph: StableDiGraph<WorkflowNode, WorkflowEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    node_order: Vec<NodeIndex>,
    edge_order: Vec<EdgeIndex>,

    /// Canvas pan/zoom, persisted with the document.
    pub viewport: Viewport,
}

impl WorkflowGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The document a fresh editor opens with: a single `Start` trigger.
    #[must_use]
    pub fn initial() -> Self {
        let mut graph = Self::new();
        graph.insert_node(WorkflowNode::new(
            NodeId::intern("1"),
            Position::new(100.0, 240.0),
            NodeData {
                label: "Start".into(),
                node_type: NodeType::Trigger,
                description: Some("Workflow starting point".into()),
                icon: Some("Play".into()),
                settings: None,
            },
        ));
        graph
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty() && self.edge_order.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&WorkflowNode> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&WorkflowEdge> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> + '_ {
        self.node_order.iter().map(|idx| &self.graph[*idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &WorkflowEdge> + '_ {
        self.edge_order.iter().map(|idx| &self.graph[*idx])
    }

    /// Edges that start or end at `id`, in insertion order.
    pub fn incident_edges(&self, id: NodeId) -> Vec<&WorkflowEdge> {
        self.edges().filter(|e| e.touches(id)).collect()
    }

    /// Nodes with no incoming connection, in insertion order.
    pub fn entry_points(&self) -> Vec<&WorkflowNode> {
        self.node_order
            .iter()
            .filter(|idx| {
                self.graph
                    .edges_directed(**idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[*idx])
            .collect()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Place a new node built from a palette template. Never fails.
    pub fn add_node(&mut self, position: Position, item: &PaletteItem) -> &WorkflowNode {
        let id = NodeId::generate(|candidate| {
            NodeId::lookup(candidate).is_some_and(|id| self.contains_node(id))
        });
        let node = WorkflowNode::new(id, position, item.to_node_data());
        log::debug!(
            "add node {id} ({}) at ({}, {})",
            item.id,
            position.x,
            position.y
        );
        let idx = self.push_node(node);
        &self.graph[idx]
    }

    /// Insert a fully built node. Returns `false` (and changes nothing)
    /// when the id is already taken.
    pub fn insert_node(&mut self, node: WorkflowNode) -> bool {
        if self.contains_node(node.id) {
            return false;
        }
        self.push_node(node);
        true
    }

    fn push_node(&mut self, node: WorkflowNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(idx);
        idx
    }

    /// Connect two existing nodes. Parallel edges and self-loops are allowed.
    ///
    /// # Errors
    /// `InvalidReference` if either endpoint is missing; the edge set is
    /// left unchanged.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) -> Result<&WorkflowEdge> {
        let id = self.unique_edge_id(&WorkflowEdge::conventional_id(
            source,
            target,
            source_handle,
            target_handle,
        ));
        let edge = WorkflowEdge {
            id,
            source,
            target,
            source_handle: source_handle.map(str::to_string),
            target_handle: target_handle.map(str::to_string),
        };
        let idx = self.insert_edge(edge)?;
        log::debug!("connect {source} -> {target} as {id}");
        Ok(&self.graph[idx])
    }

    /// Insert a fully built edge after checking its id is free and both
    /// endpoints exist.
    ///
    /// # Errors
    /// `DuplicateId` if the edge id is taken, otherwise `InvalidReference`
    /// naming the first missing endpoint. The graph is unchanged on error.
    pub fn insert_edge(&mut self, edge: WorkflowEdge) -> Result<EdgeIndex> {
        if self.contains_edge(edge.id) {
            return Err(WorkflowError::DuplicateId {
                id: edge.id.to_string(),
            });
        }
        let (Some(&from), Some(&to)) = (
            self.node_index.get(&edge.source),
            self.node_index.get(&edge.target),
        ) else {
            let missing = if self.contains_node(edge.source) {
                edge.target
            } else {
                edge.source
            };
            return Err(WorkflowError::InvalidReference {
                id: missing.to_string(),
            });
        };
        let id = edge.id;
        let idx = self.graph.add_edge(from, to, edge);
        self.edge_index.insert(id, idx);
        self.edge_order.push(idx);
        Ok(idx)
    }

    /// `base`, or `base-N` for the first free N. Taken candidates are
    /// already interned, so only the returned id is added to the interner.
    fn unique_edge_id(&self, base: &str) -> EdgeId {
        let is_free = |candidate: &str| {
            NodeId::lookup(candidate).is_none_or(|id| !self.contains_edge(id))
        };
        if is_free(base) {
            return NodeId::intern(base);
        }
        let mut n = 1u64;
        loop {
            let candidate = format!("{base}-{n}");
            if is_free(&candidate) {
                return NodeId::intern(&candidate);
            }
            n += 1;
        }
    }

    /// Remove a node and every edge touching it. Returns `false` if absent.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.node_index.remove(&id) else {
            return false;
        };

        let mut incident: SmallVec<[EdgeIndex; 4]> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        // A self-loop shows up in both directions
        incident.sort();
        incident.dedup();

        for edge_idx in &incident {
            if let Some(edge) = self.graph.edge_weight(*edge_idx) {
                self.edge_index.remove(&edge.id);
            }
        }
        self.edge_order.retain(|e| !incident.contains(e));
        self.node_order.retain(|n| *n != idx);
        // Removing the node also drops its incident edges from the graph
        self.graph.remove_node(idx);

        log::debug!("delete node {id} (+{} edges)", incident.len());
        true
    }

    /// Remove a single edge. Returns `false` if absent.
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        let Some(idx) = self.edge_index.remove(&id) else {
            return false;
        };
        self.edge_order.retain(|e| *e != idx);
        self.graph.remove_edge(idx);
        log::debug!("delete edge {id}");
        true
    }

    /// Bulk delete: the named nodes (cascading) and the named edges.
    /// Unknown ids are ignored. Returns `true` if anything was removed.
    pub fn delete_selection(&mut self, nodes: &[NodeId], edges: &[EdgeId]) -> bool {
        let mut changed = false;
        for id in nodes {
            changed |= self.delete_node(*id);
        }
        for id in edges {
            changed |= self.delete_edge(*id);
        }
        changed
    }

    /// Update a node's position. Returns `false` if absent or if either
    /// coordinate is not finite.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> bool {
        if !position.is_finite() {
            log::warn!("ignoring non-finite move of {id} to ({}, {})", position.x, position.y);
            return false;
        }
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Apply a settings-panel edit. The node type is never changed.
    /// Returns `false` if the node is absent.
    pub fn update_node_data(&mut self, id: NodeId, patch: NodeDataPatch) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                patch.apply_to(&mut node.data);
                log::debug!("update data of {id}");
                true
            }
            None => false,
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut WorkflowNode> {
        self.node_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }
}

impl PartialEq for WorkflowGraph {
    fn eq(&self, other: &Self) -> bool {
        self.viewport == other.viewport
            && self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && self.nodes().eq(other.nodes())
            && self.edges().eq(other.edges())
    }
}
