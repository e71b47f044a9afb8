//! Editor session: the explicit context every edit goes through.
//!
//! The session owns the authoritative `WorkflowGraph` together with the
//! state the canvas host would otherwise keep globally: the current
//! selection, the palette item being dragged, and the editor config.
//!
//! - **Canvas → Graph**: the host reports interaction as `GraphMutation`s
//!   (move, connect, delete, select…). `apply` is the single dispatch point.
//! - **Graph → Storage**: save/load/export serialize the graph through the
//!   `KeyValueStore` / `FileSink` seams. Loads validate first and replace
//!   the graph wholesale, so a failed load leaves the session untouched.

use crate::shortcuts::{Modifiers, ShortcutAction, ShortcutMap};
use crate::storage::{FileSink, KeyValueStore};
use serde::Serialize;
use wf_core::placement::{self, canvas_relative};
use wf_core::{
    EdgeId, EditorConfig, NodeDataPatch, NodeId, NodeType, PaletteItem, Position, Result,
    Viewport, WorkflowError, WorkflowGraph, WorkflowNode, document, palette,
};

/// Nodes and edges currently selected on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Drop ids that no longer exist in `graph`.
    fn prune(&mut self, graph: &WorkflowGraph) {
        self.nodes.retain(|id| graph.contains_node(*id));
        self.edges.retain(|id| graph.contains_edge(*id));
    }
}

/// What a "Run" produced. Nothing is executed; the graph is only logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub trigger_ids: Vec<String>,
}

/// Result of routing a key press through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The resolved action, if the key is bound.
    pub action: Option<ShortcutAction>,
    /// Whether the graph or selection changed.
    pub changed: bool,
}

/// The editor session holds the authoritative workflow graph.
pub struct EditorSession {
    /// The current workflow (single source of truth).
    pub graph: WorkflowGraph,

    /// Current canvas selection.
    pub selection: Selection,

    pub config: EditorConfig,

    /// Palette item picked up by a drag that has not dropped yet.
    dragging: Option<&'static PaletteItem>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Open a session on the initial document (a single `Start` trigger).
    pub fn new(config: EditorConfig) -> Self {
        Self::with_graph(WorkflowGraph::initial(), config)
    }

    pub fn with_graph(graph: WorkflowGraph, config: EditorConfig) -> Self {
        Self {
            graph,
            selection: Selection::default(),
            config,
            dragging: None,
        }
    }

    // ─── Palette drag & drop ─────────────────────────────────────────────

    /// Start dragging a palette item. Returns `false` for unknown ids.
    pub fn begin_drag(&mut self, item_id: &str) -> bool {
        self.dragging = palette::find(item_id);
        if self.dragging.is_none() {
            log::warn!("drag started with unknown palette item '{item_id}'");
        }
        self.dragging.is_some()
    }

    pub fn cancel_drag(&mut self) {
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<&'static PaletteItem> {
        self.dragging
    }

    /// Finish a drag: place the dragged item at a client-space point.
    /// A drop with nothing being dragged, or at a non-finite point, is
    /// ignored; either way the drag ends.
    pub fn drop_at(&mut self, client: Position, canvas_origin: Position) -> Option<&WorkflowNode> {
        let item = self.dragging.take()?;
        self.place_item(item, canvas_relative(client, canvas_origin))
    }

    /// Place `item` at a canvas-relative point using the current viewport
    /// and grid settings. Returns `None` if the point does not resolve to a
    /// finite graph position.
    pub fn place_item(&mut self, item: &PaletteItem, screen: Position) -> Option<&WorkflowNode> {
        let Some(position) =
            placement::place(screen, self.graph.viewport, self.config.snap_grid())
        else {
            log::warn!("dropped '{}' at a non-finite position", item.id);
            return None;
        };
        Some(self.graph.add_node(position, item))
    }

    // ─── Canvas → Graph ──────────────────────────────────────────────────

    /// Apply a mutation reported by the canvas host.
    /// Returns whether the graph or selection changed.
    ///
    /// # Errors
    /// `InvalidReference` from `Connect` when an endpoint is missing.
    pub fn apply(&mut self, mutation: GraphMutation) -> Result<bool> {
        let changed = match mutation {
            GraphMutation::AddNode { item, position } if position.is_finite() => {
                self.graph.add_node(position, item);
                true
            }
            GraphMutation::AddNode { .. } => false,
            GraphMutation::MoveNode { id, position } => self.graph.move_node(id, position),
            GraphMutation::Connect {
                source,
                target,
                source_handle,
                target_handle,
            } => {
                self.graph.connect(
                    source,
                    target,
                    source_handle.as_deref(),
                    target_handle.as_deref(),
                )?;
                true
            }
            GraphMutation::RemoveNode { id } => self.graph.delete_node(id),
            GraphMutation::RemoveEdge { id } => self.graph.delete_edge(id),
            GraphMutation::RemoveSelection => {
                let selection = std::mem::take(&mut self.selection);
                let removed = self
                    .graph
                    .delete_selection(&selection.nodes, &selection.edges);
                removed || !selection.is_empty()
            }
            GraphMutation::UpdateNodeData { id, patch } => {
                !patch.is_empty() && self.graph.update_node_data(id, patch)
            }
            GraphMutation::SetViewport(viewport) if !viewport.is_valid() => {
                log::warn!("ignoring invalid viewport {viewport:?}");
                false
            }
            GraphMutation::SetViewport(viewport) => {
                let changed = self.graph.viewport != viewport;
                self.graph.viewport = viewport;
                changed
            }
            GraphMutation::Select { nodes, edges } => {
                let next = Selection { nodes, edges };
                let changed = next != self.selection;
                self.selection = next;
                self.selection.prune(&self.graph);
                changed
            }
        };

        self.selection.prune(&self.graph);
        Ok(changed)
    }

    /// Select every node and edge.
    pub fn select_all(&mut self) -> bool {
        let next = Selection {
            nodes: self.graph.nodes().map(|n| n.id).collect(),
            edges: self.graph.edges().map(|e| e.id).collect(),
        };
        let changed = next != self.selection;
        self.selection = next;
        changed
    }

    /// Route a key press through the shortcut map. Edit actions are applied
    /// here; document actions (save, load, export, run) are returned for the
    /// host to carry out with its store and sink.
    pub fn handle_key(&mut self, key: &str, mods: Modifiers) -> KeyOutcome {
        let action = ShortcutMap::resolve(key, mods);
        let changed = match action {
            Some(ShortcutAction::Delete) => self
                .apply(GraphMutation::RemoveSelection)
                .unwrap_or(false),
            Some(ShortcutAction::Deselect) => {
                let had = !self.selection.is_empty();
                self.selection.clear();
                had
            }
            Some(ShortcutAction::SelectAll) => self.select_all(),
            _ => false,
        };
        KeyOutcome { action, changed }
    }

    // ─── Graph → Storage ─────────────────────────────────────────────────

    /// Write the compact document under the configured storage key.
    ///
    /// # Errors
    /// Whatever the store reports.
    pub fn save_local(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let text = document::serialize(&self.graph)?;
        store.set(&self.config.storage_key, &text)?;
        log::info!(
            "saved workflow ({} nodes, {} edges) under '{}'",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.config.storage_key
        );
        Ok(())
    }

    /// Replace the graph with the document saved under the storage key.
    ///
    /// # Errors
    /// `NotFound` if nothing was saved, `MalformedDocument` if the saved
    /// text fails validation. The current graph is unchanged on error.
    pub fn load_local(&mut self, store: &dyn KeyValueStore) -> Result<()> {
        let key = &self.config.storage_key;
        let Some(text) = store.get(key)? else {
            log::warn!("load requested but nothing saved under '{key}'");
            return Err(WorkflowError::NotFound { key: key.clone() });
        };
        self.import_text(&text)
    }

    /// Replace the graph with a document given as text (file import).
    ///
    /// # Errors
    /// `MalformedDocument`; the current graph is unchanged on error.
    pub fn import_text(&mut self, text: &str) -> Result<()> {
        let graph = document::deserialize(text).inspect_err(|err| {
            log::warn!("workflow load rejected: {err}");
        })?;
        self.replace_graph(graph);
        Ok(())
    }

    fn replace_graph(&mut self, graph: WorkflowGraph) {
        log::info!(
            "loaded workflow ({} nodes, {} edges)",
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = graph;
        self.selection.clear();
        self.dragging = None;
    }

    /// The document as it would be exported.
    ///
    /// # Errors
    /// Only if a settings value cannot be represented as JSON.
    pub fn export_text(&self) -> Result<String> {
        if self.config.pretty_export {
            document::serialize_pretty(&self.graph)
        } else {
            document::serialize(&self.graph)
        }
    }

    /// Hand the exported document to the download sink.
    ///
    /// # Errors
    /// Whatever the sink reports.
    pub fn export_file(&self, sink: &mut dyn FileSink) -> Result<()> {
        let text = self.export_text()?;
        sink.download(&self.config.export_file_name, &text)?;
        log::info!("exported workflow as '{}'", self.config.export_file_name);
        Ok(())
    }

    // ─── Run ─────────────────────────────────────────────────────────────

    /// Log the current nodes and edges. There is no execution engine.
    pub fn run(&self) -> RunSummary {
        for node in self.graph.nodes() {
            log::info!(
                "run: node {} [{}] '{}' at ({}, {})",
                node.id,
                node.node_type().as_str(),
                node.data.label,
                node.position.x,
                node.position.y
            );
        }
        for edge in self.graph.edges() {
            log::info!(
                "run: edge {} {}{} -> {}{}",
                edge.id,
                edge.source,
                edge.source_handle
                    .as_deref()
                    .map(|h| format!(":{h}"))
                    .unwrap_or_default(),
                edge.target,
                edge.target_handle
                    .as_deref()
                    .map(|h| format!(":{h}"))
                    .unwrap_or_default()
            );
        }

        RunSummary {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            trigger_ids: self
                .graph
                .nodes()
                .filter(|n| n.node_type() == NodeType::Trigger)
                .map(|n| n.id.to_string())
                .collect(),
        }
    }
}

/// A mutation the canvas host can request.
#[derive(Debug, Clone)]
pub enum GraphMutation {
    /// Place a palette item at an already resolved graph position.
    AddNode {
        item: &'static PaletteItem,
        position: Position,
    },
    MoveNode {
        id: NodeId,
        position: Position,
    },
    Connect {
        source: NodeId,
        target: NodeId,
        source_handle: Option<String>,
        target_handle: Option<String>,
    },
    RemoveNode {
        id: NodeId,
    },
    RemoveEdge {
        id: EdgeId,
    },
    /// Delete everything currently selected (keyboard delete).
    RemoveSelection,
    /// Settings-panel edit of label / description / icon / settings.
    UpdateNodeData {
        id: NodeId,
        patch: NodeDataPatch,
    },
    SetViewport(Viewport),
    /// Replace the selection. Unknown ids are dropped.
    Select {
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemorySink, MemoryStore};
    use pretty_assertions::assert_eq;

    fn start() -> NodeId {
        NodeId::intern("1")
    }

    #[test]
    fn drop_places_dragged_item_on_grid() {
        let mut session = EditorSession::default();
        assert!(session.begin_drag("http-request"));
        let node = session
            .drop_at(Position::new(393.0, 201.0), Position::new(260.0, 80.0))
            .unwrap()
            .clone();
        assert_eq!(node.position, Position::new(140.0, 120.0));
        assert_eq!(node.data.label, "HTTP Request");
        assert!(session.dragging().is_none());
    }

    #[test]
    fn drop_without_drag_is_ignored() {
        let mut session = EditorSession::default();
        assert!(session.drop_at(Position::new(10.0, 10.0), Position::default()).is_none());
        assert!(!session.begin_drag("no-such-item"));
        assert!(session.drop_at(Position::new(10.0, 10.0), Position::default()).is_none());
        assert_eq!(session.graph.node_count(), 1);
    }

    #[test]
    fn drop_without_snapping_keeps_raw_position() {
        let config = EditorConfig {
            snap_to_grid: false,
            ..Default::default()
        };
        let mut session = EditorSession::new(config);
        session.begin_drag("send-email");
        let node = session
            .drop_at(Position::new(133.0, 121.0), Position::default())
            .unwrap();
        assert_eq!(node.position, Position::new(133.0, 121.0));
    }

    #[test]
    fn non_finite_input_never_reaches_the_document() {
        let mut session = EditorSession::default();
        let before = session.graph.clone();

        session.begin_drag("http-request");
        assert!(session.drop_at(Position::new(f64::NAN, 5.0), Position::default()).is_none());
        assert!(session.dragging().is_none());

        let item = palette::find("send-email").unwrap();
        let moved = session
            .apply(GraphMutation::MoveNode {
                id: start(),
                position: Position::new(f64::INFINITY, 0.0),
            })
            .unwrap();
        let added = session
            .apply(GraphMutation::AddNode {
                item,
                position: Position::new(0.0, f64::NAN),
            })
            .unwrap();
        let panned = session
            .apply(GraphMutation::SetViewport(Viewport {
                x: f64::NAN,
                y: 0.0,
                zoom: 1.0,
            }))
            .unwrap();
        let zoomed = session
            .apply(GraphMutation::SetViewport(Viewport {
                x: 0.0,
                y: 0.0,
                zoom: f64::INFINITY,
            }))
            .unwrap();
        assert!(!moved && !added && !panned && !zoomed);
        assert_eq!(session.graph, before);

        let mut store = MemoryStore::new();
        session.save_local(&mut store).unwrap();
        session.load_local(&store).unwrap();
        assert_eq!(session.graph, before);
    }

    #[test]
    fn keyboard_delete_removes_selection() {
        let mut session = EditorSession::default();
        session.begin_drag("send-email");
        let mail = session
            .drop_at(Position::new(300.0, 200.0), Position::default())
            .unwrap()
            .id;
        session
            .apply(GraphMutation::Connect {
                source: start(),
                target: mail,
                source_handle: None,
                target_handle: None,
            })
            .unwrap();
        session
            .apply(GraphMutation::Select {
                nodes: vec![start()],
                edges: vec![],
            })
            .unwrap();

        let outcome = session.handle_key("Backspace", Modifiers::default());
        assert_eq!(outcome.action, Some(ShortcutAction::Delete));
        assert!(outcome.changed);
        assert_eq!(session.graph.node_count(), 1);
        assert_eq!(session.graph.edge_count(), 0);
        assert!(session.selection.is_empty());
    }

    #[test]
    fn selection_drops_deleted_ids() {
        let mut session = EditorSession::default();
        session
            .apply(GraphMutation::Select {
                nodes: vec![start(), NodeId::intern("ghost")],
                edges: vec![],
            })
            .unwrap();
        assert_eq!(session.selection.nodes, vec![start()]);

        session.apply(GraphMutation::RemoveNode { id: start() }).unwrap();
        assert!(session.selection.is_empty());
    }

    #[test]
    fn connect_error_propagates() {
        let mut session = EditorSession::default();
        let err = session
            .apply(GraphMutation::Connect {
                source: start(),
                target: NodeId::intern("ghost"),
                source_handle: None,
                target_handle: None,
            })
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidReference { .. }));
    }

    #[test]
    fn document_shortcuts_are_returned_to_host() {
        let mut session = EditorSession::default();
        let mods = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        let outcome = session.handle_key("s", mods);
        assert_eq!(outcome.action, Some(ShortcutAction::Save));
        assert!(!outcome.changed);
    }

    #[test]
    fn load_without_save_is_not_found() {
        let mut session = EditorSession::default();
        let before = session.graph.clone();
        let store = MemoryStore::new();
        let err = session.load_local(&store).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotFound {
                key: "workflow".into()
            }
        );
        assert_eq!(session.graph, before);
    }

    #[test]
    fn save_then_load_replaces_graph() {
        let mut session = EditorSession::default();
        let mut store = MemoryStore::new();
        session.save_local(&mut store).unwrap();
        let saved = session.graph.clone();

        session.apply(GraphMutation::RemoveNode { id: start() }).unwrap();
        assert_eq!(session.graph.node_count(), 0);

        session.load_local(&store).unwrap();
        assert_eq!(session.graph, saved);
    }

    #[test]
    fn export_uses_configured_name_and_pretty_json() {
        let session = EditorSession::default();
        let mut sink = MemorySink::new();
        session.export_file(&mut sink).unwrap();
        let (name, contents) = sink.last().unwrap();
        assert_eq!(name, "workflow.json");
        assert!(contents.starts_with("{\n  \"nodes\""));
    }

    #[test]
    fn run_summarizes_without_mutating() {
        let session = EditorSession::default();
        let before = session.graph.clone();
        let summary = session.run();
        assert_eq!(
            summary,
            RunSummary {
                node_count: 1,
                edge_count: 0,
                trigger_ids: vec!["1".into()],
            }
        );
        assert_eq!(session.graph, before);
    }
}
