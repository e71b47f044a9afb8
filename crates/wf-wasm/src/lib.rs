//! WASM bridge for the workflow editor. Exposes the Rust editor session to
//! the JavaScript canvas host.
//!
//! Compiled via `wasm-pack build --target web`. The host keeps rendering,
//! hit-testing, and pan/zoom; every edit it observes is forwarded here and
//! the resulting document is read back with `graph_json`.
//!
//! Methods that can fail return a JSON string: `{"ok":true,...}` or
//! `{"ok":false,"kind":"...","error":"..."}`. Plain edits return `bool`
//! ("did anything change").

mod browser;
mod console;

use browser::{AnchorDownload, LocalStorage};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use wf_core::{
    EditorConfig, NodeDataPatch, NodeId, NodeType, Position, Viewport, WorkflowError, palette,
};
use wf_editor::{EditorSession, GraphMutation, Modifiers, ShortcutAction};

/// The main WASM-facing editor controller.
///
/// Holds the editor session. All interaction from the host JS goes
/// through this struct.
#[wasm_bindgen]
pub struct WorkflowCanvas {
    session: EditorSession,
}

#[wasm_bindgen]
impl WorkflowCanvas {
    /// Create a controller on the initial document.
    ///
    /// `config_json` is a (possibly partial) `EditorConfig` object; an empty
    /// or invalid string falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: EditorSession::new(parse_config(config_json)),
        }
    }

    /// Set the console log level (`"error"` … `"trace"`, or `"off"`).
    pub fn set_log_level(&self, level: &str) {
        console::init(console::parse_level(level));
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// The current document (`{nodes, edges, viewport}`) as compact JSON.
    pub fn graph_json(&self) -> String {
        match wf_core::serialize(&self.session.graph) {
            Ok(text) => text,
            Err(e) => error_response(&e),
        }
    }

    /// Palette groups matching `query` (empty = everything).
    pub fn palette_json(&self, query: &str) -> String {
        serde_json::to_string(&palette::grouped(query)).unwrap_or_else(|_| "[]".to_string())
    }

    /// Handle layout for a node type name, or `null` for unknown types.
    pub fn ports_json(&self, node_type: &str) -> String {
        NodeType::from_name(node_type)
            .and_then(|t| serde_json::to_string(t.ports()).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Selected node and edge ids: `{"nodes":[...],"edges":[...]}`.
    pub fn selected_ids(&self) -> String {
        let selection = &self.session.selection;
        json!({
            "nodes": selection.nodes.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
            "edges": selection.edges.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        })
        .to_string()
    }

    // ─── Palette drag & drop ─────────────────────────────────────────────

    /// Remember which palette item is being dragged. Returns `false` for
    /// unknown ids.
    pub fn begin_drag(&mut self, item_id: &str) -> bool {
        self.session.begin_drag(item_id)
    }

    pub fn cancel_drag(&mut self) {
        self.session.cancel_drag();
    }

    /// Drop the dragged item at a client-space point. `origin_x/y` is the
    /// canvas element's bounding box origin. Returns the new node.
    pub fn drop_at(&mut self, client_x: f64, client_y: f64, origin_x: f64, origin_y: f64) -> String {
        let dropped = self.session.drop_at(
            Position::new(client_x, client_y),
            Position::new(origin_x, origin_y),
        );
        match dropped {
            Some(node) => ok_with("node", serde_json::to_value(node).unwrap_or(Value::Null)),
            None => json!({ "ok": false, "kind": "noDrag", "error": "no palette item was placed" })
                .to_string(),
        }
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Connect two nodes. Empty handle strings mean the default handle.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: &str,
        target_handle: &str,
    ) -> String {
        let connected = existing_node(source)
            .and_then(|source| existing_node(target).map(|target| (source, target)))
            .and_then(|(source, target)| {
                self.session.graph.connect(
                    source,
                    target,
                    non_empty(source_handle),
                    non_empty(target_handle),
                )
            })
            .map(|edge| serde_json::to_value(edge).unwrap_or(Value::Null));
        match connected {
            Ok(edge) => ok_with("edge", edge),
            Err(e) => error_response(&e),
        }
    }

    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(id) = NodeId::lookup(id) else {
            return false;
        };
        self.apply(GraphMutation::MoveNode {
            id,
            position: Position::new(x, y),
        })
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        NodeId::lookup(id).is_some_and(|id| self.apply(GraphMutation::RemoveNode { id }))
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        NodeId::lookup(id).is_some_and(|id| self.apply(GraphMutation::RemoveEdge { id }))
    }

    /// Replace the selection from two JSON arrays of ids.
    pub fn set_selection(&mut self, nodes_json: &str, edges_json: &str) -> bool {
        let nodes = parse_ids(nodes_json);
        let edges = parse_ids(edges_json);
        self.apply(GraphMutation::Select { nodes, edges })
    }

    pub fn delete_selected(&mut self) -> bool {
        self.apply(GraphMutation::RemoveSelection)
    }

    /// Apply a settings-panel patch (`{label?, description?, icon?, settings?}`).
    pub fn update_node_data(&mut self, id: &str, patch_json: &str) -> String {
        let patch: NodeDataPatch = match serde_json::from_str(patch_json) {
            Ok(p) => p,
            Err(e) => return error_response(&WorkflowError::MalformedDocument(e.to_string())),
        };
        let id = match self.graph_node(id) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        };
        let changed = self.apply(GraphMutation::UpdateNodeData { id, patch });
        ok_with("changed", Value::Bool(changed))
    }

    /// Mirror the host's viewport after pan/zoom.
    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) -> bool {
        self.apply(GraphMutation::SetViewport(Viewport { x, y, zoom }))
    }

    /// Handle a key event. Returns `{"action":"<name>"|null,"changed":bool}`
    /// plus the result of any document action the key triggered.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let outcome = self.session.handle_key(key, mods);
        let mut response = json!({
            "action": outcome.action.map(ShortcutAction::name),
            "changed": outcome.changed,
        });
        if let Some(action) = outcome.action.filter(|a| !a.is_edit()) {
            let result = self.dispatch_document_action(action);
            response["result"] = serde_json::from_str(&result).unwrap_or(Value::Null);
        }
        response.to_string()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Save to `localStorage` under the configured key.
    pub fn save_local(&self) -> String {
        let saved = LocalStorage::open().and_then(|mut store| self.session.save_local(&mut store));
        status_response(saved)
    }

    /// Load from `localStorage`. On failure the current graph is kept.
    pub fn load_local(&mut self) -> String {
        let loaded = LocalStorage::open().and_then(|store| self.session.load_local(&store));
        self.loaded_response(loaded)
    }

    /// Download the document as a `.json` file.
    pub fn export_file(&self) -> String {
        status_response(self.session.export_file(&mut AnchorDownload))
    }

    /// Replace the graph with an exported document's text.
    pub fn import_json(&mut self, text: &str) -> String {
        let loaded = self.session.import_text(text);
        self.loaded_response(loaded)
    }

    /// Log the graph to the console. Returns the run summary.
    pub fn run(&self) -> String {
        let summary = self.session.run();
        ok_with("summary", serde_json::to_value(summary).unwrap_or(Value::Null))
    }
}

impl WorkflowCanvas {
    fn graph_node(&self, id: &str) -> wf_core::Result<NodeId> {
        existing_node(id).and_then(|node| {
            if self.session.graph.contains_node(node) {
                Ok(node)
            } else {
                Err(WorkflowError::InvalidReference { id: id.to_string() })
            }
        })
    }

    fn apply(&mut self, mutation: GraphMutation) -> bool {
        match self.session.apply(mutation) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("edit rejected: {e}");
                false
            }
        }
    }

    fn loaded_response(&self, loaded: wf_core::Result<()>) -> String {
        match loaded {
            Ok(()) => json!({ "ok": true, "viewport": self.session.graph.viewport }).to_string(),
            Err(e) => error_response(&e),
        }
    }

    fn dispatch_document_action(&mut self, action: ShortcutAction) -> String {
        match action {
            ShortcutAction::Save => self.save_local(),
            ShortcutAction::Load => self.load_local(),
            ShortcutAction::Export => self.export_file(),
            ShortcutAction::Run => self.run(),
            ShortcutAction::Delete | ShortcutAction::SelectAll | ShortcutAction::Deselect => {
                json!({ "ok": true }).to_string()
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse_config(config_json: &str) -> EditorConfig {
    if config_json.trim().is_empty() {
        return EditorConfig::default();
    }
    serde_json::from_str(config_json).unwrap_or_else(|e| {
        log::warn!("ignoring invalid editor config: {e}");
        EditorConfig::default()
    })
}

/// Ids the host names that were never interned cannot be in the graph;
/// they are dropped here instead of being interned.
fn parse_ids(json: &str) -> Vec<NodeId> {
    serde_json::from_str::<Vec<String>>(json)
        .map(|ids| ids.iter().filter_map(|s| NodeId::lookup(s)).collect())
        .unwrap_or_default()
}

/// Resolve a host-supplied node id without interning unknown strings.
fn existing_node(id: &str) -> wf_core::Result<NodeId> {
    NodeId::lookup(id).ok_or_else(|| WorkflowError::InvalidReference { id: id.to_string() })
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn error_kind(err: &WorkflowError) -> &'static str {
    match err {
        WorkflowError::InvalidReference { .. } => "invalidReference",
        WorkflowError::DuplicateId { .. } => "duplicateId",
        WorkflowError::MalformedDocument(_) => "malformedDocument",
        WorkflowError::NotFound { .. } => "notFound",
        WorkflowError::Storage(_) => "storage",
    }
}

fn error_response(err: &WorkflowError) -> String {
    json!({ "ok": false, "kind": error_kind(err), "error": err.to_string() }).to_string()
}

fn ok_with(key: &str, value: Value) -> String {
    let mut response = json!({ "ok": true });
    response[key] = value;
    response.to_string()
}

fn status_response(result: wf_core::Result<()>) -> String {
    match result {
        Ok(()) => json!({ "ok": true }).to_string(),
        Err(e) => {
            log::warn!("{e}");
            error_response(&e)
        }
    }
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("workflow editor panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            console::init(log::LevelFilter::Info);
        });
    }
}
