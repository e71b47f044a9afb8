//! JSON document codec: `WorkflowGraph` ↔ `{ nodes, edges, viewport }`.
//!
//! The same document is written to local storage (compact) and to exported
//! files (pretty). Loading validates the whole document before building a
//! graph, so a failed load never yields a partially populated graph.

use crate::error::{Result, WorkflowError};
use crate::graph::WorkflowGraph;
use crate::model::{Viewport, WorkflowEdge, WorkflowNode};
use serde::{Deserialize, Serialize};

/// The persisted shape of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl WorkflowDocument {
    /// Snapshot a graph in insertion order.
    pub fn from_graph(graph: &WorkflowGraph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
            viewport: graph.viewport,
        }
    }

    /// Build a graph, rejecting duplicate ids and dangling edges.
    ///
    /// # Errors
    /// `MalformedDocument` describing the first violation found.
    pub fn into_graph(self) -> Result<WorkflowGraph> {
        let mut graph = WorkflowGraph::new();
        graph.viewport = self.viewport;

        for node in self.nodes {
            let id = node.id;
            if !graph.insert_node(node) {
                return Err(WorkflowError::MalformedDocument(format!(
                    "duplicate node id '{id}'"
                )));
            }
        }

        for edge in self.edges {
            let id = edge.id;
            graph.insert_edge(edge).map_err(|err| {
                WorkflowError::MalformedDocument(format!("edge '{id}': {err}"))
            })?;
        }

        Ok(graph)
    }
}

/// Serialize to compact JSON (local storage form).
///
/// # Errors
/// Only if a settings value cannot be represented as JSON.
pub fn serialize(graph: &WorkflowGraph) -> Result<String> {
    Ok(serde_json::to_string(&WorkflowDocument::from_graph(graph))?)
}

/// Serialize to 2-space indented JSON (export form).
///
/// # Errors
/// Only if a settings value cannot be represented as JSON.
pub fn serialize_pretty(graph: &WorkflowGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&WorkflowDocument::from_graph(
        graph,
    ))?)
}

/// Parse and validate a document into a new graph.
///
/// # Errors
/// `MalformedDocument` if the text is not JSON, `nodes`/`edges` are missing
/// or not arrays, a node lacks `id`/`data.label`/`data.type` or has an
/// unknown type, an edge lacks `id`/`source`/`target`, ids repeat, or an
/// edge points at a node that is not in the document.
pub fn deserialize(text: &str) -> Result<WorkflowGraph> {
    let document: WorkflowDocument = serde_json::from_str(text)?;
    document.into_graph()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{NodeType, Position};
    use crate::palette;
    use pretty_assertions::assert_eq;

    fn sample_graph() -> WorkflowGraph {
        let mut graph = WorkflowGraph::initial();
        let start = NodeId::intern("1");
        let cond = graph
            .add_node(
                Position::new(300.0, 240.0),
                palette::find("if-condition").unwrap(),
            )
            .id;
        let mail = graph
            .add_node(
                Position::new(520.0, 160.0),
                palette::find("send-email").unwrap(),
            )
            .id;
        graph.connect(start, cond, None, None).unwrap();
        graph.connect(cond, mail, Some("true"), None).unwrap();
        graph.viewport = Viewport {
            x: -12.5,
            y: 40.0,
            zoom: 0.75,
        };
        graph
    }

    fn assert_malformed(text: &str) {
        match deserialize(text) {
            Err(WorkflowError::MalformedDocument(_)) => {}
            other => panic!("expected MalformedDocument for {text}, got {other:?}"),
        }
    }

    #[test]
    fn roundtrip_preserves_graph() {
        let graph = sample_graph();
        let text = serialize(&graph).unwrap();
        assert_eq!(deserialize(&text).unwrap(), graph);

        let pretty = serialize_pretty(&graph).unwrap();
        assert!(pretty.contains("\n  \"nodes\""));
        assert_eq!(deserialize(&pretty).unwrap(), graph);
    }

    #[test]
    fn top_level_keys() {
        let value: serde_json::Value =
            serde_json::from_str(&serialize(&sample_graph()).unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["edges", "nodes", "viewport"]);
    }

    #[test]
    fn accepts_host_written_document() {
        let text = r#"{
            "nodes": [
                {"id":"1","type":"workflowNode","position":{"x":100,"y":240},
                 "data":{"label":"Start","type":"trigger","description":"Workflow starting point","icon":"Play"},
                 "measured":{"width":200,"height":62},"selected":false},
                {"id":"1700000000000","type":"workflowNode","position":{"x":140,"y":120},
                 "data":{"label":"HTTP Request","type":"action"}}
            ],
            "edges": [
                {"source":"1","sourceHandle":null,"target":"1700000000000","targetHandle":null,
                 "id":"xy-edge__1-1700000000000"}
            ],
            "viewport": {"x":0,"y":0,"zoom":1}
        }"#;
        let graph = deserialize(text).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let action = graph.node(NodeId::intern("1700000000000")).unwrap();
        assert_eq!(action.node_type(), NodeType::Action);
    }

    #[test]
    fn missing_viewport_defaults() {
        let graph = deserialize(r#"{"nodes":[],"edges":[]}"#).unwrap();
        assert_eq!(graph.viewport, Viewport::default());
    }

    #[test]
    fn rejects_structural_problems() {
        assert_malformed("not json");
        assert_malformed("[]");
        assert_malformed(r#"{"nodes":{},"edges":[]}"#);
        assert_malformed(r#"{"nodes":[],"edges":"none"}"#);
        assert_malformed(r#"{"edges":[]}"#);
        // node without id
        assert_malformed(
            r#"{"nodes":[{"position":{"x":0,"y":0},"data":{"label":"A","type":"action"}}],"edges":[]}"#,
        );
        // node without a type
        assert_malformed(
            r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A"}}],"edges":[]}"#,
        );
        // type outside the closed set
        assert_malformed(
            r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A","type":"loop"}}],"edges":[]}"#,
        );
        // edge without target
        assert_malformed(
            r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A","type":"action"}}],
                "edges":[{"id":"e","source":"a"}]}"#,
        );
    }

    #[test]
    fn rejects_duplicates_and_dangling_edges() {
        assert_malformed(
            r#"{"nodes":[
                {"id":"a","position":{"x":0,"y":0},"data":{"label":"A","type":"action"}},
                {"id":"a","position":{"x":1,"y":1},"data":{"label":"B","type":"action"}}
            ],"edges":[]}"#,
        );
        assert_malformed(
            r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A","type":"action"}}],
                "edges":[{"id":"e","source":"a","target":"zzz"}]}"#,
        );
        assert_malformed(
            r#"{"nodes":[{"id":"a","position":{"x":0,"y":0},"data":{"label":"A","type":"action"}}],
                "edges":[{"id":"e","source":"a","target":"a"},{"id":"e","source":"a","target":"a"}]}"#,
        );
    }

    #[test]
    fn settings_survive_roundtrip() {
        let mut graph = WorkflowGraph::initial();
        let mut settings = serde_json::Map::new();
        settings.insert("event".into(), serde_json::json!("Webhook"));
        settings.insert("retries".into(), serde_json::json!(3));
        graph.update_node_data(
            NodeId::intern("1"),
            crate::model::NodeDataPatch {
                settings: Some(settings.clone()),
                ..Default::default()
            },
        );
        let back = deserialize(&serialize(&graph).unwrap()).unwrap();
        let node = back.node(NodeId::intern("1")).unwrap();
        assert_eq!(node.data.settings.as_ref(), Some(&settings));
    }
}
