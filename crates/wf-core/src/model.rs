//! Core data model for workflow documents.
//!
//! A workflow is a directed graph: nodes are placed workflow steps, edges are
//! connections between an output handle on one node and an input handle on
//! another. Field names and shapes match the persisted JSON document so the
//! same types serve the store, the codec, and the rendering host.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Renderer key the host uses to pick the node component.
pub const DEFAULT_RENDERER: &str = "workflowNode";

/// Free-form per-node settings (a JSON object).
pub type Settings = Map<String, Value>;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite (JSON has no NaN or infinity).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Canvas pan offset and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Finite pan and a finite, positive zoom.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

// ─── Node types & ports ──────────────────────────────────────────────────

/// The closed set of workflow step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Trigger,
    Action,
    Condition,
    Timer,
}

/// A connection point on a node. `id: None` is the node's default handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Port {
    pub id: Option<&'static str>,
    pub label: Option<&'static str>,
}

/// Input and output handles the renderer draws for a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortLayout {
    pub input: Option<Port>,
    pub outputs: &'static [Port],
}

const DEFAULT_PORT: Port = Port {
    id: None,
    label: None,
};

static SINGLE_OUTPUT: [Port; 1] = [DEFAULT_PORT];

static BRANCH_OUTPUTS: [Port; 2] = [
    Port {
        id: Some("true"),
        label: Some("True"),
    },
    Port {
        id: Some("false"),
        label: Some("False"),
    },
];

/// Port table, one row per node type. Triggers start a workflow so they
/// take no input; conditions branch on two named outputs.
static PORT_TABLE: [(NodeType, PortLayout); 4] = [
    (
        NodeType::Trigger,
        PortLayout {
            input: None,
            outputs: &SINGLE_OUTPUT,
        },
    ),
    (
        NodeType::Action,
        PortLayout {
            input: Some(DEFAULT_PORT),
            outputs: &SINGLE_OUTPUT,
        },
    ),
    (
        NodeType::Condition,
        PortLayout {
            input: Some(DEFAULT_PORT),
            outputs: &BRANCH_OUTPUTS,
        },
    ),
    (
        NodeType::Timer,
        PortLayout {
            input: Some(DEFAULT_PORT),
            outputs: &SINGLE_OUTPUT,
        },
    ),
];

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Trigger,
        NodeType::Action,
        NodeType::Condition,
        NodeType::Timer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::Action => "action",
            NodeType::Condition => "condition",
            NodeType::Timer => "timer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Handle layout for this type, looked up in the port table.
    pub fn ports(self) -> &'static PortLayout {
        PORT_TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, layout)| layout)
            .unwrap_or(&PORT_TABLE[1].1)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Payload shown on a node card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// A placed workflow step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    /// Host component key (`type` in the document).
    #[serde(rename = "type", default = "default_renderer")]
    pub renderer: String,
    pub position: Position,
    pub data: NodeData,
}

fn default_renderer() -> String {
    DEFAULT_RENDERER.to_string()
}

impl WorkflowNode {
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self {
            id,
            renderer: default_renderer(),
            position,
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type
    }
}

/// Partial update from the node settings panel. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub settings: Option<Settings>,
}

impl NodeDataPatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.settings.is_none()
    }

    /// Apply onto `data`. An empty description clears it.
    pub fn apply_to(self, data: &mut NodeData) {
        if let Some(label) = self.label {
            data.label = label;
        }
        if let Some(description) = self.description {
            data.description = (!description.is_empty()).then_some(description);
        }
        if let Some(icon) = self.icon {
            data.icon = Some(icon);
        }
        if let Some(settings) = self.settings {
            data.settings = Some(settings);
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(
        rename = "sourceHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_handle: Option<String>,
    #[serde(
        rename = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

impl WorkflowEdge {
    /// Whether this edge starts or ends at `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// The id the host assigns to a fresh connection:
    /// `xy-edge__{source}{sourceHandle}-{target}{targetHandle}`.
    pub fn conventional_id(
        source: NodeId,
        target: NodeId,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) -> String {
        format!(
            "xy-edge__{}{}-{}{}",
            source.as_str(),
            source_handle.unwrap_or_default(),
            target.as_str(),
            target_handle.unwrap_or_default()
        )
    }
}
