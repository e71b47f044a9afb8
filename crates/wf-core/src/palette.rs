//! Built-in component palette.
//!
//! Static catalogue of the workflow steps a user can drag onto the canvas,
//! grouped into categories. Read-only for the lifetime of the process.

use crate::model::{NodeData, NodeType};
use serde::Serialize;

/// A template the user can drop onto the canvas to create a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteItem {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
}

impl PaletteItem {
    /// Node payload copied from this template.
    pub fn to_node_data(&self) -> NodeData {
        NodeData {
            label: self.label.to_string(),
            node_type: self.node_type,
            description: Some(self.description.to_string()),
            icon: Some(self.icon.to_string()),
            settings: None,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

static BUILTIN: [PaletteItem; 10] = [
    // Triggers
    PaletteItem {
        id: "manual-trigger",
        node_type: NodeType::Trigger,
        label: "Manual Trigger",
        description: "Manually start workflow",
        icon: "Play",
        category: "Triggers",
    },
    PaletteItem {
        id: "webhook-trigger",
        node_type: NodeType::Trigger,
        label: "Webhook",
        description: "Start workflow on HTTP request",
        icon: "Webhook",
        category: "Triggers",
    },
    PaletteItem {
        id: "timer-trigger",
        node_type: NodeType::Timer,
        label: "Schedule",
        description: "Start workflow on schedule",
        icon: "Clock",
        category: "Triggers",
    },
    // Actions
    PaletteItem {
        id: "http-request",
        node_type: NodeType::Action,
        label: "HTTP Request",
        description: "Make HTTP API call",
        icon: "Globe",
        category: "Actions",
    },
    PaletteItem {
        id: "send-email",
        node_type: NodeType::Action,
        label: "Send Email",
        description: "Send email notification",
        icon: "Mail",
        category: "Actions",
    },
    PaletteItem {
        id: "database-query",
        node_type: NodeType::Action,
        label: "Database Query",
        description: "Execute database query",
        icon: "Database",
        category: "Actions",
    },
    PaletteItem {
        id: "transform-data",
        node_type: NodeType::Action,
        label: "Transform Data",
        description: "Transform and format data",
        icon: "RefreshCw",
        category: "Actions",
    },
    // Logic
    PaletteItem {
        id: "if-condition",
        node_type: NodeType::Condition,
        label: "IF Condition",
        description: "Branch workflow based on condition",
        icon: "GitBranch",
        category: "Logic",
    },
    PaletteItem {
        id: "filter-condition",
        node_type: NodeType::Condition,
        label: "Filter",
        description: "Filter data based on criteria",
        icon: "Filter",
        category: "Logic",
    },
    PaletteItem {
        id: "switch-condition",
        node_type: NodeType::Condition,
        label: "Switch",
        description: "Multiple condition branching",
        icon: "Split",
        category: "Logic",
    },
];

/// The full built-in catalogue in display order.
pub fn builtin() -> &'static [PaletteItem] {
    &BUILTIN
}

/// Look up a palette item by its id.
pub fn find(id: &str) -> Option<&'static PaletteItem> {
    BUILTIN.iter().find(|item| item.id == id)
}

/// Distinct categories in first-appearance order.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for item in &BUILTIN {
        if !out.contains(&item.category) {
            out.push(item.category);
        }
    }
    out
}

/// Items whose label or description contains `query`, ignoring case.
/// An empty query matches everything; whitespace is matched literally.
pub fn search(query: &str) -> Vec<&'static PaletteItem> {
    let needle = query.to_lowercase();
    BUILTIN
        .iter()
        .filter(|item| needle.is_empty() || item.matches(&needle))
        .collect()
}

/// A palette section as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteGroup {
    pub category: &'static str,
    pub items: Vec<&'static PaletteItem>,
}

/// Search results bucketed by category; categories with no hits are omitted.
pub fn grouped(query: &str) -> Vec<PaletteGroup> {
    let hits = search(query);
    categories()
        .into_iter()
        .filter_map(|category| {
            let items: Vec<_> = hits
                .iter()
                .copied()
                .filter(|item| item.category == category)
                .collect();
            (!items.is_empty()).then_some(PaletteGroup { category, items })
        })
        .collect()
}
