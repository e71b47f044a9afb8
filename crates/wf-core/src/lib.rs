pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod id;
pub mod model;
pub mod palette;
pub mod placement;

pub use config::EditorConfig;
pub use document::{WorkflowDocument, deserialize, serialize, serialize_pretty};
pub use error::{Result, WorkflowError};
pub use graph::WorkflowGraph;
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use palette::PaletteItem;
