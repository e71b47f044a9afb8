//! Editor configuration.

use crate::placement::DEFAULT_GRID_SIZE;
use serde::{Deserialize, Serialize};

/// Storage key the editor saves under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "workflow";

/// File name offered for exported documents.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "workflow.json";

/// Settings for an editor session.
///
/// Every field has a default, so the host may pass a partial JSON object
/// (e.g. `{"gridSize": 10}`) and get the rest filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Grid spacing in graph units. Default: **20**.
    pub grid_size: f64,

    /// Snap dropped nodes to the grid. Default: **true**.
    pub snap_to_grid: bool,

    /// Key used by save/load in the host's key-value store.
    /// Default: **"workflow"**.
    pub storage_key: String,

    /// Download name for exports. Default: **"workflow.json"**.
    pub export_file_name: String,

    /// Indent exported JSON for readability. Local saves are always
    /// compact. Default: **true**.
    pub pretty_export: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: true,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            pretty_export: true,
        }
    }
}

impl EditorConfig {
    /// Grid size to snap with, or `None` when snapping is off.
    pub fn snap_grid(&self) -> Option<f64> {
        self.snap_to_grid.then_some(self.grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"gridSize": 10, "storageKey": "draft"}"#).unwrap();
        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.storage_key, "draft");
        assert!(config.snap_to_grid);
        assert_eq!(config.export_file_name, DEFAULT_EXPORT_FILE_NAME);
    }

    #[test]
    fn snapping_can_be_disabled() {
        let config = EditorConfig {
            snap_to_grid: false,
            ..Default::default()
        };
        assert_eq!(config.snap_grid(), None);
        assert_eq!(EditorConfig::default().snap_grid(), Some(20.0));
    }
}
