//! Drop placement: screen coordinates → grid-aligned graph position.
//!
//! The host reports drops in client pixels. Placement subtracts the canvas
//! element's origin, inverts the viewport transform, and snaps each axis to
//! the grid. Everything here is pure.

use crate::model::{Position, Viewport};

/// Default grid spacing in graph-space units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Convert a client-space point into canvas-relative pixels.
pub fn canvas_relative(client: Position, canvas_origin: Position) -> Position {
    Position::new(client.x - canvas_origin.x, client.y - canvas_origin.y)
}

/// Invert the viewport transform: `graph = (screen - pan) / zoom`.
///
/// A non-positive or non-finite zoom is treated as 1.
pub fn screen_to_graph(screen: Position, viewport: Viewport) -> Position {
    let zoom = if viewport.zoom.is_finite() && viewport.zoom > 0.0 {
        viewport.zoom
    } else {
        1.0
    };
    Position::new((screen.x - viewport.x) / zoom, (screen.y - viewport.y) / zoom)
}

/// Round one coordinate to the nearest multiple of `grid_size`.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap both axes independently. Idempotent for any grid size.
pub fn snap(position: Position, grid_size: f64) -> Position {
    Position::new(
        snap_value(position.x, grid_size),
        snap_value(position.y, grid_size),
    )
}

/// Full drop pipeline for a canvas-relative point.
///
/// Returns `None` when the result is not finite (a NaN or infinite pointer
/// coordinate or pan), since such a position cannot be persisted.
pub fn place(screen: Position, viewport: Viewport, grid_size: Option<f64>) -> Option<Position> {
    let raw = screen_to_graph(screen, viewport);
    let placed = match grid_size {
        Some(grid) => snap(raw, grid),
        None => raw,
    };
    placed.is_finite().then_some(placed)
}
