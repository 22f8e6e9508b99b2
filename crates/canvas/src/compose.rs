//! Layer compositor: flattens the five layers into one frame buffer.
//!
//! Occlusion model, not alpha blending: per cell, exactly one layer wins.
//! Covering priority lowest to highest is background < entity < foreground
//! < ui < debug, with debug participating only when enabled. A layer's
//! cell reaches the output only when every enabled layer above it is
//! blank; background always contributes when everything above it is blank.

use tui_arcade_types::{Cell, Layer};

use crate::grid::Grid;
use crate::layers::LayerCanvas;

/// Flattened character+color grid; also the shape of the previous-frame
/// buffer the renderer diffs against.
pub type FrameBuffer = Grid<Cell>;

/// Allocate a frame buffer matching the canvas dimensions.
pub fn frame_buffer_for(canvas: &LayerCanvas) -> FrameBuffer {
    Grid::new(canvas.width(), canvas.height(), Cell::default())
}

/// Resolve all layers into `out`. `out` must match the canvas dimensions;
/// it is fully overwritten.
pub fn compose_into(canvas: &LayerCanvas, debug_enabled: bool, out: &mut FrameBuffer) {
    debug_assert_eq!(out.width(), canvas.width());
    debug_assert_eq!(out.height(), canvas.height());

    let background = canvas.plane(Layer::Background);
    let entity = canvas.plane(Layer::Entity);
    let foreground = canvas.plane(Layer::Foreground);
    let ui = canvas.plane(Layer::Ui);
    let debug = canvas.plane(Layer::Debug);

    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let dbg = debug.get(x, y).unwrap_or_default();
            let ui_cell = ui.get(x, y).unwrap_or_default();
            let fg = foreground.get(x, y).unwrap_or_default();
            let ent = entity.get(x, y).unwrap_or_default();

            let winner = if debug_enabled && !dbg.is_blank() {
                dbg
            } else if !ui_cell.is_blank() {
                ui_cell
            } else if !fg.is_blank() {
                fg
            } else if !ent.is_blank() {
                ent
            } else {
                background.get(x, y).unwrap_or_default()
            };
            out.set(x, y, winner);
        }
    }
}
