//! Canvas module - layered character grids, collision planes, compositing
//!
//! This crate holds the pure, I/O-free half of the rendering pipeline:
//!
//! - [`grid`]: flat row-major storage shared by every plane
//! - [`layers`]: the five-layer character canvas and drawing primitives
//! - [`collision`]: static/dynamic integer collision planes
//! - [`compose`]: per-frame flattening with fixed z-order occlusion
//!
//! Nothing here touches a terminal or a clock, so everything is unit
//! testable. The terminal crate consumes [`FrameBuffer`] values produced
//! by [`compose_into`] and diffs them against the previously presented
//! frame.

pub mod collision;
pub mod compose;
pub mod grid;
pub mod layers;

pub use collision::{CollisionField, NO_COLLISION};
pub use compose::{compose_into, frame_buffer_for, FrameBuffer};
pub use grid::Grid;
pub use layers::LayerCanvas;
