//! Static and dynamic collision planes.
//!
//! Two integer grids share the canvas coordinate space. Game logic tags
//! cells during its step; queries outside the grid read as 0 and writes
//! outside are dropped, same clipping policy as the character layers.

use tui_arcade_types::CollisionKind;

use crate::grid::Grid;

/// Collision tag meaning "nothing here".
pub const NO_COLLISION: i32 = 0;

/// Paired static/dynamic collision grids.
///
/// The scheduler clears the dynamic plane after every frame; the static
/// plane persists until game logic clears it explicitly.
#[derive(Debug, Clone)]
pub struct CollisionField {
    static_plane: Grid<i32>,
    dynamic_plane: Grid<i32>,
}

impl CollisionField {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            static_plane: Grid::new(width, height, NO_COLLISION),
            dynamic_plane: Grid::new(width, height, NO_COLLISION),
        }
    }

    fn plane(&self, kind: CollisionKind) -> &Grid<i32> {
        match kind {
            CollisionKind::Static => &self.static_plane,
            CollisionKind::Dynamic => &self.dynamic_plane,
        }
    }

    fn plane_mut(&mut self, kind: CollisionKind) -> &mut Grid<i32> {
        match kind {
            CollisionKind::Static => &mut self.static_plane,
            CollisionKind::Dynamic => &mut self.dynamic_plane,
        }
    }

    /// Collision tag at a cell; out-of-bounds reads as [`NO_COLLISION`].
    pub fn get(&self, x: i32, y: i32, kind: CollisionKind) -> i32 {
        self.plane(kind).get_i32(x, y).unwrap_or(NO_COLLISION)
    }

    /// Tag a cell; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, kind: CollisionKind, value: i32) {
        self.plane_mut(kind).set_i32(x, y, value);
    }

    /// Reset every cell of one plane to [`NO_COLLISION`].
    pub fn clear(&mut self, kind: CollisionKind) {
        self.plane_mut(kind).fill(NO_COLLISION);
    }
}
