//! Terminal module - the crossterm-backed display surface.
//!
//! Implements the engine's [`Surface`](tui_arcade_engine::Surface) seam
//! over a real terminal: raw-mode setup/teardown and differential
//! redraw of composited frames. The encoding helpers are pure (they
//! write crossterm commands into a byte buffer), so the diff behavior is
//! unit-testable without a tty.

pub mod renderer;

pub use renderer::{encode_diff_into, encode_full_into, TerminalSurface};
