//! Input module - platform event drain and per-frame input state.

pub mod events;
pub mod state;

pub use events::{EventSource, NullEvents, TerminalEvents};
pub use state::InputState;

// Re-exported so downstream crates can name keys and buttons without a
// direct crossterm dependency.
pub use crossterm::event::{KeyCode, MouseButton};
