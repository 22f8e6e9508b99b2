//! TUI Arcade (workspace facade crate).
//!
//! Re-exports the member crates under one roof so applications can depend
//! on `tui_arcade::{engine, term, ...}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use tui_arcade_audio as audio;
pub use tui_arcade_canvas as canvas;
pub use tui_arcade_engine as engine;
pub use tui_arcade_input as input;
pub use tui_arcade_term as term;
pub use tui_arcade_types as types;
