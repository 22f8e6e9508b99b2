//! Event sources: feeding platform events into [`InputState`].

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::state::InputState;

/// One drain of the platform event queue per frame.
///
/// The scheduler is generic over this so tests and headless runs can
/// substitute scripted or empty sources.
pub trait EventSource {
    fn drain(&mut self, state: &mut InputState) -> Result<()>;
}

/// Crossterm-backed event source for a real terminal.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl TerminalEvents {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for TerminalEvents {
    fn drain(&mut self, state: &mut InputState) -> Result<()> {
        state.begin_frame();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            state.request_quit();
                        }
                        state.press_key(key.code);
                    }
                    KeyEventKind::Release => state.release_key(key.code),
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(button) => {
                        state.press_button(button);
                        state.set_mouse(mouse.column, mouse.row);
                    }
                    MouseEventKind::Up(button) => {
                        state.release_button(button);
                        state.set_mouse(mouse.column, mouse.row);
                    }
                    MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                        state.set_mouse(mouse.column, mouse.row);
                    }
                    MouseEventKind::ScrollUp => state.add_wheel(1),
                    MouseEventKind::ScrollDown => state.add_wheel(-1),
                    MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => {}
                },
                Event::Resize(_, _) => state.mark_resized(),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Event source that never produces events. Used by headless runs and
/// scheduler tests; the quit flag can still be raised via
/// [`InputState::request_quit`].
#[derive(Debug, Default)]
pub struct NullEvents;

impl EventSource for NullEvents {
    fn drain(&mut self, state: &mut InputState) -> Result<()> {
        state.begin_frame();
        Ok(())
    }
}
