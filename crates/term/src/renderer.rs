//! TerminalSurface: flushes composited frames to a real terminal.
//!
//! Presents diff against the previously flushed frame cell by cell; a
//! mismatch in character or either color channel marks the cell dirty.
//! Dirty cells coalesce into horizontal runs, encode into one queued
//! byte buffer, and flush in a single write. A frame with zero dirty
//! cells writes nothing at all.

use std::io::{self, Write};

use anyhow::Result;
use log::trace;

use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use tui_arcade_canvas::FrameBuffer;
use tui_arcade_engine::Surface;
use tui_arcade_types::{Cell, CellColor, Rgb};

pub struct TerminalSurface {
    stdout: io::Stdout,
    /// Exactly what was last flushed to the terminal; `None` forces the
    /// next present to redraw everything.
    prev: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            prev: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    /// Switch the terminal into game mode: raw input, alternate screen,
    /// hidden cursor, mouse reporting, key release events where the
    /// terminal supports them.
    pub fn enter(&mut self, title: &str) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(terminal::SetTitle(title))?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.buf.queue(EnableMouseCapture)?;
        self.buf.queue(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
        self.flush_buf()?;
        Ok(())
    }

    /// Restore the terminal. Safe to call after a failed run.
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(PopKeyboardEnhancementFlags)?;
        self.buf.queue(DisableMouseCapture)?;
        self.buf.queue(ResetColor)?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<bool> {
        self.buf.clear();
        let dirty = match &self.prev {
            Some(prev)
                if prev.width() == frame.width() && prev.height() == frame.height() =>
            {
                encode_diff_into(prev, frame, &mut self.buf)?
            }
            _ => {
                encode_full_into(frame, &mut self.buf)?;
                frame.cells().len()
            }
        };

        if dirty > 0 {
            self.flush_buf()?;
            trace!("present: {dirty} dirty cell(s)");
        }

        // The previous buffer must always mirror what is on screen.
        match &mut self.prev {
            Some(prev) => prev.clone_from(frame),
            None => self.prev = Some(frame.clone()),
        }
        Ok(dirty > 0)
    }

    /// Forget the on-screen state so the next present redraws every cell.
    /// Needed after a terminal resize or a font change in the hosting
    /// terminal, when what is actually displayed can no longer be
    /// trusted.
    fn invalidate(&mut self) {
        self.prev = None;
    }
}

/// Encode a full-frame redraw into `out`.
pub fn encode_full_into(frame: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut current: Option<CellColor> = None;
    for y in 0..frame.height() {
        out.queue(cursor::MoveTo(0, y))?;
        for x in 0..frame.width() {
            let cell = frame.get(x, y).unwrap_or_default();
            queue_cell(out, cell, &mut current)?;
        }
    }

    out.queue(ResetColor)?;
    Ok(())
}

/// Encode only the changed runs between `prev` and `next` into `out`.
/// Returns the number of dirty cells; zero means `out` was left empty.
pub fn encode_diff_into(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    out: &mut Vec<u8>,
) -> Result<usize> {
    let mut current: Option<CellColor> = None;
    let mut dirty = 0usize;

    for_each_changed_run(prev, next, |x, y, len| {
        dirty += usize::from(len);
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            queue_cell(out, cell, &mut current)?;
        }
        Ok(())
    })?;

    if dirty > 0 {
        out.queue(ResetColor)?;
    }
    Ok(dirty)
}

fn queue_cell(out: &mut Vec<u8>, cell: Cell, current: &mut Option<CellColor>) -> Result<()> {
    if *current != Some(cell.color) {
        out.queue(SetForegroundColor(rgb_to_color(cell.color.fg)))?;
        out.queue(SetBackgroundColor(rgb_to_color(cell.color.bg)))?;
        *current = Some(cell.color);
    }
    out.queue(Print(cell.ch))?;
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Walk the changed cells of two same-sized frames as horizontal runs.
fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    debug_assert_eq!(prev.width(), next.width());
    debug_assert_eq!(prev.height(), next.height());

    let w = next.width();
    let h = next.height();

    for y in 0..h {
        let mut x = 0;
        while x < w {
            let a = prev.get(x, y).unwrap_or_default();
            let b = next.get(x, y).unwrap_or_default();
            if a == b {
                x += 1;
                continue;
            }

            let start = x;
            x += 1;
            while x < w {
                let a2 = prev.get(x, y).unwrap_or_default();
                let b2 = next.get(x, y).unwrap_or_default();
                if a2 == b2 {
                    break;
                }
                x += 1;
            }
            f(start, y, x - start)?;
        }
    }

    Ok(())
}
