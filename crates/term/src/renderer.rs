//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! States only touch the persistent `FrameBuffer` when something changed. The
//! renderer remembers what it last sent and repaints the changed spans of
//! each row; a missing or differently sized previous frame repaints everything.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

/// Horizontal run of cells on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub y: u16,
    pub len: u16,
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    sent: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            sent: None,
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    /// Raw mode on the alternate screen, cursor hidden.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf
            .queue(terminal::EnterAlternateScreen)?
            .queue(cursor::Hide)?
            .queue(terminal::DisableLineWrap)?;
        self.flush_buf()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        reset_pen(&mut self.buf)?;
        self.buf
            .queue(terminal::EnableLineWrap)?
            .queue(cursor::Show)?
            .queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Forget the last frame so the next draw repaints the whole screen.
    pub fn invalidate(&mut self) {
        self.sent = None;
    }

    pub fn draw(&mut self, fb: &FrameBuffer) -> Result<()> {
        if self.sent.as_ref() == Some(fb) {
            return Ok(());
        }
        self.buf.clear();
        encode_frame(self.sent.as_ref(), fb, &mut self.buf)?;
        match &mut self.sent {
            Some(sent) => sent.clone_from(fb),
            None => self.sent = Some(fb.clone()),
        }
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Spans of `next` that differ from `prev`.
///
/// Without a comparable previous frame every row is one span.
pub fn changed_spans(prev: Option<&FrameBuffer>, next: &FrameBuffer) -> Vec<Span> {
    let w = next.width();
    let prev = prev.filter(|p| p.width() == w && p.height() == next.height());
    let Some(prev) = prev else {
        return (0..next.height()).map(|y| Span { x: 0, y, len: w }).collect();
    };
    if w == 0 {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let rows = prev.cells().chunks(w as usize).zip(next.cells().chunks(w as usize));
    for (y, (old, new)) in (0u16..).zip(rows) {
        let mut start: Option<u16> = None;
        for (x, differs) in (0u16..).zip(old.iter().zip(new).map(|(a, b)| a != b)) {
            match (start, differs) {
                (None, true) => start = Some(x),
                (Some(s), false) => {
                    spans.push(Span { x: s, y, len: x - s });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push(Span { x: s, y, len: w - s });
        }
    }
    spans
}

/// Queue what turns the screen showing `prev` into `next`.
pub fn encode_frame(prev: Option<&FrameBuffer>, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let comparable = prev.is_some_and(|p| p.width() == next.width() && p.height() == next.height());
    if !comparable {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
    }
    let spans = changed_spans(prev, next);
    if spans.is_empty() {
        return Ok(());
    }

    let mut pen = Pen::default();
    for span in spans {
        pen.paint(out, next, span)?;
    }
    reset_pen(out)
}

/// Tracks the terminal's style and cursor so repeated state is not re-sent.
#[derive(Default)]
struct Pen {
    style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
}

impl Pen {
    fn paint(&mut self, out: &mut Vec<u8>, fb: &FrameBuffer, span: Span) -> Result<()> {
        if self.cursor != Some((span.x, span.y)) {
            out.queue(cursor::MoveTo(span.x, span.y))?;
        }
        for x in span.x..span.x + span.len {
            let cell = fb.get(i32::from(x), i32::from(span.y)).unwrap_or_default();
            if self.style != Some(cell.style) {
                set_style(out, cell.style)?;
                self.style = Some(cell.style);
            }
            out.queue(Print(cell.ch))?;
        }
        let end = span.x + span.len;
        // The cursor does not advance past the last column with wrapping off.
        self.cursor = (end < fb.width()).then_some((end, span.y));
        Ok(())
    }
}

fn set_style(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?
        .queue(SetForegroundColor(color(style.fg)))?
        .queue(SetBackgroundColor(color(style.bg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.reverse {
        out.queue(SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

fn reset_pen(out: &mut Vec<u8>) -> Result<()> {
    out.queue(ResetColor)?.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
