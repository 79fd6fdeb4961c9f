//! GameView: draws a `GameSnapshot` into a terminal framebuffer.
//!
//! Pure (no I/O). Blocks are drawn at their absolute positions, each cell
//! `cell_w` columns wide to compensate for the terminal glyph aspect ratio.

use std::collections::BTreeMap;

use crate::core::{ColorPair, GameSnapshot, NamedColor};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{ColorId, Point};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Terminal color for a named color.
pub fn named_rgb(color: NamedColor) -> Rgb {
    match color {
        NamedColor::Black => Rgb::new(0, 0, 0),
        NamedColor::Blue => Rgb::new(80, 120, 220),
        NamedColor::Cyan => Rgb::new(80, 220, 220),
        NamedColor::Green => Rgb::new(100, 220, 120),
        NamedColor::Magenta => Rgb::new(200, 120, 220),
        NamedColor::Red => Rgb::new(220, 80, 80),
        NamedColor::White => Rgb::new(230, 230, 230),
        NamedColor::Yellow => Rgb::new(240, 220, 80),
    }
}

pub fn pair_style(pair: ColorPair) -> CellStyle {
    CellStyle::new(named_rgb(pair.fg), named_rgb(pair.bg))
}

pub struct GameView {
    /// Grid cell width in terminal columns.
    cell_w: u16,
    block_ch: char,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            cell_w: 2,
            block_ch: '█',
        }
    }
}

impl GameView {
    /// Terminal column/row of an absolute grid position.
    pub fn screen_pos(&self, position: Point) -> (i32, i32) {
        (position.x * i32::from(self.cell_w), position.y)
    }

    /// Redraw the whole session into `fb`, which is cleared first.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        colors: &BTreeMap<ColorId, ColorPair>,
        fb: &mut FrameBuffer,
    ) {
        fb.clear(CellStyle::default().cell(' '));

        let (left, top) = self.screen_pos(snap.origin);
        let inner_w = snap.width as u16 * self.cell_w;
        let inner_h = snap.height as u16;

        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        self.draw_frame(fb, left - 1, top - 1, inner_w + 2, inner_h + 2, border);

        for block in snap.landed.iter().chain(&snap.active) {
            // Cells above the field are not drawn.
            if snap.cell_of(block.position).y < 0 {
                continue;
            }
            let style = colors
                .get(&block.color)
                .copied()
                .map(pair_style)
                .unwrap_or_default();
            let (x, y) = self.screen_pos(block.position);
            fb.fill_rect(x, y, self.cell_w, 1, self.block_ch, style);
        }

        self.draw_counters(fb, snap, left + i32::from(inner_w) + 3, top + 9);
    }

    fn draw_frame(&self, fb: &mut FrameBuffer, x: i32, y: i32, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }
        let right = x + i32::from(w) - 1;
        let bottom = y + i32::from(h) - 1;
        fb.hline(x + 1, bottom, w - 2, '─', style);
        fb.vline(x, y, h - 1, '│', style);
        fb.vline(right, y, h - 1, '│', style);
        fb.put_char(x, bottom, '└', style);
        fb.put_char(right, bottom, '┘', style);
    }

    fn draw_counters(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x: i32, y: i32) {
        let label = CellStyle::default().bold();
        let value = CellStyle::default();
        for (row, (name, n)) in [("Score:", snap.score), ("Lines:", snap.lines), ("Level:", snap.level)]
            .into_iter()
            .enumerate()
        {
            let row = y + row as i32;
            fb.put_str(x, row, name, label);
            fb.put_u32(x + 7, row, n, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BlockView, GameSnapshot};

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            origin: Point::new(5, 1),
            width: 4,
            height: 3,
            landed: vec![BlockView { position: Point::new(6, 3), color: ColorId(1) }],
            active: vec![
                BlockView { position: Point::new(7, 1), color: ColorId(1) },
                BlockView { position: Point::new(7, 0), color: ColorId(1) },
            ],
            score: 40,
            lines: 2,
            level: 1,
        }
    }

    fn colors() -> BTreeMap<ColorId, ColorPair> {
        BTreeMap::from([(ColorId(1), ColorPair { fg: NamedColor::Red, bg: NamedColor::Black })])
    }

    #[test]
    fn blocks_draw_at_scaled_absolute_positions() {
        let mut fb = FrameBuffer::new(40, 12);
        GameView::default().render_into(&snapshot(), &colors(), &mut fb);

        let landed = fb.get(12, 3).unwrap();
        assert_eq!(landed.ch, '█');
        assert_eq!(landed.style.fg, named_rgb(NamedColor::Red));
        assert_eq!(fb.get(13, 3).map(|c| c.ch), Some('█'));
        assert_eq!(fb.get(14, 1).map(|c| c.ch), Some('█'));
    }

    #[test]
    fn blocks_above_the_field_are_hidden() {
        let mut fb = FrameBuffer::new(40, 12);
        GameView::default().render_into(&snapshot(), &colors(), &mut fb);
        assert_ne!(fb.get(14, 0).map(|c| c.ch), Some('█'));
    }

    #[test]
    fn frame_and_counters() {
        let mut fb = FrameBuffer::new(40, 12);
        let view = GameView::default();
        view.render_into(&snapshot(), &colors(), &mut fb);

        // Walls sit one column outside the field, floor one row below.
        assert_eq!(fb.get(9, 1).map(|c| c.ch), Some('│'));
        assert_eq!(fb.get(18, 2).map(|c| c.ch), Some('│'));
        assert_eq!(fb.get(9, 4).map(|c| c.ch), Some('└'));
        assert_eq!(fb.get(12, 4).map(|c| c.ch), Some('─'));

        let row: String = (21..31).filter_map(|x| fb.get(x, 10)).map(|c| c.ch).collect();
        assert_eq!(row, "Score: 40 ");
    }
}
