use std::time::Duration;

use super::{blank, Redraw};
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{CellStyle, FrameBuffer, Viewport};
use crate::types::InputSymbol;

/// Lists the high score table; any key goes back.
#[derive(Debug, Default)]
pub struct HighScoresState {
    redraw: Redraw,
}

impl HighScoresState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State for HighScoresState {
    fn name(&self) -> &'static str {
        "high-scores"
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn input(&mut self, _shared: &mut SharedData, _symbol: InputSymbol) -> Transition {
        Transition::Pop
    }

    fn render(
        &mut self,
        shared: &mut SharedData,
        fb: &mut FrameBuffer,
        _delta: Duration,
        viewport: Viewport,
    ) -> Transition {
        if !self.redraw.take(viewport) {
            return Transition::None;
        }
        blank(fb, viewport);
        let style = CellStyle::default();
        fb.put_str_centered(2, "High Scores", style.bold());

        let entries = shared.high_scores.entries();
        if entries.is_empty() {
            fb.put_str_centered(4, "No scores yet", style);
        }
        for (i, e) in entries.iter().enumerate() {
            let line = format!(
                "{:>2}. {:>7}  lines {:>3}  level {:>2}",
                i + 1,
                e.score,
                e.lines,
                e.level
            );
            fb.put_str_centered(4 + i as i32, &line, style);
        }
        let footer = 5 + entries.len().max(1) as i32;
        fb.put_str_centered(footer, "Press any key", style);
        Transition::None
    }
}
