use std::time::Duration;

use super::Redraw;
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{CellStyle, FrameBuffer, Viewport};
use crate::types::InputSymbol;

/// Overlays a notice on the last play frame; any key resumes.
#[derive(Debug, Default)]
pub struct PausedState {
    redraw: Redraw,
}

impl PausedState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State for PausedState {
    fn name(&self) -> &'static str {
        "paused"
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn input(&mut self, _shared: &mut SharedData, _symbol: InputSymbol) -> Transition {
        Transition::Pop
    }

    fn render(
        &mut self,
        _shared: &mut SharedData,
        fb: &mut FrameBuffer,
        _delta: Duration,
        viewport: Viewport,
    ) -> Transition {
        if self.redraw.take(viewport) {
            // Only the two overlay rows are touched.
            let row = (i32::from(viewport.height) + 1) / 2 - 1;
            let style = CellStyle::default().standout();
            fb.put_str_centered(row, "Paused", style);
            fb.put_str_centered(row + 1, "Press any key to unpause", style);
        }
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{row, VIEW};

    #[test]
    fn overlay_keeps_the_frame_beneath() {
        let mut shared = SharedData::new(1);
        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);
        fb.put_str(0, 0, "board", CellStyle::default());

        let mut paused = PausedState::new();
        paused.enter(&mut shared);
        paused.render(&mut shared, &mut fb, Duration::ZERO, VIEW);

        assert_eq!(row(&fb, 0), "board");
        assert!(row(&fb, 11).contains("Paused"));
        assert!(row(&fb, 12).contains("Press any key to unpause"));
        assert!(matches!(paused.input(&mut shared, InputSymbol::Left), Transition::Pop));
    }
}
