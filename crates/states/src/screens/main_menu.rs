use std::time::Duration;

use super::{blank, draw_items, step_selection, HighScoresState, NewGameMenuState, Redraw};
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{CellStyle, FrameBuffer, Viewport};
use crate::types::InputSymbol;

const ITEMS: [&str; 3] = ["New Game", "High Scores", "Quit"];
const NEW_GAME: usize = 0;
const HIGH_SCORES: usize = 1;

#[derive(Debug, Default)]
pub struct MainMenuState {
    selected: usize,
    redraw: Redraw,
}

impl MainMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}

impl State for MainMenuState {
    fn name(&self) -> &'static str {
        "main-menu"
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn input(&mut self, _shared: &mut SharedData, symbol: InputSymbol) -> Transition {
        match symbol {
            InputSymbol::Escape => Transition::Pop,
            InputSymbol::Up | InputSymbol::Down => {
                self.selected = step_selection(self.selected, ITEMS.len(), symbol == InputSymbol::Up);
                self.redraw.mark();
                Transition::None
            }
            InputSymbol::Confirm => match self.selected {
                NEW_GAME => Transition::push(NewGameMenuState::new()),
                HIGH_SCORES => Transition::push(HighScoresState::new()),
                _ => Transition::Pop,
            },
            _ => Transition::None,
        }
    }

    fn render(
        &mut self,
        _shared: &mut SharedData,
        fb: &mut FrameBuffer,
        _delta: Duration,
        viewport: Viewport,
    ) -> Transition {
        if self.redraw.take(viewport) {
            blank(fb, viewport);
            let style = CellStyle::default();
            fb.put_str_centered(1, "Blockfall", style.bold());
            fb.put_str_centered(3, "---", style);
            fb.put_str_centered(4, "Main Menu", style);
            draw_items(fb, 6, &ITEMS[..], self.selected);
        }
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{row, VIEW};

    #[test]
    fn selection_stays_in_range() {
        let mut shared = SharedData::new(1);
        let mut menu = MainMenuState::new();
        menu.input(&mut shared, InputSymbol::Up);
        assert_eq!(menu.selected(), 0);
        for _ in 0..5 {
            menu.input(&mut shared, InputSymbol::Down);
        }
        assert_eq!(menu.selected(), 2);
    }

    #[test]
    fn confirm_routes_by_selection() {
        let mut shared = SharedData::new(1);
        let mut menu = MainMenuState::new();
        assert!(matches!(menu.input(&mut shared, InputSymbol::Confirm), Transition::Push(s) if s.name() == "new-game"));
        menu.input(&mut shared, InputSymbol::Down);
        assert!(matches!(menu.input(&mut shared, InputSymbol::Confirm), Transition::Push(s) if s.name() == "high-scores"));
        menu.input(&mut shared, InputSymbol::Down);
        assert!(matches!(menu.input(&mut shared, InputSymbol::Confirm), Transition::Pop));
        assert!(matches!(menu.input(&mut shared, InputSymbol::Escape), Transition::Pop));
    }

    #[test]
    fn draws_only_when_changed() {
        let mut shared = SharedData::new(1);
        let mut menu = MainMenuState::new();
        menu.enter(&mut shared);
        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);
        menu.render(&mut shared, &mut fb, Duration::ZERO, VIEW);
        assert!(row(&fb, 1).contains("Blockfall"));
        assert!(row(&fb, 6).contains("New Game"));
        assert_eq!(fb.get(36, 6).map(|c| c.ch), Some('N'));

        let selected = fb.get(36, 6).unwrap();
        assert!(selected.style.reverse);

        // Scribble, then render again: nothing changed, so the scribble stays.
        fb.put_char(5, 10, '?', CellStyle::default());
        menu.render(&mut shared, &mut fb, Duration::ZERO, VIEW);
        assert_eq!(fb.get(5, 10).map(|c| c.ch), Some('?'));

        menu.input(&mut shared, InputSymbol::Down);
        menu.render(&mut shared, &mut fb, Duration::ZERO, VIEW);
        assert_eq!(fb.get(5, 10).map(|c| c.ch), Some(' '));
    }
}
