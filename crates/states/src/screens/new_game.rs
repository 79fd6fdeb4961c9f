use std::time::Duration;

use super::{blank, draw_items, step_selection, PlayState, Redraw};
use crate::error::StateInitError;
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{CellStyle, FrameBuffer, Viewport};
use crate::types::InputSymbol;

/// Pick a piece set; confirming replaces this menu with a play session.
#[derive(Debug, Default)]
pub struct NewGameMenuState {
    types: Vec<String>,
    selected: usize,
    redraw: Redraw,
}

impl NewGameMenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece set names, sorted.
    pub fn types(&self) -> &[String] {
        &self.types
    }
}

impl State for NewGameMenuState {
    fn name(&self) -> &'static str {
        "new-game"
    }

    fn init(&mut self, shared: &mut SharedData) -> Result<(), StateInitError> {
        let catalog = shared.catalog()?;
        if catalog.piece_types().is_empty() {
            return Err(StateInitError::Rejected("no piece types loaded".to_string()));
        }
        self.types = catalog.type_names().map(str::to_string).collect();
        self.selected = 0;
        Ok(())
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn input(&mut self, shared: &mut SharedData, symbol: InputSymbol) -> Transition {
        match symbol {
            InputSymbol::Escape => Transition::Pop,
            InputSymbol::Up | InputSymbol::Down => {
                self.selected = step_selection(self.selected, self.types.len(), symbol == InputSymbol::Up);
                self.redraw.mark();
                Transition::None
            }
            InputSymbol::Confirm => {
                let name = &self.types[self.selected];
                match shared.catalog.as_ref().and_then(|c| c.piece_type(name)) {
                    Some(templates) => Transition::replace(PlayState::new(name.clone(), templates.to_vec())),
                    None => Transition::None,
                }
            }
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
            fb.put_str_centered(2, "Select a game type:", CellStyle::default());
            draw_items(fb, 4, self.types.as_slice(), self.selected);
        }
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_catalog;

    const DATA: &str = r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],
        "types":[{"name":"Tromino","polyominoes":[{"color":1,"blocks":[[0,0],[1,0],[2,0]]}]},
                 {"name":"Domino","polyominoes":[{"color":1,"blocks":[[0,0],[1,0]]}]}]}"#;

    #[test]
    fn init_without_game_data_fails() {
        let mut shared = SharedData::new(1);
        let mut menu = NewGameMenuState::new();
        assert_eq!(menu.init(&mut shared), Err(StateInitError::MissingData("game data")));
    }

    #[test]
    fn lists_types_sorted_and_starts_selected_one() {
        let mut shared = SharedData::new(1).with_catalog(parse_catalog(DATA).unwrap());
        let mut menu = NewGameMenuState::new();
        menu.init(&mut shared).unwrap();
        assert_eq!(menu.types(), ["Domino".to_string(), "Tromino".to_string()]);

        menu.input(&mut shared, InputSymbol::Down);
        match menu.input(&mut shared, InputSymbol::Confirm) {
            Transition::Replace(state) => assert_eq!(state.name(), "play"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
