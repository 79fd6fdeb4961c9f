//! The concrete states: load, menus, play and pause.

mod high_scores;
mod load;
mod main_menu;
mod new_game;
mod paused;
mod play;

pub use high_scores::HighScoresState;
pub use load::{LoadState, Loader};
pub use main_menu::MainMenuState;
pub use new_game::NewGameMenuState;
pub use paused::PausedState;
pub use play::{PlayState, PLAY_ORIGIN};

use crate::term::{CellStyle, FrameBuffer, Viewport};

/// Tracks whether a screen must be drawn again: after `enter`, after a state
/// change, or when the terminal was resized.
#[derive(Debug, Default)]
pub(crate) struct Redraw {
    dirty: bool,
    last: Option<Viewport>,
}

impl Redraw {
    pub(crate) fn mark(&mut self) {
        self.dirty = true;
    }

    /// True if a draw is due; clears the flag.
    pub(crate) fn take(&mut self, viewport: Viewport) -> bool {
        let due = self.dirty || self.last != Some(viewport);
        self.dirty = false;
        self.last = Some(viewport);
        due
    }
}

/// Clear and frame the screen.
pub(crate) fn blank(fb: &mut FrameBuffer, viewport: Viewport) {
    fb.resize(viewport.width, viewport.height);
    fb.clear(CellStyle::default().cell(' '));
    let (w, h) = (i32::from(viewport.width), i32::from(viewport.height));
    if w < 2 || h < 2 {
        return;
    }
    let style = CellStyle::default();
    fb.hline(1, 0, viewport.width - 2, '─', style);
    fb.hline(1, h - 1, viewport.width - 2, '─', style);
    fb.vline(0, 1, viewport.height - 2, '│', style);
    fb.vline(w - 1, 1, viewport.height - 2, '│', style);
    fb.put_char(0, 0, '┌', style);
    fb.put_char(w - 1, 0, '┐', style);
    fb.put_char(0, h - 1, '└', style);
    fb.put_char(w - 1, h - 1, '┘', style);
}

/// Centered list starting at `row`, the selected item in standout.
pub(crate) fn draw_items<S: AsRef<str>>(fb: &mut FrameBuffer, row: i32, items: &[S], selected: usize) {
    for (i, item) in items.iter().enumerate() {
        let style = if i == selected {
            CellStyle::default().standout()
        } else {
            CellStyle::default()
        };
        fb.put_str_centered(row + i as i32, item.as_ref(), style);
    }
}

/// Move a menu cursor one step, staying in range.
pub(crate) fn step_selection(selected: usize, len: usize, up: bool) -> usize {
    if up {
        selected.saturating_sub(1)
    } else if selected + 1 < len {
        selected + 1
    } else {
        selected
    }
}
