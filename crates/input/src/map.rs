//! Key mapping from terminal events to input symbols.

use crate::types::InputSymbol;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map a key press to an input symbol. Releases and unmapped keys give `None`.
pub fn map_key_event(key: KeyEvent) -> Option<InputSymbol> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(InputSymbol::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(InputSymbol::Right),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(InputSymbol::Down),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(InputSymbol::Up),

        KeyCode::Enter => Some(InputSymbol::Confirm),
        KeyCode::Esc => Some(InputSymbol::Escape),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => Some(InputSymbol::Pause),

        KeyCode::Char(c) => Some(InputSymbol::Char(c)),
        _ => None,
    }
}

/// Ctrl-C leaves the game from any screen.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_direction_keys() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Left)), Some(InputSymbol::Left));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Right)), Some(InputSymbol::Right));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Down)), Some(InputSymbol::Down));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Up)), Some(InputSymbol::Up));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('h'))), Some(InputSymbol::Left));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('w'))), Some(InputSymbol::Up));
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Enter)), Some(InputSymbol::Confirm));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Esc)), Some(InputSymbol::Escape));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char(' '))), Some(InputSymbol::Pause));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::Char('z'))), Some(InputSymbol::Char('z')));
        assert_eq!(map_key_event(KeyEvent::from(KeyCode::F(1))), None);
    }

    #[test]
    fn test_releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key_event(release), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
        assert!(!should_quit(KeyEvent::from(KeyCode::Esc)));
    }
}
