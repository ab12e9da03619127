use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input modes. Screens with a focused text field run in `Insert`, everything
/// else in `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and actions via single-key binds.
    #[default]
    Normal,
    /// Keys are text for the focused input.
    Insert,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
        }
    }
}

/// Actions that can result from processing a key event.
/// Screens receive these instead of raw key events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The key is not bound in the current mode.
    None,
    /// Quit the application.
    Quit,
    /// Move selection down by one.
    MoveDown,
    /// Move selection up by one.
    MoveUp,
    /// Jump to the first item.
    GotoTop,
    /// Jump to the last item.
    GotoBottom,
    /// Open / activate the highlighted item.
    Confirm,
    /// Copy the highlighted value.
    Copy,
    /// Leave the current screen.
    Back,
    /// Start a new entry.
    Add,
    /// Sync the vault with the server.
    Sync,
    /// Reload the entry list.
    Refresh,
    /// Start filtering the list.
    Search,
    /// Toggle the help popup.
    Help,
    /// Focus the next input.
    NextField,
    /// Focus the previous input.
    PrevField,
    /// Submit the focused form (Enter in Insert mode).
    Submit,
    /// Insert a character into the focused input.
    InsertChar(char),
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character under the cursor.
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
}

/// Pending key state for multi-key sequences like `gg`.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    /// Pending first key of a two-key sequence.
    pub pending_key: Option<char>,
}

impl KeyState {
    pub fn reset(&mut self) {
        self.pending_key = None;
    }
}

/// Keys that quit from every screen, regardless of mode.
pub fn is_force_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Map a key to an action for the given mode.
pub fn process_key(key: KeyEvent, mode: InputMode, state: &mut KeyState) -> Action {
    if is_force_quit(&key) {
        state.reset();
        return Action::Quit;
    }
    match mode {
        InputMode::Normal => process_normal_key(key, state),
        InputMode::Insert => {
            state.reset();
            process_insert_key(key)
        }
    }
}

/// Process a key event in Normal mode, accounting for multi-key sequences.
pub fn process_normal_key(key: KeyEvent, state: &mut KeyState) -> Action {
    if let Some(pending) = state.pending_key.take() {
        return match (pending, key.code) {
            ('g', KeyCode::Char('g')) => Action::GotoTop,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => Action::MoveUp,
        KeyCode::Char('G') | KeyCode::End => Action::GotoBottom,
        KeyCode::Home => Action::GotoTop,
        KeyCode::Char('g') => {
            state.pending_key = Some('g');
            Action::None
        }
        KeyCode::Enter => Action::Confirm,
        KeyCode::Char('c') | KeyCode::Char('y') => Action::Copy,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => Action::Back,
        KeyCode::Char('a') | KeyCode::Char('n') => Action::Add,
        KeyCode::Char('s') => Action::Sync,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('/') => Action::Search,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('q') => Action::Quit,
        _ => Action::None,
    }
}

/// Process a key event in Insert mode. Printable keys become text.
pub fn process_insert_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::Back,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab | KeyCode::Down => Action::NextField,
        KeyCode::BackTab | KeyCode::Up => Action::PrevField,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::CursorLeft,
        KeyCode::Right => Action::CursorRight,
        KeyCode::Home => Action::CursorHome,
        KeyCode::End => Action::CursorEnd,
        KeyCode::Char('a') if key.modifiers == KeyModifiers::CONTROL => Action::CursorHome,
        KeyCode::Char('e') if key.modifiers == KeyModifiers::CONTROL => Action::CursorEnd,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Action::InsertChar(c)
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_ctrl_c_quits_in_every_mode() {
        let mut state = KeyState::default();
        assert_eq!(process_key(ctrl('c'), InputMode::Normal, &mut state), Action::Quit);
        assert_eq!(process_key(ctrl('c'), InputMode::Insert, &mut state), Action::Quit);
        assert_eq!(process_key(ctrl('d'), InputMode::Insert, &mut state), Action::Quit);
    }

    #[test]
    fn test_q_is_text_in_insert_mode() {
        let mut state = KeyState::default();
        assert_eq!(
            process_key(key(KeyCode::Char('q')), InputMode::Insert, &mut state),
            Action::InsertChar('q')
        );
        assert_eq!(
            process_key(key(KeyCode::Char('q')), InputMode::Normal, &mut state),
            Action::Quit
        );
    }

    #[test]
    fn test_gg_sequence() {
        let mut state = KeyState::default();
        assert_eq!(process_normal_key(key(KeyCode::Char('g')), &mut state), Action::None);
        assert_eq!(state.pending_key, Some('g'));
        assert_eq!(process_normal_key(key(KeyCode::Char('g')), &mut state), Action::GotoTop);
        assert_eq!(state.pending_key, None);
    }

    #[test]
    fn test_invalid_sequence_is_ignored() {
        let mut state = KeyState::default();
        process_normal_key(key(KeyCode::Char('g')), &mut state);
        assert_eq!(process_normal_key(key(KeyCode::Char('x')), &mut state), Action::None);
        assert_eq!(process_normal_key(key(KeyCode::Char('j')), &mut state), Action::MoveDown);
    }

    #[test]
    fn test_tab_moves_in_both_modes() {
        let mut state = KeyState::default();
        assert_eq!(process_normal_key(key(KeyCode::Tab), &mut state), Action::MoveDown);
        assert_eq!(process_normal_key(key(KeyCode::BackTab), &mut state), Action::MoveUp);
        assert_eq!(process_insert_key(key(KeyCode::Tab)), Action::NextField);
        assert_eq!(process_insert_key(key(KeyCode::BackTab)), Action::PrevField);
    }

    #[test]
    fn test_insert_mode_emacs_motions() {
        assert_eq!(process_insert_key(ctrl('a')), Action::CursorHome);
        assert_eq!(process_insert_key(ctrl('e')), Action::CursorEnd);
        assert_eq!(process_insert_key(ctrl('x')), Action::None);
    }
}
