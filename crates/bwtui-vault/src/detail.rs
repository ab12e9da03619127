//! Detail panel state for displaying one entry's fields.

use crate::fields::{CopyValue, SelectableRow, build_rows};
use crate::model::VaultEntry;
use crate::navigation::Cursor;

/// The detail panel state.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    pub entry: VaultEntry,
    /// Resolved folder name for the title line.
    pub folder: Option<String>,
    rows: Vec<SelectableRow>,
    cursor: Cursor,
}

impl DetailPanel {
    pub fn new(entry: VaultEntry, folder: Option<String>) -> Self {
        let rows = build_rows(&entry);
        let cursor = Cursor::new(&rows);
        Self {
            entry,
            folder,
            rows,
            cursor,
        }
    }

    pub fn rows(&self) -> &[SelectableRow] {
        &self.rows
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.cursor.row_index()
    }

    pub fn selected_row(&self) -> Option<&SelectableRow> {
        self.cursor.current(&self.rows)
    }

    pub fn move_down(&mut self) {
        self.cursor.advance();
    }

    pub fn move_up(&mut self) {
        self.cursor.retreat();
    }

    pub fn goto_top(&mut self) {
        self.cursor.reset();
    }

    pub fn goto_bottom(&mut self) {
        self.cursor.reset();
        self.cursor.retreat();
    }

    /// Value to copy for the selected row.
    pub fn copy_selected(&self) -> Option<CopyValue> {
        self.selected_row()?.copy_value(&self.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_bottom_and_top() {
        let mut entry = VaultEntry::new_login("one");
        entry.uris = vec!["https://a.example".into()];
        let mut panel = DetailPanel::new(entry, None);
        panel.goto_bottom();
        assert_eq!(panel.selected_index(), Some(3));

        panel.goto_top();
        assert_eq!(panel.selected_index(), Some(0));
        assert_eq!(DetailPanel::new(VaultEntry::new_login("two"), None).rows().len(), 2);
    }

    #[test]
    fn test_copy_selected_password() {
        let mut entry = VaultEntry::new_login("x");
        entry.password = "s3cret".into();
        let mut panel = DetailPanel::new(entry, Some("Work".into()));
        panel.move_down();
        let copied = panel.copy_selected().unwrap();
        assert_eq!(copied.value, "s3cret");
        assert_eq!(copied.label, "password");
        assert!(copied.sensitive);
    }
}
