use crate::fields::SelectableRow;

/// Cursor over the selectable rows of a detail view.
///
/// Positions index into the selectable subset, so the cursor can never rest
/// on a header or the notes block. With no selectable rows the position is
/// `None` and every movement is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Row indices of the selectable rows, in display order.
    selectable: Vec<usize>,
    position: Option<usize>,
}

impl Cursor {
    /// A cursor on the first selectable row of `rows`.
    pub fn new(rows: &[SelectableRow]) -> Self {
        let selectable: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_selectable())
            .map(|(i, _)| i)
            .collect();
        let position = (!selectable.is_empty()).then_some(0);
        Self {
            selectable,
            position,
        }
    }

    pub fn advance(&mut self) {
        if let Some(pos) = self.position {
            self.position = Some((pos + 1) % self.selectable.len());
        }
    }

    pub fn retreat(&mut self) {
        if let Some(pos) = self.position {
            let len = self.selectable.len();
            self.position = Some((pos + len - 1) % len);
        }
    }

    pub fn reset(&mut self) {
        self.position = (!self.selectable.is_empty()).then_some(0);
    }

    /// Index into the full row list, or `None` when nothing is selectable.
    pub fn row_index(&self) -> Option<usize> {
        self.position.and_then(|pos| self.selectable.get(pos).copied())
    }

    pub fn current<'a>(&self, rows: &'a [SelectableRow]) -> Option<&'a SelectableRow> {
        self.row_index().and_then(|i| rows.get(i))
    }

    pub fn selectable_count(&self) -> usize {
        self.selectable.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Section, build_rows};
    use crate::model::{CustomField, FieldType, VaultEntry};

    fn seven_row_entry() -> VaultEntry {
        let mut entry = VaultEntry::new_login("GitHub");
        entry.password = "pw".into();
        entry.fields = ["a", "b"]
            .into_iter()
            .map(|name| CustomField {
                name: name.into(),
                value: "v".into(),
                field_type: FieldType::Plain,
                linked_id: None,
            })
            .collect();
        entry.uris = vec!["https://example.com".into()];
        entry.notes = Some("notes".into());
        entry
    }

    #[test]
    fn test_walks_selectable_rows_in_order() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        let mut visited = Vec::new();
        for _ in 0..cursor.selectable_count() {
            visited.push(cursor.row_index().unwrap());
            cursor.advance();
        }
        assert_eq!(visited, vec![0, 1, 3, 4, 6]);
        assert_eq!(cursor.row_index(), Some(0));
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        cursor.advance();
        cursor.advance();
        let start = cursor.row_index();
        for _ in 0..cursor.selectable_count() {
            cursor.advance();
        }
        assert_eq!(cursor.row_index(), start);
        for _ in 0..cursor.selectable_count() {
            cursor.retreat();
        }
        assert_eq!(cursor.row_index(), start);
    }

    #[test]
    fn test_advance_then_retreat_is_identity() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        for _ in 0..cursor.selectable_count() {
            let before = cursor.row_index();
            cursor.advance();
            cursor.retreat();
            assert_eq!(cursor.row_index(), before);
            cursor.retreat();
            cursor.advance();
            assert_eq!(cursor.row_index(), before);
            cursor.advance();
        }
    }

    #[test]
    fn test_never_lands_on_header_or_notes() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        for _ in 0..20 {
            assert!(cursor.current(&rows).unwrap().is_selectable());
            cursor.retreat();
        }
    }

    #[test]
    fn test_last_row_wraps_to_first() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        cursor.retreat();
        assert_eq!(cursor.row_index(), Some(6));
        cursor.advance();
        assert_eq!(cursor.row_index(), Some(0));
    }

    #[test]
    fn test_empty_rows_have_no_selection() {
        let rows = vec![SelectableRow::SectionHeader(Section::Uris)];
        let mut cursor = Cursor::new(&rows);
        cursor.advance();
        cursor.retreat();
        cursor.reset();
        assert_eq!(cursor.row_index(), None);
        assert!(cursor.current(&rows).is_none());
    }

    #[test]
    fn test_reset_returns_to_first() {
        let rows = build_rows(&seven_row_entry());
        let mut cursor = Cursor::new(&rows);
        cursor.advance();
        cursor.advance();
        cursor.reset();
        assert_eq!(cursor.row_index(), Some(0));
    }
}
