//! Draft form for a new login entry.

use bwtui_core::keybinds::Action;
use bwtui_core::text_input::TextInput;

use crate::model::VaultEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Username,
    Password,
    Uri,
    Notes,
}

impl DraftField {
    pub const ALL: [DraftField; 5] = [
        DraftField::Name,
        DraftField::Username,
        DraftField::Password,
        DraftField::Uri,
        DraftField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Username => "Username",
            Self::Password => "Password",
            Self::Uri => "URI",
            Self::Notes => "Notes",
        }
    }
}

#[derive(Debug)]
pub struct EntryEditor {
    inputs: [TextInput; 5],
    focus: usize,
    /// A create request is in flight.
    pub saving: bool,
}

impl Default for EntryEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryEditor {
    /// A blank draft with focus on the first field.
    pub fn new() -> Self {
        Self {
            inputs: [
                TextInput::new().with_placeholder("required"),
                TextInput::new(),
                TextInput::new().masked(),
                TextInput::new().with_placeholder("https://"),
                TextInput::new(),
            ],
            focus: 0,
            saving: false,
        }
    }

    pub fn focused(&self) -> DraftField {
        DraftField::ALL[self.focus]
    }

    pub fn input(&self, field: DraftField) -> &TextInput {
        &self.inputs[field as usize]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.inputs.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
    }

    /// Route an editing action to the focused input.
    pub fn apply(&mut self, action: &Action) -> bool {
        let focus = self.focus;
        self.inputs[focus].apply(action)
    }

    /// Build the entry to create, or the reason the draft is not ready.
    pub fn to_entry(&self) -> Result<VaultEntry, &'static str> {
        let name = self.input(DraftField::Name).value().trim();
        if name.is_empty() {
            return Err("Name is required");
        }
        let mut entry = VaultEntry::new_login(name);
        entry.username = self.input(DraftField::Username).value().to_string();
        entry.password = self.input(DraftField::Password).value().to_string();
        let uri = self.input(DraftField::Uri).value().trim();
        if !uri.is_empty() {
            entry.uris.push(uri.to_string());
        }
        let notes = self.input(DraftField::Notes).value();
        if !notes.trim().is_empty() {
            entry.notes = Some(notes.to_string());
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(editor: &mut EntryEditor, text: &str) {
        for c in text.chars() {
            editor.apply(&Action::InsertChar(c));
        }
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut editor = EntryEditor::new();
        assert_eq!(editor.focused(), DraftField::Name);
        editor.prev_field();
        assert_eq!(editor.focused(), DraftField::Notes);
        for _ in 0..5 {
            editor.next_field();
        }
        assert_eq!(editor.focused(), DraftField::Notes);
        editor.next_field();
        assert_eq!(editor.focused(), DraftField::Name);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut editor = EntryEditor::new();
        type_into(&mut editor, "Forum");
        editor.next_field();
        type_into(&mut editor, "me");
        editor.next_field();
        type_into(&mut editor, "pw");
        editor.next_field();
        type_into(&mut editor, " forum.example ");

        let entry = editor.to_entry().unwrap();
        assert_eq!(entry.name, "Forum");
        assert_eq!(entry.username, "me");
        assert_eq!(entry.password, "pw");
        assert_eq!(entry.uris, vec!["forum.example"]);
        assert_eq!(entry.notes, None);
        assert!(editor.input(DraftField::Password).masked);
    }

    #[test]
    fn test_name_is_required() {
        let mut editor = EntryEditor::new();
        type_into(&mut editor, "   ");
        assert_eq!(editor.to_entry(), Err("Name is required"));
    }
}
