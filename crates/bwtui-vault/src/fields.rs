//! Display rows derived from one vault entry.
//!
//! Row order: username, password, custom fields (under a header), URIs
//! (under a header), then notes. Headers and notes are never selectable.

use crate::model::{CustomField, FieldType, LinkedId, VaultEntry};

/// Fixed-width mask. The length never reveals the secret's length.
pub const MASK: &str = "\u{2022}\u{2022}\u{2022}\u{2022}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Username,
    Password,
}

impl Credential {
    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    CustomFields,
    Uris,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Self::CustomFields => "Custom Fields",
            Self::Uris => "URIs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectableRow {
    Credential { kind: Credential, value: String },
    Field(CustomField),
    Uri { raw: String, host: Option<String> },
    SectionHeader(Section),
    Notes(String),
}

/// What a copy of a row puts on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyValue {
    pub label: String,
    pub value: String,
    /// Secrets get cleared from the clipboard after a while.
    pub sensitive: bool,
}

impl SelectableRow {
    pub fn is_selectable(&self) -> bool {
        match self {
            Self::Credential { .. } | Self::Field(_) | Self::Uri { .. } => true,
            Self::SectionHeader(_) | Self::Notes(_) => false,
        }
    }

    /// Left-column label, for rows that have one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Credential { kind, .. } => Some(kind.label()),
            Self::Field(field) => Some(field.name.as_str()),
            Self::Uri { .. } | Self::SectionHeader(_) | Self::Notes(_) => None,
        }
    }

    /// Whether the value is hidden behind [`MASK`] when the row is not selected.
    pub fn is_masked(&self) -> bool {
        match self {
            Self::Credential { kind, value } => *kind == Credential::Password && !value.is_empty(),
            Self::Field(field) => field.is_masked() && !field.value.is_empty(),
            Self::Uri { .. } | Self::SectionHeader(_) | Self::Notes(_) => false,
        }
    }

    /// The text shown in the value column.
    pub fn display_value(&self, selected: bool) -> String {
        if self.is_masked() && !selected {
            return MASK.to_string();
        }
        match self {
            Self::Credential { kind, value } if value.is_empty() => match kind {
                Credential::Username => "(no username)".to_string(),
                Credential::Password => "(no password)".to_string(),
            },
            Self::Credential { value, .. } => value.clone(),
            Self::Field(field) => match field.linked_id {
                Some(target) => format!("\u{2192} {target}"),
                None if field.value.is_empty() => "(empty)".to_string(),
                None => field.value.clone(),
            },
            Self::Uri { raw, host } => match (selected, host) {
                (false, Some(host)) => host.clone(),
                _ => raw.clone(),
            },
            Self::SectionHeader(section) => section.title().to_string(),
            Self::Notes(text) => text.clone(),
        }
    }

    /// The value a copy of this row yields. Linked fields resolve to the
    /// credential they point at. `None` for rows that cannot be copied.
    pub fn copy_value(&self, entry: &VaultEntry) -> Option<CopyValue> {
        match self {
            Self::Credential { kind, value } => Some(CopyValue {
                label: kind.label().to_lowercase(),
                value: value.clone(),
                sensitive: *kind == Credential::Password,
            }),
            Self::Field(field) => {
                let (value, sensitive) = match field.linked_id {
                    Some(LinkedId::Username) => (entry.username.clone(), false),
                    Some(LinkedId::Password) => (entry.password.clone(), true),
                    Some(LinkedId::Other(_)) => return None,
                    None => (field.value.clone(), field.field_type == FieldType::Masked),
                };
                Some(CopyValue {
                    label: field.name.clone(),
                    value,
                    sensitive,
                })
            }
            Self::Uri { raw, .. } => Some(CopyValue {
                label: "URI".to_string(),
                value: raw.clone(),
                sensitive: false,
            }),
            Self::SectionHeader(_) | Self::Notes(_) => None,
        }
    }
}

fn uri_host(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
}

/// Build the rows for `entry`. Empty sections are omitted entirely.
pub fn build_rows(entry: &VaultEntry) -> Vec<SelectableRow> {
    let mut rows = vec![
        SelectableRow::Credential {
            kind: Credential::Username,
            value: entry.username.clone(),
        },
        SelectableRow::Credential {
            kind: Credential::Password,
            value: entry.password.clone(),
        },
    ];

    if !entry.fields.is_empty() {
        rows.push(SelectableRow::SectionHeader(Section::CustomFields));
        rows.extend(entry.fields.iter().cloned().map(SelectableRow::Field));
    }

    if !entry.uris.is_empty() {
        rows.push(SelectableRow::SectionHeader(Section::Uris));
        rows.extend(entry.uris.iter().map(|raw| SelectableRow::Uri {
            host: uri_host(raw),
            raw: raw.clone(),
        }));
    }

    if let Some(notes) = entry.notes_text() {
        rows.push(SelectableRow::Notes(notes.to_string()));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str, field_type: FieldType) -> CustomField {
        CustomField {
            name: name.into(),
            value: value.into(),
            field_type,
            linked_id: None,
        }
    }

    fn sample_entry() -> VaultEntry {
        let mut entry = VaultEntry::new_login("GitHub");
        entry.username = "octocat".into();
        entry.password = "hunter2".into();
        entry.fields = vec![
            field("pin", "1234", FieldType::Masked),
            field("region", "eu", FieldType::Plain),
        ];
        entry.uris = vec!["https://github.com/login".into()];
        entry
    }

    #[test]
    fn test_bare_entry_has_two_selectable_rows() {
        let rows = build_rows(&VaultEntry::new_login("bare"));
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(SelectableRow::is_selectable));
    }

    #[test]
    fn test_two_fields_one_uri_layout() {
        let rows = build_rows(&sample_entry());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows.iter().filter(|r| r.is_selectable()).count(), 5);
        assert_eq!(rows[2], SelectableRow::SectionHeader(Section::CustomFields));
        assert_eq!(rows[5], SelectableRow::SectionHeader(Section::Uris));
    }

    #[test]
    fn test_headers_precede_their_members() {
        let mut entry = sample_entry();
        entry.notes = Some("remember me".into());
        let rows = build_rows(&entry);
        for (i, row) in rows.iter().enumerate() {
            match row {
                SelectableRow::SectionHeader(Section::CustomFields) => {
                    assert!(matches!(rows[i + 1], SelectableRow::Field(_)));
                }
                SelectableRow::SectionHeader(Section::Uris) => {
                    assert!(matches!(rows[i + 1], SelectableRow::Uri { .. }));
                }
                _ => {}
            }
        }
        let headers = rows
            .iter()
            .filter(|r| matches!(r, SelectableRow::SectionHeader(_)))
            .count();
        assert_eq!(headers, 2);
        assert!(matches!(rows.last(), Some(SelectableRow::Notes(n)) if n == "remember me"));
    }

    #[test]
    fn test_only_uris_omits_field_header() {
        let mut entry = VaultEntry::new_login("x");
        entry.uris = vec!["a.example".into()];
        let rows = build_rows(&entry);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], SelectableRow::SectionHeader(Section::Uris));
    }

    #[test]
    fn test_masking_depends_on_selection() {
        let rows = build_rows(&sample_entry());
        assert_eq!(rows[1].display_value(false), MASK);
        assert_eq!(rows[1].display_value(true), "hunter2");
        assert_eq!(rows[3].display_value(false), MASK);
        assert_eq!(rows[3].display_value(true), "1234");
        assert_eq!(rows[4].display_value(false), "eu");
    }

    #[test]
    fn test_empty_values_render_placeholders() {
        let mut entry = VaultEntry::new_login("x");
        entry.fields = vec![field("secret", "", FieldType::Masked)];
        let rows = build_rows(&entry);
        assert_eq!(rows[0].display_value(false), "(no username)");
        assert_eq!(rows[1].display_value(false), "(no password)");
        assert_eq!(rows[3].display_value(false), "(empty)");
    }

    #[test]
    fn test_uri_shows_host_unless_selected() {
        let rows = build_rows(&sample_entry());
        assert_eq!(rows[6].display_value(false), "github.com");
        assert_eq!(rows[6].display_value(true), "https://github.com/login");

        let mut entry = VaultEntry::new_login("x");
        entry.uris = vec!["not a url".into()];
        let rows = build_rows(&entry);
        assert_eq!(rows[3].display_value(false), "not a url");
    }

    #[test]
    fn test_copy_masked_field_yields_plain_value() {
        let entry = sample_entry();
        let rows = build_rows(&entry);
        let copied = rows[3].copy_value(&entry).unwrap();
        assert_eq!(copied.value, "1234");
        assert!(copied.sensitive);
        assert!(rows[2].copy_value(&entry).is_none());
    }

    #[test]
    fn test_linked_field_copies_target_credential() {
        let mut entry = sample_entry();
        entry.fields = vec![CustomField {
            name: "alias".into(),
            value: String::new(),
            field_type: FieldType::Plain,
            linked_id: Some(LinkedId::Password),
        }];
        let rows = build_rows(&entry);
        assert_eq!(rows[3].display_value(false), "\u{2192} password");
        let copied = rows[3].copy_value(&entry).unwrap();
        assert_eq!(copied.value, "hunter2");
        assert!(copied.sensitive);
    }
}
