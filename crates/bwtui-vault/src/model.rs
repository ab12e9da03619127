//! Vault records as the rest of the crate sees them, plus the JSON shapes the
//! `bw` CLI reads and writes.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

// ── Session ──────────────────────────────────────────────────────────

/// Unlock token authorizing backend calls. Read-only once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(..)")
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// ── Entries ──────────────────────────────────────────────────────────

/// Bitwarden item type. Only logins reach the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Login,
    SecureNote,
    Card,
    Identity,
    Other(u8),
}

impl From<u8> for EntryKind {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Login,
            2 => Self::SecureNote,
            3 => Self::Card,
            4 => Self::Identity,
            other => Self::Other(other),
        }
    }
}

impl From<EntryKind> for u8 {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Login => 1,
            EntryKind::SecureNote => 2,
            EntryKind::Card => 3,
            EntryKind::Identity => 4,
            EntryKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Plain,
    Masked,
    Boolean,
}

/// The credential a linked custom field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedId {
    Username,
    Password,
    Other(u32),
}

impl From<u32> for LinkedId {
    fn from(value: u32) -> Self {
        match value {
            100 => Self::Username,
            101 => Self::Password,
            other => Self::Other(other),
        }
    }
}

impl From<LinkedId> for u32 {
    fn from(id: LinkedId) -> Self {
        match id {
            LinkedId::Username => 100,
            LinkedId::Password => 101,
            LinkedId::Other(other) => other,
        }
    }
}

impl fmt::Display for LinkedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Password => f.write_str("password"),
            Self::Other(id) => write!(f, "field #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub name: String,
    pub value: String,
    pub field_type: FieldType,
    pub linked_id: Option<LinkedId>,
}

impl CustomField {
    pub fn is_masked(&self) -> bool {
        self.field_type == FieldType::Masked
    }
}

/// A login entry. Field and URI order is the backend's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
    pub id: String,
    pub name: String,
    pub folder_id: Option<String>,
    pub kind: EntryKind,
    pub username: String,
    pub password: String,
    pub fields: Vec<CustomField>,
    pub uris: Vec<String>,
    pub notes: Option<String>,
    pub favorite: bool,
    pub revision_date: Option<DateTime<Utc>>,
}

impl VaultEntry {
    /// A blank login, used as the base for drafts.
    pub fn new_login(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            folder_id: None,
            kind: EntryKind::Login,
            username: String::new(),
            password: String::new(),
            fields: Vec::new(),
            uris: Vec::new(),
            notes: None,
            favorite: false,
            revision_date: None,
        }
    }

    /// Notes with surrounding whitespace removed, or `None` when blank.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim_end)
            .filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Folder {
    /// `None` for the implicit "No Folder" bucket.
    pub id: Option<String>,
    pub name: String,
}

/// Folder id to display name.
pub type FolderNames = HashMap<String, String>;

pub fn folder_names(folders: &[Folder]) -> FolderNames {
    folders
        .iter()
        .filter_map(|f| f.id.as_ref().map(|id| (id.clone(), f.name.clone())))
        .collect()
}

/// Server-side narrowing passed to `bw list items`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: String,
    pub url: String,
}

// ── Wire format ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UriJson {
    #[serde(rename = "match", default)]
    pub match_type: Option<u8>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginJson {
    #[serde(default)]
    pub uris: Option<Vec<UriJson>>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub totp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: u8,
    #[serde(default)]
    pub linked_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub collection_ids: Option<Vec<String>>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub fields: Option<Vec<FieldJson>>,
    #[serde(default)]
    pub login: Option<LoginJson>,
    #[serde(default)]
    pub reprompt: u8,
    #[serde(default, skip_serializing)]
    pub revision_date: Option<DateTime<Utc>>,
}

impl From<FieldJson> for CustomField {
    fn from(json: FieldJson) -> Self {
        let (field_type, linked_id) = match json.field_type {
            1 => (FieldType::Masked, None),
            2 => (FieldType::Boolean, None),
            3 => (FieldType::Plain, json.linked_id.map(LinkedId::from)),
            _ => (FieldType::Plain, None),
        };
        Self {
            name: json.name.unwrap_or_default(),
            value: json.value.unwrap_or_default(),
            field_type,
            linked_id,
        }
    }
}

impl From<&CustomField> for FieldJson {
    fn from(field: &CustomField) -> Self {
        let field_type = match (field.linked_id, field.field_type) {
            (Some(_), _) => 3,
            (None, FieldType::Plain) => 0,
            (None, FieldType::Masked) => 1,
            (None, FieldType::Boolean) => 2,
        };
        Self {
            name: Some(field.name.clone()),
            value: field.linked_id.is_none().then(|| field.value.clone()),
            field_type,
            linked_id: field.linked_id.map(u32::from),
        }
    }
}

impl ItemJson {
    /// Convert a decoded item. Non-login items yield `None`.
    pub fn into_entry(self) -> Option<VaultEntry> {
        let kind = EntryKind::from(self.kind);
        if kind != EntryKind::Login {
            return None;
        }
        let login = self.login.unwrap_or_default();
        Some(VaultEntry {
            id: self.id.unwrap_or_default(),
            name: self.name,
            folder_id: self.folder_id,
            kind,
            username: login.username.unwrap_or_default(),
            password: login.password.unwrap_or_default(),
            fields: self
                .fields
                .unwrap_or_default()
                .into_iter()
                .map(CustomField::from)
                .collect(),
            uris: login
                .uris
                .unwrap_or_default()
                .into_iter()
                .filter_map(|u| u.uri)
                .collect(),
            notes: self.notes,
            favorite: self.favorite,
            revision_date: self.revision_date,
        })
    }

    /// The item template `bw create item` expects for a new login.
    pub fn from_draft(entry: &VaultEntry) -> Self {
        Self {
            id: None,
            organization_id: None,
            collection_ids: None,
            folder_id: entry.folder_id.clone(),
            kind: u8::from(EntryKind::Login),
            name: entry.name.clone(),
            notes: entry.notes.clone(),
            favorite: entry.favorite,
            fields: Some(entry.fields.iter().map(FieldJson::from).collect()),
            login: Some(LoginJson {
                uris: Some(
                    entry
                        .uris
                        .iter()
                        .map(|uri| UriJson {
                            match_type: None,
                            uri: Some(uri.clone()),
                        })
                        .collect(),
                ),
                username: Some(entry.username.clone()),
                password: Some(entry.password.clone()),
                totp: None,
            }),
            reprompt: 0,
            revision_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: &str = r#"{
        "object": "item",
        "id": "0f1c",
        "organizationId": null,
        "folderId": "f-1",
        "type": 1,
        "reprompt": 0,
        "name": "GitHub",
        "notes": null,
        "favorite": true,
        "fields": [
            {"name": "pin", "value": "1234", "type": 1, "linkedId": null},
            {"name": "2fa", "value": "true", "type": 2, "linkedId": null},
            {"name": "login alias", "value": null, "type": 3, "linkedId": 100}
        ],
        "login": {
            "uris": [{"match": null, "uri": "https://github.com/login"}],
            "username": "octocat",
            "password": "hunter2",
            "totp": null
        },
        "revisionDate": "2024-03-01T10:20:30.000Z"
    }"#;

    #[test]
    fn test_decode_login_item() {
        let item: ItemJson = serde_json::from_str(ITEM).unwrap();
        let entry = item.into_entry().unwrap();
        assert_eq!(entry.id, "0f1c");
        assert_eq!(entry.folder_id.as_deref(), Some("f-1"));
        assert_eq!(entry.username, "octocat");
        assert_eq!(entry.uris, vec!["https://github.com/login"]);
        assert!(entry.favorite);
        assert_eq!(entry.fields.len(), 3);
        assert_eq!(entry.fields[0].field_type, FieldType::Masked);
        assert_eq!(entry.fields[1].field_type, FieldType::Boolean);
        assert_eq!(entry.fields[2].linked_id, Some(LinkedId::Username));
        assert_eq!(entry.fields[2].value, "");
        assert!(entry.revision_date.is_some());
    }

    #[test]
    fn test_null_collections_are_tolerated() {
        let json = r#"{"id":"x","type":1,"name":"bare","fields":null,"login":{"uris":null,"username":null,"password":null}}"#;
        let entry = serde_json::from_str::<ItemJson>(json)
            .unwrap()
            .into_entry()
            .unwrap();
        assert!(entry.fields.is_empty());
        assert!(entry.uris.is_empty());
        assert_eq!(entry.username, "");
    }

    #[test]
    fn test_non_login_items_are_dropped() {
        let json = r#"{"id":"n","type":2,"name":"note","secureNote":{"type":0}}"#;
        let item: ItemJson = serde_json::from_str(json).unwrap();
        assert!(item.into_entry().is_none());
    }

    #[test]
    fn test_draft_template_shape() {
        let mut draft = VaultEntry::new_login("Forum");
        draft.username = "me".into();
        draft.uris.push("forum.example".into());
        let value = serde_json::to_value(ItemJson::from_draft(&draft)).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["name"], "Forum");
        assert_eq!(value["login"]["username"], "me");
        assert_eq!(value["login"]["uris"][0]["uri"], "forum.example");
        assert!(value.get("id").is_none());
        assert!(value.get("revisionDate").is_none());
    }

    #[test]
    fn test_blank_notes_are_none() {
        let mut entry = VaultEntry::new_login("x");
        entry.notes = Some("  \n".into());
        assert_eq!(entry.notes_text(), None);
        entry.notes = Some("line one\n".into());
        assert_eq!(entry.notes_text(), Some("line one"));
    }

    #[test]
    fn test_session_rejects_empty_token() {
        assert!(Session::new("  \n").is_none());
        assert_eq!(Session::new("abc\n").unwrap().token(), "abc");
        assert_eq!(format!("{:?}", Session::new("abc").unwrap()), "Session(..)");
    }

    #[test]
    fn test_folder_names_skip_no_folder() {
        let folders = vec![
            Folder { id: None, name: "No Folder".into() },
            Folder { id: Some("f-1".into()), name: "Work".into() },
        ];
        let names = folder_names(&folders);
        assert_eq!(names.len(), 1);
        assert_eq!(names["f-1"], "Work");
    }
}
