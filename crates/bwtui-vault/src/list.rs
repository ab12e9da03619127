//! Entry list state: the listed entries, folder names and the local filter.

use bwtui_core::text_input::TextInput;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::{Folder, FolderNames, VaultEntry, folder_names};

#[derive(Debug, Default)]
pub struct EntryList {
    entries: Vec<VaultEntry>,
    folders: FolderNames,
    pub filter: TextInput,
    /// Whether keystrokes go to the filter input.
    pub filtering: bool,
    /// Indices into `entries` that match the filter, best match first.
    filtered: Vec<usize>,
    /// Position within `filtered`.
    selected: usize,
    /// A list, fetch or sync is in flight.
    pub loading: bool,
}

impl EntryList {
    pub fn new(entries: Vec<VaultEntry>, folders: Vec<Folder>) -> Self {
        let mut list = Self {
            filter: TextInput::new().with_placeholder("filter entries"),
            ..Self::default()
        };
        list.replace_entries(entries, folders);
        list
    }

    /// Swap in freshly listed entries, keeping the selection on the same entry
    /// id when it is still present.
    pub fn replace_entries(&mut self, entries: Vec<VaultEntry>, folders: Vec<Folder>) {
        let selected_id = self.selected_entry().map(|e| e.id.clone());
        self.entries = entries;
        self.folders = folder_names(&folders);
        self.apply_filter();
        if let Some(id) = selected_id {
            if let Some(pos) = self
                .filtered
                .iter()
                .position(|&i| self.entries[i].id == id)
            {
                self.selected = pos;
            }
        }
    }

    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    pub fn folder_name(&self, entry: &VaultEntry) -> Option<&str> {
        entry
            .folder_id
            .as_ref()
            .and_then(|id| self.folders.get(id))
            .map(String::as_str)
    }

    /// Entries currently visible, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &VaultEntry> + '_ {
        self.filtered.iter().map(|&i| &self.entries[i])
    }

    pub fn visible_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn selected_position(&self) -> Option<usize> {
        (!self.filtered.is_empty()).then_some(self.selected)
    }

    pub fn selected_entry(&self) -> Option<&VaultEntry> {
        self.filtered
            .get(self.selected)
            .and_then(|&i| self.entries.get(i))
    }

    pub fn move_down(&mut self) {
        if !self.filtered.is_empty() {
            self.selected = (self.selected + 1) % self.filtered.len();
        }
    }

    pub fn move_up(&mut self) {
        if !self.filtered.is_empty() {
            let len = self.filtered.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn goto_top(&mut self) {
        self.selected = 0;
    }

    pub fn goto_bottom(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    pub fn start_filter(&mut self) {
        self.filtering = true;
    }

    /// Leave filter input. The narrowed view stays until the filter is cleared.
    pub fn stop_filter(&mut self) {
        self.filtering = false;
    }

    pub fn clear_filter(&mut self) {
        self.filtering = false;
        self.filter.clear();
        self.apply_filter();
    }

    /// Recompute the visible entries after the filter text changed.
    pub fn apply_filter(&mut self) {
        let query = self.filter.value().trim();
        if query.is_empty() {
            self.filtered = (0..self.entries.len()).collect();
        } else {
            let matcher = SkimMatcherV2::default();
            let mut scored: Vec<(i64, usize)> = self
                .entries
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| {
                    let folder = self.folder_name(entry).unwrap_or_default();
                    let haystack = format!("{} {} {}", entry.name, entry.username, folder);
                    matcher.fuzzy_match(&haystack, query).map(|score| (score, i))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            self.filtered = scored.into_iter().map(|(_, i)| i).collect();
        }
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }
}
