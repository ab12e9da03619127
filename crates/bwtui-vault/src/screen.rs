//! Screen state machine.
//!
//! Exactly one [`Screen`] is active. User actions and backend responses go
//! through [`Machine::handle_action`] and [`Machine::handle_response`], which
//! return the side effects for the controller to carry out. Nothing here
//! touches the terminal, the clipboard or the backend directly.
//!
//! Every change of screen bumps the epoch. Requests are stamped with the
//! epoch they were issued under, and a response from an older epoch is
//! dropped without touching state.

use std::time::Duration;

use bwtui_core::help_popup::HelpEntry;
use bwtui_core::keybinds::{Action, InputMode};
use bwtui_core::status::StatusLine;
use bwtui_core::text_input::TextInput;

use crate::detail::DetailPanel;
use crate::dispatch::{Completion, Failure, Request, Response, Ticket};
use crate::editor::EntryEditor;
use crate::fields::CopyValue;
use crate::list::EntryList;
use crate::model::{ListFilter, Session};

#[derive(Debug)]
pub struct PromptState {
    pub input: TextInput,
    /// Unlock or the first listing is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for PromptState {
    fn default() -> Self {
        Self {
            input: TextInput::new().masked().with_placeholder("Master password"),
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug)]
pub enum Screen {
    CredentialPrompt(PromptState),
    EntryList(EntryList),
    /// The list is kept so going back does not need a reload.
    EntryDetail {
        detail: DetailPanel,
        list: EntryList,
    },
    EntryEditor {
        editor: EntryEditor,
        list: EntryList,
    },
}

impl Default for Screen {
    fn default() -> Self {
        Self::CredentialPrompt(PromptState::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    CredentialPrompt,
    EntryList,
    EntryDetail,
    EntryEditor,
}

impl ScreenKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::CredentialPrompt => "Unlock",
            Self::EntryList => "Entries",
            Self::EntryDetail => "Entry",
            Self::EntryEditor => "New entry",
        }
    }
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::CredentialPrompt(_) => ScreenKind::CredentialPrompt,
            Self::EntryList(_) => ScreenKind::EntryList,
            Self::EntryDetail { .. } => ScreenKind::EntryDetail,
            Self::EntryEditor { .. } => ScreenKind::EntryEditor,
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug)]
pub enum Effect {
    Dispatch { ticket: Ticket, request: Request },
    Copy(CopyValue),
    Quit,
}

/// Effects before their requests are stamped with a ticket.
enum Intent {
    Dispatch(Request),
    Copy(CopyValue),
}

type Step = (Screen, Vec<Intent>);

pub struct Machine {
    screen: Screen,
    session: Option<Session>,
    epoch: u64,
    next_ticket: u64,
    pub status: StatusLine,
}

impl Machine {
    pub fn new(status_lifetime: Duration) -> Self {
        Self {
            screen: Screen::default(),
            session: None,
            epoch: 0,
            next_ticket: 0,
            status: StatusLine::new(status_lifetime),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Adopt an existing session and list entries without prompting.
    pub fn resume(&mut self, session: Session) -> Vec<Effect> {
        tracing::info!("Resuming with supplied session");
        self.session = Some(session);
        let before = self.screen.kind();
        let mut screen = std::mem::take(&mut self.screen);
        let mut intents = Vec::new();
        if let Screen::CredentialPrompt(ref mut prompt) = screen {
            prompt.loading = true;
            intents.extend(self.list_request().map(Intent::Dispatch));
        }
        self.finish(before, (screen, intents))
    }

    pub fn input_mode(&self) -> InputMode {
        match &self.screen {
            Screen::CredentialPrompt(_) | Screen::EntryEditor { .. } => InputMode::Insert,
            Screen::EntryList(list) if list.filtering => InputMode::Insert,
            Screen::EntryList(_) | Screen::EntryDetail { .. } => InputMode::Normal,
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        if action == Action::Quit {
            return vec![Effect::Quit];
        }
        let before = self.screen.kind();
        let step = match std::mem::take(&mut self.screen) {
            Screen::CredentialPrompt(prompt) => self.prompt_action(prompt, action),
            Screen::EntryList(list) => self.list_action(list, action),
            Screen::EntryDetail { detail, list } => self.detail_action(detail, list, action),
            Screen::EntryEditor { editor, list } => self.editor_action(editor, list, action),
        };
        self.finish(before, step)
    }

    pub fn handle_response(&mut self, response: Response) -> Vec<Effect> {
        if response.ticket.epoch != self.epoch {
            tracing::debug!(
                ticket = response.ticket.id,
                epoch = response.ticket.epoch,
                current = self.epoch,
                "Discarding stale response"
            );
            return Vec::new();
        }
        let before = self.screen.kind();
        let screen = std::mem::take(&mut self.screen);
        let step = match response.outcome {
            Ok(completion) => self.complete(screen, completion),
            Err(failure) => self.fail(screen, failure),
        };
        self.finish(before, step)
    }

    /// Install the new screen, bump the epoch on a change of screen, then
    /// stamp requests so they belong to the screen that issued them.
    fn finish(&mut self, before: ScreenKind, (screen, intents): Step) -> Vec<Effect> {
        if screen.kind() != before {
            self.epoch += 1;
            tracing::debug!(from = ?before, to = ?screen.kind(), epoch = self.epoch, "Screen change");
        }
        self.screen = screen;
        intents
            .into_iter()
            .map(|intent| match intent {
                Intent::Dispatch(request) => {
                    self.next_ticket += 1;
                    Effect::Dispatch {
                        ticket: Ticket {
                            id: self.next_ticket,
                            epoch: self.epoch,
                        },
                        request,
                    }
                }
                Intent::Copy(value) => Effect::Copy(value),
            })
            .collect()
    }

    fn list_request(&self) -> Option<Request> {
        self.session.clone().map(|session| Request::ListEntries {
            session,
            filter: ListFilter::default(),
        })
    }

    /// A list-side request, or an error status when there is no session.
    fn session_request(&mut self, build: impl FnOnce(Session) -> Request) -> Option<Request> {
        match self.session.clone() {
            Some(session) => Some(build(session)),
            None => {
                self.status.error("Vault is locked");
                None
            }
        }
    }

    // ── Key handling per screen ──────────────────────────────────────

    fn prompt_action(&mut self, mut prompt: PromptState, action: Action) -> Step {
        match action {
            Action::Submit if prompt.loading => (Screen::CredentialPrompt(prompt), Vec::new()),
            Action::Submit => {
                if prompt.input.is_empty() {
                    prompt.error = Some("Enter your master password".into());
                    return (Screen::CredentialPrompt(prompt), Vec::new());
                }
                let password = prompt.input.take();
                prompt.loading = true;
                prompt.error = None;
                (
                    Screen::CredentialPrompt(prompt),
                    vec![Intent::Dispatch(Request::Unlock { password })],
                )
            }
            Action::Back => {
                prompt.input.clear();
                prompt.error = None;
                (Screen::CredentialPrompt(prompt), Vec::new())
            }
            other => {
                if prompt.input.apply(&other) {
                    prompt.error = None;
                }
                (Screen::CredentialPrompt(prompt), Vec::new())
            }
        }
    }

    fn list_action(&mut self, mut list: EntryList, action: Action) -> Step {
        if list.filtering {
            match action {
                Action::Submit => list.stop_filter(),
                Action::Back => list.clear_filter(),
                Action::NextField => list.move_down(),
                Action::PrevField => list.move_up(),
                other => {
                    if list.filter.apply(&other) {
                        list.apply_filter();
                    }
                }
            }
            return (Screen::EntryList(list), Vec::new());
        }

        let mut intents = Vec::new();
        match action {
            Action::MoveDown => list.move_down(),
            Action::MoveUp => list.move_up(),
            Action::GotoTop => list.goto_top(),
            Action::GotoBottom => list.goto_bottom(),
            Action::Search => list.start_filter(),
            Action::Back => {
                if !list.filter.is_empty() {
                    list.clear_filter();
                }
            }
            Action::Confirm if !list.loading => {
                if let Some(id) = list.selected_entry().map(|e| e.id.clone()) {
                    if let Some(request) =
                        self.session_request(|session| Request::FetchEntry { session, id })
                    {
                        list.loading = true;
                        intents.push(Intent::Dispatch(request));
                    }
                }
            }
            Action::Sync if !list.loading => {
                if let Some(request) = self.session_request(|session| Request::Sync { session }) {
                    list.loading = true;
                    self.status.info("Syncing vault");
                    intents.push(Intent::Dispatch(request));
                }
            }
            Action::Refresh if !list.loading => {
                if let Some(request) = self.session_request(|session| Request::ListEntries {
                    session,
                    filter: ListFilter::default(),
                }) {
                    list.loading = true;
                    intents.push(Intent::Dispatch(request));
                }
            }
            Action::Add => {
                list.loading = false;
                return (
                    Screen::EntryEditor {
                        editor: EntryEditor::new(),
                        list,
                    },
                    Vec::new(),
                );
            }
            _ => {}
        }
        (Screen::EntryList(list), intents)
    }

    fn detail_action(&mut self, mut detail: DetailPanel, list: EntryList, action: Action) -> Step {
        let mut intents = Vec::new();
        match action {
            Action::MoveDown => detail.move_down(),
            Action::MoveUp => detail.move_up(),
            Action::GotoTop => detail.goto_top(),
            Action::GotoBottom => detail.goto_bottom(),
            Action::Back => return (Screen::EntryList(list), Vec::new()),
            Action::Confirm | Action::Copy => match detail.copy_selected() {
                Some(value) if value.value.is_empty() => {
                    self.status.error(format!("{} is empty", value.label));
                }
                Some(value) => intents.push(Intent::Copy(value)),
                None => self.status.error("Nothing to copy"),
            },
            _ => {}
        }
        (Screen::EntryDetail { detail, list }, intents)
    }

    fn editor_action(&mut self, mut editor: EntryEditor, list: EntryList, action: Action) -> Step {
        match action {
            Action::Back => {
                tracing::debug!("Draft discarded");
                return (Screen::EntryList(list), Vec::new());
            }
            Action::NextField => editor.next_field(),
            Action::PrevField => editor.prev_field(),
            Action::Submit if !editor.saving => match editor.to_entry() {
                Ok(draft) => {
                    if let Some(request) =
                        self.session_request(|session| Request::CreateEntry { session, draft })
                    {
                        editor.saving = true;
                        return (
                            Screen::EntryEditor { editor, list },
                            vec![Intent::Dispatch(request)],
                        );
                    }
                }
                Err(reason) => self.status.error(reason),
            },
            other => {
                editor.apply(&other);
            }
        }
        (Screen::EntryEditor { editor, list }, Vec::new())
    }

    // ── Backend results ──────────────────────────────────────────────

    fn complete(&mut self, screen: Screen, completion: Completion) -> Step {
        match (screen, completion) {
            (Screen::CredentialPrompt(prompt), Completion::Unlocked(session)) => {
                tracing::info!("Vault unlocked");
                self.session = Some(session);
                let intents = self.list_request().map(Intent::Dispatch).into_iter().collect();
                (Screen::CredentialPrompt(prompt), intents)
            }
            (Screen::CredentialPrompt(_), Completion::Listed { entries, folders }) => {
                tracing::info!(count = entries.len(), "Entries loaded");
                (Screen::EntryList(EntryList::new(entries, folders)), Vec::new())
            }
            (Screen::EntryList(mut list), Completion::Listed { entries, folders }) => {
                list.replace_entries(entries, folders);
                list.loading = false;
                (Screen::EntryList(list), Vec::new())
            }
            (Screen::EntryList(mut list), Completion::Fetched(entry)) => {
                list.loading = false;
                let folder = list.folder_name(&entry).map(str::to_string);
                (
                    Screen::EntryDetail {
                        detail: DetailPanel::new(entry, folder),
                        list,
                    },
                    Vec::new(),
                )
            }
            (Screen::EntryList(list), Completion::Synced) => {
                self.status.info("Vault synced");
                let intents = self.list_request().map(Intent::Dispatch).into_iter().collect();
                (Screen::EntryList(list), intents)
            }
            (Screen::EntryEditor { mut list, .. }, Completion::Created { name }) => {
                self.status.info(format!("Created {name}"));
                let intents: Vec<Intent> =
                    self.list_request().map(Intent::Dispatch).into_iter().collect();
                list.loading = !intents.is_empty();
                (Screen::EntryList(list), intents)
            }
            (screen, _) => {
                tracing::debug!(screen = ?screen.kind(), "Ignoring unexpected completion");
                (screen, Vec::new())
            }
        }
    }

    fn fail(&mut self, screen: Screen, failure: Failure) -> Step {
        match screen {
            Screen::CredentialPrompt(mut prompt) => {
                self.session = None;
                prompt.input.clear();
                prompt.loading = false;
                prompt.error = Some(failure.message);
                (Screen::CredentialPrompt(prompt), Vec::new())
            }
            Screen::EntryList(mut list) => {
                list.loading = false;
                self.status.error(failure.message);
                (Screen::EntryList(list), Vec::new())
            }
            Screen::EntryEditor { mut editor, list } => {
                editor.saving = false;
                self.status.error(failure.message);
                (Screen::EntryEditor { editor, list }, Vec::new())
            }
            Screen::EntryDetail { detail, list } => {
                self.status.error(failure.message);
                (Screen::EntryDetail { detail, list }, Vec::new())
            }
        }
    }

    // ── Presentation helpers ─────────────────────────────────────────

    /// Key hints for the status bar.
    pub fn hints(&self) -> &'static str {
        match &self.screen {
            Screen::CredentialPrompt(_) => "enter unlock  esc clear  ctrl-c quit",
            Screen::EntryList(list) if list.filtering => "enter keep filter  esc clear  tab/↓ ↑ move",
            Screen::EntryList(_) => "enter open  / filter  a new  s sync  r refresh  ? help  q quit",
            Screen::EntryDetail { .. } => "j/k move  enter/c copy  esc back  ? help  q quit",
            Screen::EntryEditor { .. } => "tab/↓ next  shift-tab/↑ prev  enter save  esc discard",
        }
    }

    pub fn help_entries(&self) -> Vec<HelpEntry> {
        let entries: &[(&str, &str, &str)] = match self.screen.kind() {
            ScreenKind::CredentialPrompt => &[
                ("Unlock", "Enter", "Unlock the vault"),
                ("Unlock", "Esc", "Clear the input"),
            ],
            ScreenKind::EntryList => &[
                ("Entries", "j/k", "Move selection"),
                ("Entries", "gg/G", "First / last entry"),
                ("Entries", "Enter", "Open entry"),
                ("Entries", "/", "Filter entries"),
                ("Entries", "a", "New entry"),
                ("Entries", "s", "Sync with server"),
                ("Entries", "r", "Reload the list"),
                ("Entries", "q", "Quit"),
            ],
            ScreenKind::EntryDetail => &[
                ("Entry", "j/k Tab", "Next / previous field"),
                ("Entry", "Enter/c", "Copy field value"),
                ("Entry", "Esc/h", "Back to list"),
                ("Entry", "q", "Quit"),
            ],
            ScreenKind::EntryEditor => &[
                ("New entry", "Tab/↓", "Next field"),
                ("New entry", "S-Tab/↑", "Previous field"),
                ("New entry", "Enter", "Create entry"),
                ("New entry", "Esc", "Discard draft"),
            ],
        };
        entries
            .iter()
            .map(|(section, key, desc)| HelpEntry::new(*section, *key, *desc))
            .collect()
    }
}
