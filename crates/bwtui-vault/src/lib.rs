pub mod backend;
pub mod clipboard;
pub mod detail;
pub mod dispatch;
pub mod editor;
pub mod fields;
pub mod list;
pub mod model;
pub mod navigation;
pub mod screen;
pub mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bwtui_core::help_popup::HelpEntry;
use bwtui_core::keybinds::{Action, InputMode, KeyState, is_force_quit, process_key};
use bwtui_core::ui::Theme;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use zeroize::Zeroizing;

use backend::VaultBackend;
use clipboard::{Clipboard, SystemClipboard};
use dispatch::{Dispatch, Dispatcher};
use fields::CopyValue;
use model::Session;
use screen::{Effect, Machine};

/// Runtime settings for the vault view.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub theme: Theme,
    pub status_lifetime: Duration,
    /// `None` keeps copied secrets on the clipboard.
    pub clipboard_clear_after: Option<Duration>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            status_lifetime: bwtui_core::status::DEFAULT_STATUS_LIFETIME,
            clipboard_clear_after: Some(Duration::from_secs(30)),
        }
    }
}

// ── Main tool struct ─────────────────────────────────────────────────

/// Owns the screen machine and carries out its effects: dispatching
/// requests, writing the clipboard, clearing copied secrets.
pub struct VaultTool {
    machine: Machine,
    dispatcher: Box<dyn Dispatch>,
    clipboard: Box<dyn Clipboard>,
    key_state: KeyState,
    theme: Theme,
    clipboard_clear_after: Option<Duration>,
    /// The last copied secret, pending auto-clear.
    pending_clear: Option<PendingClear>,
}

struct PendingClear {
    secret: Zeroizing<String>,
    copied_at: Instant,
}

impl VaultTool {
    /// Wire the tool to a backend through a background dispatcher and the
    /// system clipboard.
    pub fn new(backend: Arc<dyn VaultBackend>, settings: VaultSettings) -> anyhow::Result<Self> {
        let dispatcher = Dispatcher::spawn(backend)?;
        Ok(Self::with_parts(
            Box::new(dispatcher),
            Box::new(SystemClipboard::new()),
            settings,
        ))
    }

    pub fn with_parts(
        dispatcher: Box<dyn Dispatch>,
        clipboard: Box<dyn Clipboard>,
        settings: VaultSettings,
    ) -> Self {
        Self {
            machine: Machine::new(settings.status_lifetime),
            dispatcher,
            clipboard,
            key_state: KeyState::default(),
            theme: settings.theme,
            clipboard_clear_after: settings.clipboard_clear_after,
            pending_clear: None,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn mode(&self) -> InputMode {
        self.machine.input_mode()
    }

    /// Skip the prompt with a session obtained elsewhere.
    pub fn resume(&mut self, session: Session) {
        let effects = self.machine.resume(session);
        self.run_effects(effects);
    }

    /// Handle a key press. Returns [`Action::Quit`] or [`Action::Help`] for
    /// the caller to act on, [`Action::None`] otherwise.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if is_force_quit(&key) {
            return Action::Quit;
        }
        match process_key(key, self.machine.input_mode(), &mut self.key_state) {
            Action::None => Action::None,
            Action::Help => Action::Help,
            action => {
                let effects = self.machine.handle_action(action);
                self.run_effects(effects)
            }
        }
    }

    /// Drain finished requests, expire the status line and clear the
    /// clipboard once a copied secret has been there long enough.
    pub fn tick(&mut self) {
        while let Some(response) = self.dispatcher.poll() {
            let effects = self.machine.handle_response(response);
            self.run_effects(effects);
        }
        self.machine.status.expire(Instant::now());
        self.clear_clipboard_if_expired(Instant::now());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        ui::render_vault(frame, area, &self.machine, &self.theme);
    }

    pub fn help_entries(&self) -> Vec<HelpEntry> {
        self.machine.help_entries()
    }

    pub fn reset_key_state(&mut self) {
        self.key_state.reset();
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Action {
        let mut result = Action::None;
        for effect in effects {
            match effect {
                Effect::Dispatch { ticket, request } => self.dispatcher.dispatch(ticket, request),
                Effect::Copy(value) => self.copy_to_clipboard(value),
                Effect::Quit => result = Action::Quit,
            }
        }
        result
    }

    fn copy_to_clipboard(&mut self, value: CopyValue) {
        match self.clipboard.write_text(&value.value) {
            Ok(()) => {
                self.machine.status.info(format!("Copied {}", value.label));
                self.pending_clear = value.sensitive.then(|| PendingClear {
                    secret: Zeroizing::new(value.value),
                    copied_at: Instant::now(),
                });
            }
            Err(err) => {
                tracing::warn!("Copy failed: {err}");
                self.machine.status.error(format!("Copy failed: {err}"));
            }
        }
    }

    /// Overwrite a copied secret once it expires, but only while the
    /// clipboard still holds it. Anything copied since, here or in another
    /// program, is left alone.
    fn clear_clipboard_if_expired(&mut self, now: Instant) {
        let Some(after) = self.clipboard_clear_after else {
            return;
        };
        let expired = self
            .pending_clear
            .as_ref()
            .is_some_and(|pending| now.saturating_duration_since(pending.copied_at) >= after);
        if !expired {
            return;
        }
        let Some(pending) = self.pending_clear.take() else {
            return;
        };
        let current = match self.clipboard.read_text() {
            Ok(text) => Zeroizing::new(text),
            Err(err) => {
                tracing::debug!("Skipping clipboard clear: {err}");
                return;
            }
        };
        if *current != *pending.secret {
            tracing::debug!("Clipboard changed since copy, not clearing");
            return;
        }
        match self.clipboard.write_text("") {
            Ok(()) => tracing::debug!("Cleared copied secret from clipboard"),
            Err(err) => tracing::warn!("Failed to clear clipboard: {err}"),
        }
    }
}
