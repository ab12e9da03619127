use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::Frame;

use bwtui_core::{
    help_popup::{self, HelpPopup},
    keybinds::{Action, is_force_quit},
};
use bwtui_vault::VaultTool;

/// The main application state.
pub struct App {
    vault: VaultTool,
    help_popup: HelpPopup,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    pub fn new(vault: VaultTool) -> Self {
        Self {
            vault,
            help_popup: HelpPopup::new(),
            should_quit: false,
        }
    }

    /// Poll finished backend work and expire timers (called every ~50ms).
    pub fn tick(&mut self) {
        self.vault.tick();
    }

    /// Handle a terminal event.
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };

        // Ctrl-c / Ctrl-d always quit, even over the help popup
        if is_force_quit(&key) {
            tracing::info!("Quit requested");
            self.should_quit = true;
            return;
        }

        if self.help_popup.visible {
            self.handle_help_key(key);
            return;
        }

        match self.vault.handle_key(key) {
            Action::Quit => {
                tracing::info!("Quit requested");
                self.should_quit = true;
            }
            Action::Help => self.show_help(),
            _ => {}
        }
    }

    fn show_help(&mut self) {
        self.vault.reset_key_state();
        let mut entries = self.vault.help_entries();
        entries.extend(help_popup::global_help_entries());
        self.help_popup.show("Help", entries);
    }

    /// Handle key events while the help popup is visible.
    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.help_popup.hide();
                self.vault.reset_key_state();
            }
            KeyCode::Char('j') | KeyCode::Down => self.help_popup.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.help_popup.scroll_up(),
            KeyCode::PageDown => {
                for _ in 0..10 {
                    self.help_popup.scroll_down();
                }
            }
            KeyCode::PageUp => {
                for _ in 0..10 {
                    self.help_popup.scroll_up();
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        self.vault.render(frame, area);
        // Overlays (rendered last, on top)
        self.help_popup.render(frame, area);
    }
}
