//! Shared building blocks for bwtui: key handling, text input, the transient
//! status line, the help popup, theming, configuration and logging.

pub mod config;
pub mod help_popup;
pub mod keybinds;
pub mod logging;
pub mod status;
pub mod text_input;
pub mod ui;
