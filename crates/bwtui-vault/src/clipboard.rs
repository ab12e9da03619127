use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable")]
    Unavailable,
    #[error("clipboard write failed: {0}")]
    Write(String),
    #[error("clipboard read failed: {0}")]
    Read(String),
}

/// Anything copied values can be written to and read back from.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Current text content. Errors when the clipboard holds no text.
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}

/// The system clipboard. Construction never fails; without a clipboard
/// (headless session, missing display server) every write reports
/// [`ClipboardError::Unavailable`].
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(err) => {
                tracing::warn!("System clipboard unavailable: {err}");
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let cb = self.inner.as_mut().ok_or(ClipboardError::Unavailable)?;
        cb.set_text(text.to_owned())
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        let cb = self.inner.as_mut().ok_or(ClipboardError::Unavailable)?;
        cb.get_text()
            .map_err(|err| ClipboardError::Read(err.to_string()))
    }
}
