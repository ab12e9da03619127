use std::time::{Duration, Instant};

/// Default lifetime of a transient status message.
pub const DEFAULT_STATUS_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A message shown briefly in the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    shown_at: Instant,
}

impl StatusMessage {
    pub fn shown_at(&self) -> Instant {
        self.shown_at
    }
}

/// Holds at most one transient message and drops it once its lifetime passes.
#[derive(Debug, Clone)]
pub struct StatusLine {
    current: Option<StatusMessage>,
    lifetime: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_LIFETIME)
    }
}

impl StatusLine {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            current: None,
            lifetime,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.show(text.into(), StatusKind::Info, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(text.into(), StatusKind::Error, Instant::now());
    }

    /// Replace the current message. A new message restarts the lifetime.
    pub fn show(&mut self, text: String, kind: StatusKind, now: Instant) {
        self.current = Some(StatusMessage {
            text,
            kind,
            shown_at: now,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the message if it outlived its lifetime.
    pub fn expire(&mut self, now: Instant) {
        if let Some(ref msg) = self.current {
            if now.saturating_duration_since(msg.shown_at) >= self.lifetime {
                self.current = None;
            }
        }
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_expires_after_lifetime() {
        let mut status = StatusLine::new(Duration::from_millis(500));
        let start = Instant::now();
        status.show("copied password".into(), StatusKind::Info, start);

        status.expire(start + Duration::from_millis(499));
        assert_eq!(status.text(), Some("copied password"));

        status.expire(start + Duration::from_millis(500));
        assert!(status.message().is_none());
    }

    #[test]
    fn test_new_message_restarts_lifetime() {
        let mut status = StatusLine::new(Duration::from_secs(1));
        let start = Instant::now();
        status.show("first".into(), StatusKind::Info, start);
        status.show(
            "second".into(),
            StatusKind::Error,
            start + Duration::from_millis(900),
        );
        status.expire(start + Duration::from_millis(1500));
        let msg = status.message().unwrap();
        assert_eq!(msg.text, "second");
        assert_eq!(msg.kind, StatusKind::Error);
    }
}
