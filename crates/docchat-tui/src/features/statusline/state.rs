use std::time::{Duration, Instant};

/// How long a guidance hint stays visible.
pub const HINT_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone)]
struct Hint {
    text: String,
    expires_at: Instant,
}

#[derive(Debug, Default, Clone)]
pub struct StatusLine {
    hint: Option<Hint>,
}

impl StatusLine {
    pub fn set_hint(&mut self, text: impl Into<String>, now: Instant) {
        self.hint = Some(Hint {
            text: text.into(),
            expires_at: now + HINT_DURATION,
        });
    }

    pub fn clear_hint(&mut self) {
        self.hint = None;
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_ref().map(|h| h.text.as_str())
    }

    /// Drops the hint once its time is up.
    pub fn expire(&mut self, now: Instant) {
        if self.hint.as_ref().is_some_and(|h| now >= h.expires_at) {
            self.hint = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_expires() {
        let start = Instant::now();
        let mut status = StatusLine::default();
        status.set_hint("wait", start);

        status.expire(start + Duration::from_secs(1));
        assert_eq!(status.hint(), Some("wait"));

        status.expire(start + HINT_DURATION);
        assert_eq!(status.hint(), None);
    }
}
