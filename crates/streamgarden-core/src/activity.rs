//! The activity banner: one transient line of text at the bottom of the
//! garden. A new message replaces whatever is showing.

use chrono::{DateTime, Duration, Utc};
use streamgarden_types::{ActivityKind, ActivityMessage};

/// How long a banner of the given tone stays up, in milliseconds.
pub const fn lifetime_ms(kind: ActivityKind) -> i64 {
    match kind {
        ActivityKind::Info => 5_000,
        ActivityKind::Warning => 6_000,
        ActivityKind::Celebration => 7_000,
    }
}

/// Holder for the current banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityBanner {
    current: Option<ActivityMessage>,
}

impl ActivityBanner {
    /// Replace the banner and return the new message.
    pub fn post(
        &mut self,
        text: impl Into<String>,
        kind: ActivityKind,
        now: DateTime<Utc>,
    ) -> ActivityMessage {
        let message = ActivityMessage {
            text: text.into(),
            kind,
            expires_at: now
                .checked_add_signed(Duration::milliseconds(lifetime_ms(kind)))
                .unwrap_or(now),
        };
        self.current = Some(message.clone());
        message
    }

    /// Drop the banner if it has expired. Returns `true` if it was removed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.current.as_ref().is_some_and(|m| now >= m.expires_at) {
            self.current = None;
            return true;
        }
        false
    }

    /// The banner currently on screen.
    pub const fn current(&self) -> Option<&ActivityMessage> {
        self.current.as_ref()
    }

    /// Remove any banner.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
