//! Ephemeral user-facing messages.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Notice {
    message: String,
    posted: Instant,
}

/// Holds at most one message; a new message replaces the old one.
/// Messages expire `ttl` after being posted.
#[derive(Clone, Debug)]
pub struct Notifications {
    ttl: Duration,
    current: Option<Notice>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn post(&mut self, message: impl Into<String>) {
        self.current = Some(Notice {
            message: message.into(),
            posted: Instant::now(),
        });
    }

    /// The live message, if it has not expired yet
    pub fn current(&self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    fn current_at(&self, now: Instant) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.posted) < self.ttl)
            .map(|n| n.message.as_str())
    }

    /// Drop the message once expired. Returns true if one was dropped.
    pub fn expire(&mut self) -> bool {
        if self.current.is_some() && self.current().is_none() {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_message_wins() {
        let mut notices = Notifications::new(Duration::from_secs(3));
        assert_eq!(notices.current(), None);
        notices.post("first");
        notices.post("second");
        assert_eq!(notices.current(), Some("second"));
    }

    #[test]
    fn test_message_expires() {
        let mut notices = Notifications::new(Duration::from_millis(3000));
        notices.post("Game joined!");
        let posted = notices.current.as_ref().unwrap().posted;

        assert_eq!(notices.current_at(posted + Duration::from_millis(2999)), Some("Game joined!"));
        assert_eq!(notices.current_at(posted + Duration::from_millis(3000)), None);
    }

    #[test]
    fn test_expire_drops_stale_message() {
        let mut notices = Notifications::new(Duration::ZERO);
        notices.post("gone");
        assert!(notices.expire());
        assert!(!notices.expire());
        assert!(notices.current.is_none());
    }
}
