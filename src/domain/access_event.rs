//! Access event model for asynchronous access counting.

use std::time::Instant;

/// A successful resolution of a short code, waiting to be counted.
///
/// Sent from the request path to the background access worker so the
/// response never waits for the counter update.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub short_code: String,
    pub enqueued_at: Instant,
}

impl AccessEvent {
    /// Creates an event for `short_code`, stamped with the current instant.
    pub fn new(short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            enqueued_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_event_creation() {
        let before = Instant::now();
        let event = AccessEvent::new("abcd1234");

        assert_eq!(event.short_code, "abcd1234");
        assert!(event.enqueued_at >= before);
    }
}
