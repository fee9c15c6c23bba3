//! Transient user notifications.
//!
//! A single slot: showing a message replaces whatever is visible and restarts
//! the visibility window. Every `show` hands back a [`NotificationTicket`];
//! expiring with a ticket that is no longer current does nothing, so a
//! replaced message's timer never clears its successor.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// How long a notification stays visible by default.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Handle for one `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTicket {
    pub generation: u64,
    pub expires_at: Instant,
}

/// Single-slot holder for a timed message.
#[derive(Debug)]
pub struct NotificationQueue {
    window: Duration,
    generation: u64,
    slot: Option<(Notification, NotificationTicket)>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl NotificationQueue {
    /// Create an empty queue with the given visibility window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            slot: None,
        }
    }

    /// Show `message`, replacing any visible one.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationTicket {
        self.generation += 1;
        let ticket = NotificationTicket {
            generation: self.generation,
            expires_at: Instant::now() + self.window,
        };
        let message = message.into();
        debug!(generation = ticket.generation, ?kind, %message, "notification shown");
        self.slot = Some((Notification { message, kind }, ticket));
        ticket
    }

    /// Show a success message.
    pub fn success(&mut self, message: impl Into<String>) -> NotificationTicket {
        self.show(message, NotificationKind::Success)
    }

    /// Show an error message.
    pub fn error(&mut self, message: impl Into<String>) -> NotificationTicket {
        self.show(message, NotificationKind::Error)
    }

    /// The visible notification, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.slot.as_ref().map(|(n, _)| n)
    }

    /// Ticket of the visible notification.
    #[must_use]
    pub fn ticket(&self) -> Option<NotificationTicket> {
        self.slot.as_ref().map(|(_, t)| *t)
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.slot.is_some()
    }

    /// Clear the slot if `generation` is still the visible one.
    ///
    /// Returns whether anything was cleared.
    pub fn expire(&mut self, generation: u64) -> bool {
        match &self.slot {
            Some((_, ticket)) if ticket.generation == generation => {
                self.slot = None;
                debug!(generation, "notification expired");
                true
            }
            _ => false,
        }
    }

    /// Clear the slot if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.ticket() {
            Some(ticket) if now >= ticket.expires_at => self.expire(ticket.generation),
            _ => false,
        }
    }

    /// Wait for the visible notification's window to end, then clear it.
    ///
    /// Returns `false` at once when nothing is visible. Dropping the future
    /// early leaves the slot untouched.
    pub async fn expired(&mut self) -> bool {
        let Some(ticket) = self.ticket() else {
            return false;
        };
        sleep_until(ticket.expires_at).await;
        self.poll(Instant::now())
    }

    /// Clear the slot immediately.
    pub fn dismiss(&mut self) -> bool {
        self.slot.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_second_show_replaces_and_restarts_window() {
        let mut queue = NotificationQueue::default();

        let first = queue.success("Product saved");
        tokio::time::advance(Duration::from_secs(2)).await;
        let second = queue.error("Failed to load attributes");

        assert_eq!(
            queue.current(),
            Some(&Notification {
                message: "Failed to load attributes".into(),
                kind: NotificationKind::Error
            })
        );
        assert_eq!(second.expires_at - first.expires_at, Duration::from_secs(2));

        // The first window ends; its timer must not clear the second message.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!queue.expire(first.generation));
        assert!(!queue.poll(Instant::now()));
        assert!(queue.is_visible());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(queue.poll(Instant::now()));
        assert!(!queue.is_visible());
        assert!(!queue.expire(second.generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_waits_for_window() {
        let mut queue = NotificationQueue::new(Duration::from_secs(3));
        assert!(!queue.expired().await);

        let shown = Instant::now();
        queue.error("Failed to load orders");
        assert!(queue.expired().await);

        assert_eq!(shown.elapsed(), Duration::from_secs(3));
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_dismiss() {
        let mut queue = NotificationQueue::new(Duration::from_secs(10));
        assert!(!queue.dismiss());

        queue.error("boom");
        assert!(queue.dismiss());
        assert!(queue.current().is_none());
    }
}
