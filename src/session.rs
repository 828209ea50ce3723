//! Session context shared by the front page and its collaborators.
//!
//! Holds the flags other screens use to ask the front page for work (retheme,
//! restart, reorder) alongside the current subreddit and offline mode, and
//! exposes account changes as a broadcast channel that screens subscribe to
//! for as long as they live.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Capacity of the account event channel. Slow subscribers lose the oldest
/// events first.
const ACCOUNT_EVENT_CAPACITY: usize = 16;

/// Account lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    /// Account details (avatar, karma, mail) should be re-read.
    RefreshRequested,
    /// The user logged out and is browsing as a guest.
    ChangedToGuest,
    /// The active account switched.
    Changed { name: String },
}

/// Owned session state for one running front page.
#[derive(Debug)]
pub struct Session {
    /// Subreddit currently shown by the pager.
    pub current_subreddit: String,
    /// Chrome must be recolored at the next opportunity.
    pub needs_retheme: bool,
    /// Tab bar and nav items must be rebuilt on the next appearance.
    pub needs_restart: bool,
    /// The last reachability check failed.
    pub is_offline: bool,
    /// Subscriptions were reordered by another screen.
    pub reorder_changed: bool,
    account: Option<String>,
    events: broadcast::Sender<AccountEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Session {
    pub fn new(account: Option<String>) -> Self {
        let (events, _) = broadcast::channel(ACCOUNT_EVENT_CAPACITY);
        Self {
            current_subreddit: String::new(),
            needs_retheme: false,
            needs_restart: false,
            is_offline: false,
            reorder_changed: false,
            account,
            events,
        }
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }

    /// Switch the active account (None = guest) and notify subscribers.
    pub fn switch_account(&mut self, account: Option<String>) {
        if self.account == account {
            return;
        }
        self.account = account;
        let event = match &self.account {
            Some(name) => AccountEvent::Changed { name: name.clone() },
            None => AccountEvent::ChangedToGuest,
        };
        self.post(event);
    }

    pub fn request_account_refresh(&self) {
        self.post(AccountEvent::RefreshRequested);
    }

    /// Broadcast an event. Having no subscribers is not an error.
    pub fn post(&self, event: AccountEvent) {
        tracing::debug!(?event, "Posting account event");
        if self.events.send(event).is_err() {
            tracing::debug!("No account event subscribers");
        }
    }

    /// Register for account events. Dropping the subscription unregisters.
    pub fn subscribe(&self) -> AccountSubscription {
        AccountSubscription {
            rx: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// A live registration for account events.
#[derive(Debug)]
pub struct AccountSubscription {
    rx: broadcast::Receiver<AccountEvent>,
}

impl AccountSubscription {
    /// Take every event posted since the last drain.
    pub fn drain(&mut self) -> Vec<AccountEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Account subscriber lagged, events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new(None);
        assert!(!session.is_logged_in());
        assert!(!session.needs_retheme);
        assert!(!session.is_offline);
        assert!(session.current_subreddit.is_empty());
    }

    #[test]
    fn test_switch_account_notifies_subscribers() {
        let mut session = Session::new(None);
        let mut sub = session.subscribe();

        session.switch_account(Some("spez".to_string()));
        session.switch_account(None);

        assert_eq!(
            sub.drain(),
            vec![
                AccountEvent::Changed {
                    name: "spez".to_string()
                },
                AccountEvent::ChangedToGuest,
            ]
        );
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn test_switch_to_same_account_is_silent() {
        let mut session = Session::new(Some("spez".to_string()));
        let mut sub = session.subscribe();
        session.switch_account(Some("spez".to_string()));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let session = Session::new(None);
        let sub = session.subscribe();
        assert_eq!(session.subscriber_count(), 1);
        drop(sub);
        assert_eq!(session.subscriber_count(), 0);
        // posting with nobody listening is fine
        session.request_account_refresh();
    }

    #[test]
    fn test_lagged_subscriber_keeps_latest_events() {
        let session = Session::new(None);
        let mut sub = session.subscribe();
        for _ in 0..ACCOUNT_EVENT_CAPACITY + 4 {
            session.request_account_refresh();
        }
        let events = sub.drain();
        assert_eq!(events.len(), ACCOUNT_EVENT_CAPACITY);
    }
}
