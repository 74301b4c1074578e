//! Load tickets and the last-request-wins tracker.

use serde::{Deserialize, Serialize};

/// Identifies one asset load request. Tickets are never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LoadTicket(pub u32);

/// Tracks the single load the avatar is currently waiting for.
///
/// Starting a new load supersedes whatever was in flight; completions for
/// any other ticket are stale and must be discarded without binding.
#[derive(Default, Debug)]
pub struct LoadTracker {
    next: u32,
    pending: Option<(LoadTicket, String)>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load for `url`, superseding any pending one.
    #[inline]
    pub fn begin(&mut self, url: impl Into<String>) -> LoadTicket {
        let ticket = LoadTicket(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending = Some((ticket, url.into()));
        ticket
    }

    /// Claim the pending load if `ticket` is the current one. Returns the URL
    /// it was started for; `None` for stale or unknown tickets.
    pub fn resolve(&mut self, ticket: LoadTicket) -> Option<String> {
        if self.pending() != Some(ticket) {
            return None;
        }
        self.pending.take().map(|(_, url)| url)
    }

    /// Drop the pending load, if any.
    #[inline]
    pub fn cancel(&mut self) -> Option<LoadTicket> {
        self.pending.take().map(|(t, _)| t)
    }

    pub fn pending(&self) -> Option<LoadTicket> {
        self.pending.as_ref().map(|(t, _)| *t)
    }

    pub fn pending_url(&self) -> Option<&str> {
        self.pending.as_ref().map(|(_, u)| u.as_str())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_monotonic() {
        let mut t = LoadTracker::new();
        assert_eq!(t.begin("a"), LoadTicket(0));
        assert_eq!(t.begin("b"), LoadTicket(1));
    }

    #[test]
    fn newer_load_supersedes_older() {
        let mut t = LoadTracker::new();
        let a = t.begin("a.vrm");
        let b = t.begin("b.vrm");
        assert_eq!(t.resolve(a), None);
        assert_eq!(t.resolve(b).as_deref(), Some("b.vrm"));
        // Resolving twice is stale too.
        assert_eq!(t.resolve(b), None);
        assert!(!t.is_pending());
    }

    #[test]
    fn cancel_invalidates_pending() {
        let mut t = LoadTracker::new();
        let a = t.begin("a.vrm");
        assert_eq!(t.cancel(), Some(a));
        assert_eq!(t.resolve(a), None);
    }
}
