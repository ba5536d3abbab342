//! Request sequencing.
//!
//! Every fetch takes a [`Ticket`] before it starts. When it completes, the
//! result is applied only if no newer ticket has been issued in the
//! meantime; otherwise it is stale and must be dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

/// Proof of when a request was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Sequence number of this ticket.
    #[must_use]
    pub const fn number(self) -> u64 {
        self.0
    }
}

impl RequestSequencer {
    /// Creates a sequencer that has issued no tickets.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a ticket newer than every ticket issued before.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the newest issued.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
