//! Per-slot request sequencing.
//!
//! Commands are never serialized, so two fetches for the same cache slot
//! can be in flight at once and resolve in either order. Every request
//! that writes a slot draws a [`Ticket`] before it is sent; when the
//! response arrives it is applied only if its ticket is still the newest
//! one issued for that slot. The loser is dropped, so the cache always
//! reflects the latest-issued request rather than the latest-arriving
//! response.

use std::sync::atomic::{AtomicU64, Ordering};

/// A cache slot that has its own request sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The main [`GameState`](laundromat_types::GameState) snapshot.
    Snapshot,
    /// The credit report.
    Credit,
    /// The zone report.
    Zone,
    /// The calendar of scheduled actions.
    Calendar,
}

impl Slot {
    /// Every slot, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Snapshot, Self::Credit, Self::Zone, Self::Calendar];

    /// Name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Credit => "credit",
            Self::Zone => "zone",
            Self::Calendar => "calendar",
        }
    }
}

/// Proof that a request was issued, and in which position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slot: Slot,
    seq: u64,
}

impl Ticket {
    /// Slot the ticket was drawn for.
    pub const fn slot(self) -> Slot {
        self.slot
    }

    /// Position in the slot's sequence, starting at 1.
    pub const fn seq(self) -> u64 {
        self.seq
    }
}

/// Monotonic counters, one per [`Slot`].
#[derive(Debug, Default)]
pub struct RequestSequencer {
    snapshot: AtomicU64,
    credit: AtomicU64,
    zone: AtomicU64,
    calendar: AtomicU64,
}

impl RequestSequencer {
    /// Create a sequencer with every counter at zero.
    pub const fn new() -> Self {
        Self {
            snapshot: AtomicU64::new(0),
            credit: AtomicU64::new(0),
            zone: AtomicU64::new(0),
            calendar: AtomicU64::new(0),
        }
    }

    const fn counter(&self, slot: Slot) -> &AtomicU64 {
        match slot {
            Slot::Snapshot => &self.snapshot,
            Slot::Credit => &self.credit,
            Slot::Zone => &self.zone,
            Slot::Calendar => &self.calendar,
        }
    }

    /// Draw the next ticket for `slot`. Supersedes every earlier ticket.
    pub fn issue(&self, slot: Slot) -> Ticket {
        let previous = self.counter(slot).fetch_add(1, Ordering::AcqRel);
        Ticket {
            slot,
            seq: previous.wrapping_add(1),
        }
    }

    /// Whether no newer ticket has been issued for the ticket's slot.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.slot).load(Ordering::Acquire) == ticket.seq
    }

    /// Supersede every outstanding ticket on every slot.
    ///
    /// Used when the playthrough changes: anything requested before this
    /// point describes a game that no longer exists.
    pub fn invalidate_all(&self) {
        for slot in Slot::ALL {
            self.counter(slot).fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_wins() {
        let seq = RequestSequencer::new();
        let first = seq.issue(Slot::Snapshot);
        let second = seq.issue(Slot::Snapshot);
        assert_eq!(first.seq(), 1);
        assert_eq!(second.seq(), 2);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn slots_are_independent() {
        let seq = RequestSequencer::new();
        let snapshot = seq.issue(Slot::Snapshot);
        let credit = seq.issue(Slot::Credit);
        let _newer_credit = seq.issue(Slot::Credit);
        assert!(seq.is_current(snapshot));
        assert!(!seq.is_current(credit));
        assert_eq!(credit.slot(), Slot::Credit);
    }

    #[test]
    fn invalidate_all_supersedes_every_slot() {
        let seq = RequestSequencer::new();
        let tickets: Vec<Ticket> = Slot::ALL.iter().map(|slot| seq.issue(*slot)).collect();
        seq.invalidate_all();
        for ticket in tickets {
            assert!(!seq.is_current(ticket), "{} still current", ticket.slot().as_str());
        }
        let fresh = seq.issue(Slot::Zone);
        assert!(seq.is_current(fresh));
    }
}
