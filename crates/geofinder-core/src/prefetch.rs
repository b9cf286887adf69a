//! Single-slot buffer for the next round.
//!
//! Each speculative fetch is stamped with a [`PrefetchTicket`]. Only the most
//! recently issued ticket may fill the slot, so a slow response from an older
//! request can never overwrite a fresher one.

/// Stamp handed out for one speculative fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefetchTicket(u64);

impl PrefetchTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct PrefetchSlot<T> {
    latest: u64,
    value: Option<T>,
}

impl<T> Default for PrefetchSlot<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            value: None,
        }
    }
}

impl<T> PrefetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn issue(&mut self) -> PrefetchTicket {
        self.latest += 1;
        PrefetchTicket(self.latest)
    }

    /// Stores `value` if `ticket` is still the latest. Returns whether it was kept.
    pub fn fulfill(&mut self, ticket: PrefetchTicket, value: T) -> bool {
        if ticket.0 != self.latest {
            return false;
        }
        self.value = Some(value);
        true
    }

    /// Removes and returns the buffered value.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}
