//! Keeps one round buffered ahead of play.

use geofinder_core::api::{ApiError, GameApi};
use geofinder_core::prefetch::{PrefetchSlot, PrefetchTicket};
use geofinder_core::round::{GameMode, Round};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Async driver around a [`PrefetchSlot`].
///
/// Tickets are issued synchronously, before any await, so the order of
/// `prefetch_next`/`spawn_prefetch` calls is the order of their tickets no
/// matter when the responses arrive.
#[derive(Clone)]
pub struct RoundPrefetcher {
    api: Arc<dyn GameApi>,
    mode: GameMode,
    slot: Arc<Mutex<PrefetchSlot<Round>>>,
}

impl RoundPrefetcher {
    pub fn new(api: Arc<dyn GameApi>, mode: GameMode) -> Self {
        Self {
            api,
            mode,
            slot: Arc::new(Mutex::new(PrefetchSlot::new())),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    fn slot(&self) -> MutexGuard<'_, PrefetchSlot<Round>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches one round into the slot. Returns whether it was kept; a
    /// response superseded by a newer prefetch is dropped.
    pub async fn prefetch_next(&self) -> bool {
        let ticket = self.slot().issue();
        self.fetch_into(ticket).await
    }

    /// Fire-and-forget [`prefetch_next`](Self::prefetch_next).
    pub fn spawn_prefetch(&self) -> JoinHandle<bool> {
        let ticket = self.slot().issue();
        let this = self.clone();
        tokio::spawn(async move { this.fetch_into(ticket).await })
    }

    async fn fetch_into(&self, ticket: PrefetchTicket) -> bool {
        debug!(ticket = ticket.value(), mode = %self.mode, "[Prefetch] Fetching next round");
        match self.api.fetch_round(self.mode).await {
            Ok(round) => {
                let kept = self.slot().fulfill(ticket, round);
                if !kept {
                    debug!(ticket = ticket.value(), "[Prefetch] Discarding stale response");
                }
                kept
            }
            Err(err) => {
                warn!(ticket = ticket.value(), error = %err, "[Prefetch] Prefetch failed");
                false
            }
        }
    }

    /// Takes the buffered round, if one is ready.
    pub fn take_ready(&self) -> Option<Round> {
        self.slot().take()
    }

    pub fn is_ready(&self) -> bool {
        self.slot().is_ready()
    }

    /// Returns the buffered round, or fetches one directly when the slot is
    /// empty. A direct fetch is returned, never cached.
    ///
    /// Refilling the slot afterwards is left to the caller (the round
    /// lifecycle asks for it whenever a round starts).
    pub async fn take_or_fetch(&self) -> Result<Round, ApiError> {
        if let Some(round) = self.take_ready() {
            debug!("[Prefetch] Using buffered round");
            return Ok(round);
        }
        self.api.fetch_round(self.mode).await
    }
}
