//! Preview store: one PDF slot per draft session, guarded by generation tickets.
//!
//! A slot is opened when its draft is created and released when the draft is deleted; no
//! other path creates one. Every render request takes a ticket before it starts. Only the
//! newest ticket for a draft may complete into the slot; anything older is rejected and its
//! blob dropped. Replacing or tearing down a slot releases the previous blob.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Process-wide generation counter. Monotonic across all drafts.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("Preview generation {generation} was superseded by a newer request")]
    Superseded { generation: u64 },

    #[error("Draft {draft_id} has no preview slot")]
    Closed { draft_id: Uuid },
}

/// Claim on a draft's preview slot, taken before rendering starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket {
    pub draft_id: Uuid,
    pub generation: u64,
}

/// A completed preview blob.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    pub generation: u64,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
struct Slot {
    latest: u64,
    current: Option<PreviewHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty slot for a newly created draft.
    pub fn open(&self, draft_id: Uuid) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(draft_id).or_default();
    }

    /// Issues a ticket that supersedes every earlier ticket for `draft_id`.
    ///
    /// Fails once the slot has been released, so a late request cannot resurrect it.
    pub fn begin(&self, draft_id: Uuid) -> Result<PreviewTicket, PreviewError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots
            .get_mut(&draft_id)
            .ok_or(PreviewError::Closed { draft_id })?;
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        slot.latest = generation;
        Ok(PreviewTicket {
            draft_id,
            generation,
        })
    }

    /// Stores `bytes` if `ticket` is still the newest for its draft.
    pub fn complete(
        &self,
        ticket: PreviewTicket,
        bytes: Bytes,
    ) -> Result<PreviewHandle, PreviewError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = slots
            .get_mut(&ticket.draft_id)
            .filter(|slot| slot.latest == ticket.generation)
        else {
            debug!(
                draft_id = %ticket.draft_id,
                generation = ticket.generation,
                "Stale preview dropped"
            );
            return Err(PreviewError::Superseded {
                generation: ticket.generation,
            });
        };

        let handle = PreviewHandle {
            generation: ticket.generation,
            bytes,
        };
        if let Some(previous) = slot.current.replace(handle.clone()) {
            debug!(
                draft_id = %ticket.draft_id,
                generation = previous.generation,
                "Previous preview released"
            );
        }
        Ok(handle)
    }

    pub fn latest(&self, draft_id: Uuid) -> Option<PreviewHandle> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(&draft_id).and_then(|slot| slot.current.clone())
    }

    /// Tears down the slot. In-flight tickets for the draft become stale.
    pub fn release(&self, draft_id: Uuid) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.remove(&draft_id) {
            Some(slot) => {
                debug!(
                    draft_id = %draft_id,
                    had_preview = slot.current.is_some(),
                    "Preview slot released"
                );
                true
            }
            None => false,
        }
    }
}
