//! Load, flush and external-change detection for the loaded month.
//!
//! Cross-process consistency is last writer wins at blob granularity. A
//! session notices another writer by comparing the stored revision with the
//! one it last loaded or flushed; on a mismatch it reloads, dropping any
//! unflushed local edits, and then notifies subscribers.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{MonthReservationsRepository, MonthReservationsRepositoryError, Revision};
use super::{MonthKey, ReservationStore};

/// Notification that the loaded month was replaced from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalChange {
    /// Month that was reloaded.
    pub month: MonthKey,
    /// Revision now loaded; `None` when the blob was removed.
    pub revision: Option<Revision>,
    /// Whether unflushed local edits were dropped by the reload.
    pub discarded_unsaved: bool,
}

/// Callback run after an external change has been reloaded.
///
/// The store passed in already holds the reloaded data.
pub type ChangeListener = Box<dyn FnMut(&ExternalChange, &ReservationStore)>;

/// Mediates between the in-memory store and the month repository.
pub struct PersistenceSync<M> {
    repository: Arc<M>,
    known: Option<Revision>,
    listeners: Vec<ChangeListener>,
}

impl<M: MonthReservationsRepository> PersistenceSync<M> {
    /// Sync bound to `repository`, with nothing loaded yet.
    pub const fn new(repository: Arc<M>) -> Self {
        Self {
            repository,
            known: None,
            listeners: Vec::new(),
        }
    }

    /// Revision last loaded or flushed by this process.
    #[must_use]
    pub const fn known_revision(&self) -> Option<&Revision> {
        self.known.as_ref()
    }

    /// Load `month` into a fresh store and remember its revision.
    ///
    /// Absent or malformed blobs load as empty reservations.
    pub fn load(&mut self, month: MonthKey) -> ReservationStore {
        let stored = self.repository.load(month);
        info!(
            %month,
            days = stored.reservations.days().count(),
            revision = ?stored.revision,
            "month loaded"
        );
        self.known = stored.revision;
        ReservationStore::new(stored.reservations)
    }

    /// Write the store's month, replacing the stored blob.
    ///
    /// # Errors
    ///
    /// Propagates repository write failures; the known revision is left
    /// unchanged in that case.
    pub fn flush(
        &mut self,
        store: &ReservationStore,
    ) -> Result<Revision, MonthReservationsRepositoryError> {
        let revision = self.repository.flush(store.snapshot())?;
        info!(month = %store.month(), %revision, "month flushed");
        self.known = Some(revision.clone());
        Ok(revision)
    }

    /// Subscribe to external changes of whichever month is loaded.
    pub fn on_external_change(
        &mut self,
        listener: impl FnMut(&ExternalChange, &ReservationStore) + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    /// Whether the stored blob for `month` differs from the known one.
    #[must_use]
    pub fn detect_change(&self, month: MonthKey) -> bool {
        self.repository.current_revision(month) != self.known
    }

    /// Reload `store` if another writer replaced its month.
    ///
    /// `has_unsaved` reports whether local edits are pending; they are lost
    /// on reload. Listeners run after the store has been replaced.
    pub fn poll(
        &mut self,
        store: &mut ReservationStore,
        has_unsaved: bool,
    ) -> Option<ExternalChange> {
        let month = store.month();
        if !self.detect_change(month) {
            return None;
        }

        let stored = self.repository.load(month);
        store.replace(stored.reservations);
        self.known = stored.revision.clone();
        if has_unsaved {
            warn!(%month, "external change discarded unsaved reservations");
        } else {
            info!(%month, "external change reloaded");
        }

        let change = ExternalChange {
            month,
            revision: stored.revision,
            discarded_unsaved: has_unsaved,
        };
        self.notify(&change, store);
        Some(change)
    }

    fn notify(&mut self, change: &ExternalChange, store: &ReservationStore) {
        for listener in &mut self.listeners {
            listener(change, store);
        }
    }
}
