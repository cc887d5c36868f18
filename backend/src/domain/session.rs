//! One month's reservation engine, as driven by a presentation layer.
//!
//! A session is constructed when a month is opened and owns everything the
//! engine needs for it: the identity registry, the in-memory store, the sync
//! adapter and the selection controller. There is no ambient state;
//! switching month replaces the store inside the session.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use super::ports::{
    MonthReservationsRepository, MonthReservationsRepositoryError, NamesRepository,
    PublishReceipt, ReservationPublisher, ReservationPublisherError, Revision,
};
use super::{
    Choice, DayCounts, DayRosters, ExternalChange, IdentityError, IdentityRegistry, LunchSlot,
    MonthKey, Person, PersonId, PersistenceSync, ReservationError, ReservationStore,
    RosterCategory, RosterSheet, SelectionController, SlotSelection, VegetarianToggle,
};

/// Whether the store holds changes not yet flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Everything is flushed.
    Saved,
    /// Applied changes are pending a save.
    Unsaved,
}

/// What a calendar cell shows for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOverview {
    /// The weekday.
    pub date: NaiveDate,
    /// Counts for every category.
    pub counts: DayCounts,
    /// The actor's own choice; `None` without an actor.
    pub own: Option<Choice>,
    /// Whether the date can still change.
    pub editable: bool,
}

/// Errors raised by [`CanteenSession::publish`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The local save failed, so nothing was published.
    #[error(transparent)]
    Save(#[from] MonthReservationsRepositoryError),
    /// The local save succeeded but the remote write did not.
    #[error(transparent)]
    Remote(#[from] ReservationPublisherError),
}

/// Engine instance for one loaded month.
pub struct CanteenSession<M, N> {
    identity: IdentityRegistry<N>,
    sync: PersistenceSync<M>,
    store: ReservationStore,
    controller: SelectionController,
    actor: Option<PersonId>,
    dirty: bool,
}

impl<M, N> CanteenSession<M, N>
where
    M: MonthReservationsRepository,
    N: NamesRepository,
{
    /// Load `month` and pre-select the remembered actor.
    pub fn open(
        repository: Arc<M>,
        identity: IdentityRegistry<N>,
        controller: SelectionController,
        month: MonthKey,
    ) -> Self {
        let mut sync = PersistenceSync::new(repository);
        let store = sync.load(month);
        let actor = identity.last_selected().map(|person| person.id().clone());
        Self {
            identity,
            sync,
            store,
            controller,
            actor,
            dirty: false,
        }
    }

    /// Discard the loaded month and load `month` instead.
    ///
    /// Unsaved changes to the previous month are dropped.
    pub fn switch_month(&mut self, month: MonthKey) {
        if self.dirty {
            warn!(from = %self.store.month(), to = %month, "switching month with unsaved changes");
        }
        self.store = self.sync.load(month);
        self.dirty = false;
    }

    /// The loaded month.
    #[must_use]
    pub const fn month(&self) -> MonthKey {
        self.store.month()
    }

    /// The in-memory store.
    #[must_use]
    pub const fn store(&self) -> &ReservationStore {
        &self.store
    }

    /// The participant registry.
    #[must_use]
    pub const fn identity(&self) -> &IdentityRegistry<N> {
        &self.identity
    }

    /// The current actor, if one is selected.
    #[must_use]
    pub fn actor(&self) -> Option<&Person> {
        self.actor.as_ref().and_then(|id| self.identity.get(id))
    }

    /// Find or create `name` and make them the remembered actor.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] for blank names or when the registry cannot
    /// be persisted. Once the person is registered they stay the actor for
    /// this session even if remembering them for the next launch fails.
    pub fn select_actor(&mut self, name: &str) -> Result<Person, IdentityError> {
        let person = self.identity.find_or_create(name)?;
        self.actor = Some(person.id().clone());
        info!(id = %person.id(), "actor selected");
        self.identity.set_last_selected(person.id())?;
        Ok(person)
    }

    /// Flip the actor's vegetarian flag for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] for dates that are not weekdays of the
    /// loaded month.
    pub fn toggle_vegetarian(
        &mut self,
        date: NaiveDate,
    ) -> Result<VegetarianToggle, ReservationError> {
        let result =
            self.controller
                .toggle_vegetarian(&mut self.store, date, self.actor.as_ref())?;
        self.dirty |= result.outcome.is_applied();
        Ok(result)
    }

    /// Select or deselect `slot` for the actor on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] for dates that are not weekdays of the
    /// loaded month.
    pub fn select_slot(
        &mut self,
        date: NaiveDate,
        slot: LunchSlot,
    ) -> Result<SlotSelection, ReservationError> {
        let result =
            self.controller
                .select_slot(&mut self.store, date, self.actor.as_ref(), slot)?;
        self.dirty |= result.outcome.is_applied();
        Ok(result)
    }

    /// The actor's choice for `date`.
    #[must_use]
    pub fn own_choice(&self, date: NaiveDate) -> Option<Choice> {
        self.actor
            .as_ref()
            .map(|id| self.store.get_choice(date, id))
    }

    /// Flush the loaded month and mark it saved.
    ///
    /// # Errors
    ///
    /// Returns [`MonthReservationsRepositoryError`] when the write fails;
    /// the session stays unsaved.
    pub fn save(&mut self) -> Result<Revision, MonthReservationsRepositoryError> {
        let revision = self.sync.flush(&self.store)?;
        self.dirty = false;
        Ok(revision)
    }

    /// Whether applied changes await a save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// [`Self::is_dirty`] as a status value.
    #[must_use]
    pub const fn status(&self) -> SaveStatus {
        if self.dirty {
            SaveStatus::Unsaved
        } else {
            SaveStatus::Saved
        }
    }

    /// Reload if another writer replaced the loaded month.
    ///
    /// Unsaved local changes are lost on reload; the returned change says
    /// whether that happened.
    pub fn poll_external_changes(&mut self) -> Option<ExternalChange> {
        let change = self.sync.poll(&mut self.store, self.dirty)?;
        self.dirty = false;
        Some(change)
    }

    /// Subscribe to external changes of the loaded month.
    ///
    /// Listeners run after the reload, with the fresh store.
    pub fn on_external_change(
        &mut self,
        listener: impl FnMut(&ExternalChange, &ReservationStore) + 'static,
    ) {
        self.sync.on_external_change(listener);
    }

    /// Vegetarian, 11:45 and 12:30 rosters for `date`.
    #[must_use]
    pub fn day_rosters(&self, date: NaiveDate) -> DayRosters {
        DayRosters::collect(&self.store, date, &self.identity)
    }

    /// Print sheet for one category on `date`.
    #[must_use]
    pub fn roster_sheet(&self, date: NaiveDate, category: RosterCategory) -> RosterSheet {
        RosterSheet::collect(&self.store, date, category, &self.identity)
    }

    /// One entry per weekday of the loaded month.
    #[must_use]
    pub fn overview(&self) -> Vec<DayOverview> {
        self.month()
            .weekdays()
            .into_iter()
            .map(|date| DayOverview {
                date,
                counts: self.store.counts(date),
                own: self.own_choice(date),
                editable: self.controller.is_editable(date),
            })
            .collect()
    }

    /// Save locally, then push the month through `publisher`.
    ///
    /// The remote write never rolls back the local save.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Save`] when the local flush fails and
    /// [`PublishError::Remote`] when the publisher does.
    pub async fn publish(
        &mut self,
        publisher: &dyn ReservationPublisher,
    ) -> Result<PublishReceipt, PublishError> {
        self.save()?;
        let receipt = publisher.publish(self.store.snapshot()).await?;
        info!(month = %self.month(), location = %receipt.location, "month published");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::EditWindow;
    use crate::domain::ports::{
        FixtureNamesRepository, MockMonthReservationsRepository, MockNamesRepository,
        MockReservationPublisher, NamesRepositoryError, StoredMonth,
    };
    use crate::test_support::MutableClock;

    fn december() -> MonthKey {
        MonthKey::from_ym(2025, 12).expect("valid month")
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date")
    }

    fn controller() -> SelectionController {
        let clock = MutableClock::at("2025-12-01 12:00:00");
        SelectionController::new(EditWindow::default(), Arc::new(clock))
    }

    #[fixture]
    fn repo() -> MockMonthReservationsRepository {
        let mut repo = MockMonthReservationsRepository::new();
        repo.expect_load().returning(StoredMonth::absent);
        repo.expect_flush().returning(|_| Ok(Revision::new("r1")));
        repo
    }

    fn open(
        repo: MockMonthReservationsRepository,
    ) -> CanteenSession<MockMonthReservationsRepository, FixtureNamesRepository> {
        let identity = IdentityRegistry::load(Arc::new(FixtureNamesRepository), None, 20);
        CanteenSession::open(Arc::new(repo), identity, controller(), december())
    }

    #[rstest]
    fn applied_changes_mark_the_session_unsaved_until_saved(repo: MockMonthReservationsRepository) {
        let mut session = open(repo);
        session.select_actor("Alice").expect("actor selected");

        session
            .select_slot(tuesday(), LunchSlot::Slot1145)
            .expect("bookable");
        assert_eq!(session.status(), SaveStatus::Unsaved);

        session.save().expect("saved");
        assert_eq!(session.status(), SaveStatus::Saved);
    }

    #[rstest]
    fn actor_is_kept_when_remembering_them_fails(repo: MockMonthReservationsRepository) {
        let mut names = MockNamesRepository::new();
        names.expect_load_names().return_const(Vec::new());
        names.expect_load_last_selected().return_const(None);
        names.expect_save_names().times(1).returning(|_| Ok(()));
        names
            .expect_save_last_selected()
            .with(always())
            .returning(|_| Err(NamesRepositoryError::write("last-person-id", "read-only")));
        let identity = IdentityRegistry::load(Arc::new(names), None, 20);
        let mut session = CanteenSession::open(Arc::new(repo), identity, controller(), december());

        let result = session.select_actor("Alice");

        assert!(matches!(result, Err(IdentityError::Persistence(_))));
        let actor = session.actor().expect("actor kept for this session");
        assert_eq!(actor.name().as_ref(), "Alice");
        assert_eq!(session.identity().people().len(), 1);
        assert!(session.identity().last_selected().is_none());

        let booked = session
            .select_slot(tuesday(), LunchSlot::Slot1145)
            .expect("bookable");
        assert!(booked.outcome.is_applied());
    }

    #[rstest]
    fn rejected_changes_leave_the_session_clean(repo: MockMonthReservationsRepository) {
        let mut session = open(repo);

        let result = session.toggle_vegetarian(tuesday()).expect("bookable");

        assert!(!result.outcome.is_applied());
        assert!(!session.is_dirty());
    }

    #[rstest]
    fn overview_covers_every_weekday(repo: MockMonthReservationsRepository) {
        let mut session = open(repo);
        session.select_actor("Alice").expect("actor selected");
        session.toggle_vegetarian(tuesday()).expect("bookable");

        let overview = session.overview();

        assert_eq!(overview.len(), 23);
        let cell = overview
            .iter()
            .find(|cell| cell.date == tuesday())
            .expect("tuesday present");
        assert_eq!(cell.counts.vegetarian, 1);
        assert!(cell.own.is_some_and(|choice| choice.vegetarian));
        assert!(cell.editable);
        assert!(overview.first().is_some_and(|cell| !cell.editable));
    }

    #[rstest]
    #[tokio::test]
    async fn publish_saves_before_pushing(repo: MockMonthReservationsRepository) {
        let mut session = open(repo);
        session.select_actor("Alice").expect("actor selected");
        session
            .select_slot(tuesday(), LunchSlot::Slot1230)
            .expect("bookable");
        let mut publisher = MockReservationPublisher::new();
        publisher.expect_publish().times(1).returning(|reservations| {
            Ok(PublishReceipt {
                location: format!("data/reservations-{}.json", reservations.month()),
                version: None,
            })
        });

        let receipt = session.publish(&publisher).await.expect("published");

        assert_eq!(receipt.location, "data/reservations-2025-12.json");
        assert!(!session.is_dirty());
    }

    #[rstest]
    #[tokio::test]
    async fn remote_failure_keeps_the_local_save(repo: MockMonthReservationsRepository) {
        let mut session = open(repo);
        let mut publisher = MockReservationPublisher::new();
        publisher
            .expect_publish()
            .returning(|_| Err(ReservationPublisherError::not_configured("no token")));

        let result = session.publish(&publisher).await;

        assert!(matches!(result, Err(PublishError::Remote(_))));
        assert_eq!(session.status(), SaveStatus::Saved);
    }
}
