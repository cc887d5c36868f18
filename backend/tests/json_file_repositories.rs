//! Integration tests for the JSON file repositories.
//!
//! Each test opens separate `DataDir` handles over one temporary
//! directory, standing in for two processes sharing the data directory.

use std::sync::Arc;

use canteen::domain::ports::{MonthReservationsRepository, NamesRepository};
use canteen::domain::{
    CanteenSession, Choice, DEFAULT_SUGGESTION_LIMIT, EditWindow, IdentityRegistry, LunchSlot,
    MonthKey, MonthReservations, PersistenceSync, Person, PersonId, PersonName, RosterCategory,
    SelectionController,
};
use canteen::outbound::persistence::{
    JsonFileMonthRepository, JsonFileNamesRepository, LAST_PERSON_FILE, NAMES_FILE,
    month_file_name,
};
use canteen::test_support::{MutableClock, TempDataDir, cap_fs};
use chrono::NaiveDate;
use mockable::Clock;
use rstest::{fixture, rstest};

#[fixture]
fn data() -> TempDataDir {
    TempDataDir::new()
}

fn december() -> MonthKey {
    MonthKey::from_ym(2025, 12).expect("valid month")
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date")
}

fn person(id: &str, name: &str) -> Person {
    Person::new(
        PersonId::new(id).expect("valid id"),
        PersonName::new(name).expect("valid name"),
    )
}

fn booking(slot: LunchSlot) -> MonthReservations {
    let mut reservations = MonthReservations::new(december());
    reservations
        .insert(
            tuesday(),
            &PersonId::new("u-bob").expect("valid id"),
            Choice {
                vegetarian: false,
                slot,
            },
        )
        .expect("bookable");
    reservations
}

#[rstest]
fn absent_month_loads_empty_without_revision(data: TempDataDir) {
    let repository = JsonFileMonthRepository::new(data.open());

    let stored = repository.load(december());

    assert!(stored.reservations.is_empty());
    assert!(stored.revision.is_none());
    assert!(repository.current_revision(december()).is_none());
}

#[rstest]
fn flushed_month_is_visible_to_another_handle(data: TempDataDir) {
    let writer = JsonFileMonthRepository::new(data.open());
    let reader = JsonFileMonthRepository::new(data.open());

    let revision = writer.flush(&booking(LunchSlot::Slot1230)).expect("flushed");
    let stored = reader.load(december());

    assert_eq!(stored.reservations, booking(LunchSlot::Slot1230));
    assert_eq!(stored.revision.as_ref(), Some(&revision));
    assert_eq!(reader.current_revision(december()), Some(revision));
}

#[rstest]
fn blob_uses_the_month_file_name(data: TempDataDir) {
    JsonFileMonthRepository::new(data.open())
        .flush(&booking(LunchSlot::Slot1145))
        .expect("flushed");

    let raw = cap_fs::read_file_to_string(data.root(), &month_file_name(december()))
        .expect("blob on disk");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");

    assert_eq!(month_file_name(december()), "reservations-2025-12.json");
    assert_eq!(
        value,
        serde_json::json!({
            "2025-12-02": { "u-bob": { "vegetarian": false, "slot": "Slot1145" } }
        })
    );
}

#[rstest]
fn corrupt_blob_loads_empty_but_keeps_a_revision(data: TempDataDir) {
    cap_fs::write_file(data.root(), &month_file_name(december()), "{not json")
        .expect("blob written");

    let stored = JsonFileMonthRepository::new(data.open()).load(december());

    assert!(stored.reservations.is_empty());
    assert!(stored.revision.is_some());
}

#[rstest]
fn sync_detects_writes_from_another_handle(data: TempDataDir) {
    let ours = Arc::new(JsonFileMonthRepository::new(data.open()));
    let theirs = JsonFileMonthRepository::new(data.open());
    let mut sync = PersistenceSync::new(ours);
    let mut store = sync.load(december());

    assert!(!sync.detect_change(december()));
    theirs.flush(&booking(LunchSlot::Slot1230)).expect("flushed");
    assert!(sync.detect_change(december()));

    let change = sync.poll(&mut store, false).expect("change reported");
    assert_eq!(change.month, december());
    assert_eq!(store.count_for(tuesday(), RosterCategory::Slot1230), 1);
    assert!(!sync.detect_change(december()));
}

#[rstest]
fn own_flush_is_not_an_external_change(data: TempDataDir) {
    let mut sync = PersistenceSync::new(Arc::new(JsonFileMonthRepository::new(data.open())));
    let mut store = sync.load(december());
    store
        .set_slot(tuesday(), &PersonId::new("u-alice").expect("valid id"), LunchSlot::Slot1145)
        .expect("bookable");

    sync.flush(&store).expect("flushed");

    assert!(sync.poll(&mut store, false).is_none());
}

#[rstest]
fn names_and_last_selected_survive_reopening(data: TempDataDir) {
    let first = JsonFileNamesRepository::new(data.open());
    first
        .save_names(&[person("u-2", "Martin Paul"), person("u-1", "Alice")])
        .expect("names saved");
    first
        .save_last_selected(&PersonId::new("u-1").expect("valid id"))
        .expect("last selected saved");

    let second = JsonFileNamesRepository::new(data.open());
    let names: Vec<String> = second
        .load_names()
        .iter()
        .map(|known| known.name().to_string())
        .collect();

    assert_eq!(names, ["Martin Paul", "Alice"]);
    assert_eq!(
        second.load_last_selected(),
        Some(PersonId::new("u-1").expect("valid id"))
    );
    assert_eq!(
        cap_fs::read_file_to_string(data.root(), LAST_PERSON_FILE).expect("file on disk"),
        "u-1"
    );
}

#[rstest]
#[case("{}")]
#[case("not json")]
fn malformed_names_file_loads_empty(data: TempDataDir, #[case] raw: &str) {
    cap_fs::write_file(data.root(), NAMES_FILE, raw).expect("names written");
    assert!(JsonFileNamesRepository::new(data.open()).load_names().is_empty());
}

#[rstest]
fn remembered_actor_is_preselected_on_next_launch(data: TempDataDir) {
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::at("2025-12-01 09:00:00"));
    let open = |dir: &TempDataDir| {
        let identity = IdentityRegistry::load(
            Arc::new(JsonFileNamesRepository::new(dir.open())),
            None,
            DEFAULT_SUGGESTION_LIMIT,
        );
        CanteenSession::open(
            Arc::new(JsonFileMonthRepository::new(dir.open())),
            identity,
            SelectionController::new(EditWindow::default(), Arc::clone(&clock)),
            december(),
        )
    };

    let mut launch = open(&data);
    let alice = launch.select_actor("Alice").expect("actor selected");
    launch
        .select_slot(tuesday(), LunchSlot::Slot1145)
        .expect("bookable");
    launch.save().expect("saved");
    drop(launch);

    let relaunch = open(&data);

    assert_eq!(relaunch.actor().map(Person::id), Some(alice.id()));
    assert_eq!(
        relaunch.own_choice(tuesday()).map(|own| own.slot),
        Some(LunchSlot::Slot1145)
    );
}
