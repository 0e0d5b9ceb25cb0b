mod common;

use chrono::NaiveDate;
use std::fs;

use common::names;
use follower_ledger::snapshot::FollowerSnapshot;
use follower_ledger::store::diff::{compare_days, compute_delta, DiffError};
use follower_ledger::store::{SnapshotStore, StoreStatus};
use tempfile::TempDir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

#[test]
fn scenario_a_new_and_dropped_against_yesterday() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    store.record("me", &names(&["alice", "bob", "carol"]), day(1)).unwrap();
    store.record("me", &names(&["alice", "carol", "dave"]), day(2)).unwrap();

    let today = store.load_previous("me", day(2)).unwrap().unwrap();
    assert_eq!(today.new_followers, names(&["dave"]));
    assert_eq!(today.dropped_followers, names(&["bob"]));
    assert_eq!(today.total_followers, 3);
    assert_eq!(today.total_new_followers, 1);
    assert_eq!(today.total_dropped_followers, 1);
}

#[test]
fn scenario_b_first_run_creates_day_file() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path().join("data"));

    let response = store.record("me", &names(&["alice"]), day(2)).unwrap();
    assert_eq!(response.status, StoreStatus::Ok);
    assert_eq!(response.data_file, tmp.path().join("data").join("followers_20240602.json"));
    assert!(response.data_file.is_file());

    let snapshot = store.load_previous("me", day(2)).unwrap().unwrap();
    assert!(snapshot.new_followers.is_empty());
    assert!(snapshot.dropped_followers.is_empty());
    assert_eq!(snapshot.total_followers, 1);
}

#[test]
fn scenario_c_existing_day_file_wins() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    let first = store
        .record("me", &names(&["a", "b", "c", "d", "e"]), day(2))
        .unwrap();
    let before = fs::read(&first.data_file).unwrap();

    let second = store.record("me", &names(&["a", "b"]), day(2)).unwrap();

    assert_eq!(second.data_file, first.data_file);
    assert_eq!(fs::read(&second.data_file).unwrap(), before);
    assert_eq!(store.load_previous("me", day(2)).unwrap().unwrap().total_followers, 5);
}

#[test]
fn first_account_of_the_day_owns_the_file() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    let first = store.record("me", &names(&["alice", "bob"]), day(2)).unwrap();
    let before = fs::read(&first.data_file).unwrap();

    let second = store.record("other", &names(&["zed"]), day(2)).unwrap();

    assert_eq!(second.status, StoreStatus::Ok);
    assert_eq!(second.data_file, first.data_file);
    assert_eq!(fs::read(&second.data_file).unwrap(), before);
    assert!(store.load_previous("other", day(2)).unwrap().is_none());
    assert_eq!(store.load_previous("me", day(2)).unwrap().unwrap().total_followers, 2);
}

#[test]
fn scenario_d_other_account_in_yesterday_is_absent() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    store.record("someone-else", &names(&["zed"]), day(1)).unwrap();
    assert!(store.load_previous("me", day(1)).unwrap().is_none());

    store.record("me", &names(&["alice", "bob"]), day(2)).unwrap();
    let snapshot = store.load_previous("me", day(2)).unwrap().unwrap();
    assert!(!snapshot.has_changes());
    assert_eq!(snapshot.total_followers, 2);
}

#[test]
fn persisted_snapshot_loads_back_field_for_field() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    let today = names(&["carol", "alice", "erin"]);
    let yesterday = names(&["alice", "bob"]);
    let snapshot = FollowerSnapshot::new(&today, compute_delta(&today, Some(yesterday.as_slice())));

    store.persist("me", &snapshot, day(3)).unwrap();
    assert_eq!(store.load_previous("me", day(3)).unwrap(), Some(snapshot));
}

#[test]
fn unchanged_followers_in_any_order_give_empty_delta() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    store.record("me", &names(&["alice", "bob", "carol"]), day(1)).unwrap();
    store.record("me", &names(&["carol", "bob", "alice", "bob"]), day(2)).unwrap();

    let snapshot = store.load_previous("me", day(2)).unwrap().unwrap();
    assert!(!snapshot.has_changes());
    assert_eq!(snapshot.followers, names(&["alice", "bob", "carol"]));
    assert_eq!(snapshot.total_followers, 3);
}

#[test]
fn month_boundary_compares_with_previous_month() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    let may_31 = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

    store.record("me", &names(&["alice"]), may_31).unwrap();
    store.record("me", &names(&["bob"]), day(1)).unwrap();

    let snapshot = store.load_previous("me", day(1)).unwrap().unwrap();
    assert_eq!(snapshot.new_followers, names(&["bob"]));
    assert_eq!(snapshot.dropped_followers, names(&["alice"]));
}

#[test]
fn corrupt_yesterday_surfaces_instead_of_resetting() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    fs::write(store.snapshot_path(day(1)), "{\"me\": 42}").unwrap();

    let err = store.record("me", &names(&["alice"]), day(2)).unwrap_err();
    assert!(err.is_corrupt());
    assert!(!store.snapshot_path(day(2)).exists());
}

#[test]
fn day_file_is_keyed_by_account() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    store.record("me", &names(&["alice"]), day(2)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.snapshot_path(day(2))).unwrap()).unwrap();
    assert_eq!(raw["me"]["followers"], serde_json::json!(["alice"]));
    assert_eq!(raw["me"]["total_followers"], 1);
    assert_eq!(raw["me"]["total_new_followers"], 0);
}

#[test]
fn compare_days_spans_gaps() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());

    store.record("me", &names(&["alice", "bob"]), day(1)).unwrap();
    store.record("me", &names(&["alice", "carol", "dave"]), day(5)).unwrap();

    let diff = compare_days(&store, "me", day(1), day(5)).unwrap();
    assert_eq!(diff.gained, names(&["carol", "dave"]));
    assert_eq!(diff.lost, names(&["bob"]));
    assert_eq!(diff.net_change, 1);
}

#[test]
fn compare_days_missing_day_is_reported() {
    let tmp = TempDir::new().unwrap();
    let store = SnapshotStore::new(tmp.path());
    store.record("me", &names(&["alice"]), day(1)).unwrap();

    let err = compare_days(&store, "me", day(1), day(2)).unwrap_err();
    assert!(matches!(err, DiffError::MissingDay { .. }));
}
