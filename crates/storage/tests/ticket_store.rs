#![forbid(unsafe_code)]

use chrono::{TimeDelta, Utc};
use pt_core::ids::TicketId;
use pt_core::span::TimeAmount;
use pt_core::{Location, Message, MessageReason, TicketStatus};
use pt_storage::{SqliteStore, StoreError};
use std::collections::{BTreeSet, HashMap};
use tempfile::TempDir;
use uuid::Uuid;

fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn here() -> Location {
    Location::new("world;10;64;-20;0;0")
}

#[test]
fn inserted_ticket_reads_back_field_for_field() {
    let (_dir, store) = open_store();
    let owner = Uuid::new_v4();
    let picker = Uuid::new_v4();

    let id = store
        .tickets()
        .insert(owner, TicketStatus::Picked, Some(picker), &here())
        .expect("insert ticket");
    let ticket = store.tickets().select(id).expect("select ticket");

    assert_eq!(ticket.id, id);
    assert_eq!(ticket.owner, owner);
    assert_eq!(ticket.status, TicketStatus::Picked);
    assert_eq!(ticket.picker, Some(picker));
    assert_eq!(ticket.location, here());
}

#[test]
fn missing_ticket_is_a_distinct_error() {
    let (_dir, store) = open_store();
    let err = store
        .tickets()
        .select(TicketId::new(42))
        .expect_err("no ticket 42");
    assert!(matches!(err, StoreError::UnknownTicket(id) if id == TicketId::new(42)));
    assert!(err.is_not_found());
    assert!(!store.tickets().exists(TicketId::new(42)).expect("exists"));
}

#[test]
fn sequential_inserts_allocate_increasing_ids() {
    let (_dir, store) = open_store();
    let owner = Uuid::new_v4();

    let ids: Vec<TicketId> = (0..25)
        .map(|_| {
            store
                .tickets()
                .insert(owner, TicketStatus::Open, None, &here())
                .expect("insert ticket")
        })
        .collect();

    assert_eq!(ids.first(), Some(&TicketId::new(1)));
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(store.tickets().count(None).expect("count"), 25);
}

#[test]
fn exhausted_id_space_is_an_error_not_a_panic() {
    let (_dir, store) = open_store();

    let raw = rusqlite::Connection::open(store.db_path()).expect("raw connection");
    raw.execute(
        "INSERT INTO ticket(id, uuid, status, picker, location) \
         VALUES (9223372036854775807, ?1, 'OPEN', NULL, 'world;0;0;0')",
        rusqlite::params![Uuid::new_v4().to_string()],
    )
    .expect("seed highest id");
    drop(raw);

    let err = store
        .tickets()
        .insert(Uuid::new_v4(), TicketStatus::Open, None, &here())
        .expect_err("no id left to allocate");
    assert_eq!(err.code(), "INVALID_INPUT");
    assert_eq!(store.tickets().count(None).expect("count"), 1);
}

#[test]
fn concurrent_inserts_never_share_an_id() {
    let (_dir, store) = open_store();

    let ids: Vec<TicketId> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = &store;
                scope.spawn(move || {
                    let owner = Uuid::new_v4();
                    (0..20)
                        .map(|_| {
                            store
                                .tickets()
                                .insert(owner, TicketStatus::Open, None, &here())
                                .expect("insert ticket")
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().expect("worker thread"))
            .collect()
    });

    let distinct: BTreeSet<_> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), 80);
    assert_eq!(distinct.last(), Some(&TicketId::new(80)));
}

#[test]
fn blank_location_is_rejected() {
    let (_dir, store) = open_store();
    let err = store
        .tickets()
        .insert(Uuid::new_v4(), TicketStatus::Open, None, &Location::new("  "))
        .expect_err("blank location");
    assert_eq!(err.code(), "INVALID_INPUT");
    assert_eq!(store.tickets().count(None).expect("count"), 0);
}

#[test]
fn owner_and_status_filters() {
    let (_dir, store) = open_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let tickets = store.tickets();

    let a1 = tickets.insert(alice, TicketStatus::Open, None, &here()).expect("a1");
    let b1 = tickets.insert(bob, TicketStatus::Open, None, &here()).expect("b1");
    let a2 = tickets.insert(alice, TicketStatus::Closed, None, &here()).expect("a2");
    let a3 = tickets.insert(alice, TicketStatus::Picked, Some(bob), &here()).expect("a3");

    let all_ids: Vec<_> = tickets.select_all(None).expect("all").iter().map(|t| t.id).collect();
    assert_eq!(all_ids, vec![a1, b1, a2, a3]);

    let open_ids: Vec<_> = tickets
        .select_all(Some(TicketStatus::Open))
        .expect("open")
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(open_ids, vec![a1, b1]);

    let alice_tickets = tickets.select_all_for(alice, None).expect("alice");
    assert_eq!(alice_tickets.len(), 3);
    assert!(alice_tickets.iter().all(|t| t.owner == alice));

    assert_eq!(tickets.select_ids(alice, Some(TicketStatus::Closed)).expect("ids"), vec![a2]);
    assert_eq!(tickets.select_ids(bob, None).expect("ids"), vec![b1]);

    assert_eq!(tickets.count(Some(TicketStatus::Open)).expect("count"), 2);
    assert_eq!(tickets.count_for(alice, TicketStatus::Open).expect("count"), 1);
    assert_eq!(tickets.count_for(bob, TicketStatus::Closed).expect("count"), 0);

    let batch = tickets.select_many(&[a1, TicketId::new(99), a3]).expect("many");
    assert_eq!(batch.keys().copied().collect::<Vec<_>>(), vec![a1, a3]);
}

#[test]
fn highest_id_matches_any_listed_status_for_the_owner_only() {
    let (_dir, store) = open_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let tickets = store.tickets();

    let open = tickets.insert(alice, TicketStatus::Open, None, &here()).expect("open");
    let picked = tickets.insert(alice, TicketStatus::Picked, Some(bob), &here()).expect("picked");
    let closed = tickets.insert(alice, TicketStatus::Closed, None, &here()).expect("closed");
    // Bob's newer open ticket must not leak into Alice's result.
    tickets.insert(bob, TicketStatus::Open, None, &here()).expect("bob");

    assert_eq!(
        tickets
            .select_highest_id(alice, &[TicketStatus::Open, TicketStatus::Picked])
            .expect("highest"),
        Some(picked)
    );
    assert_eq!(
        tickets.select_highest_id(alice, &[TicketStatus::Open]).expect("highest"),
        Some(open)
    );
    assert_eq!(tickets.select_highest_id(alice, &[]).expect("highest"), Some(closed));
    assert_eq!(
        tickets
            .select_highest_id(Uuid::new_v4(), &[TicketStatus::Open])
            .expect("highest"),
        None
    );

    let last = tickets
        .select_last(alice, &[TicketStatus::Picked])
        .expect("last")
        .expect("alice has a picked ticket");
    assert_eq!(last.id, picked);
    assert_eq!(last.picker, Some(bob));
    assert!(tickets.select_last(bob, &[TicketStatus::Closed]).expect("last").is_none());
}

#[test]
fn names_skip_owners_the_directory_cannot_resolve() {
    let (_dir, store) = open_store();
    let known = Uuid::new_v4();
    let unknown = Uuid::new_v4();
    let tickets = store.tickets();

    tickets.insert(known, TicketStatus::Open, None, &here()).expect("known 1");
    tickets.insert(known, TicketStatus::Closed, None, &here()).expect("known 2");
    tickets.insert(unknown, TicketStatus::Open, None, &here()).expect("unknown");

    let directory = HashMap::from([(known, "Alex".to_string())]);
    let lookup = |uuid: Uuid| directory.get(&uuid).cloned();

    assert_eq!(tickets.select_names(None, &lookup).expect("names"), vec!["Alex".to_string()]);
    assert_eq!(
        tickets
            .select_names(Some(TicketStatus::Closed), &lookup)
            .expect("names"),
        vec!["Alex".to_string()]
    );
    assert!(
        tickets
            .select_names(Some(TicketStatus::Picked), &lookup)
            .expect("names")
            .is_empty()
    );
}

#[test]
fn stats_cover_every_status() {
    let (_dir, store) = open_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let tickets = store.tickets();

    let empty = tickets.select_ticket_stats(None).expect("empty stats");
    assert_eq!(empty.values().sum::<i64>(), 0);
    assert_eq!(empty.len(), 3);

    for _ in 0..3 {
        tickets.insert(alice, TicketStatus::Open, None, &here()).expect("open");
    }
    for _ in 0..2 {
        tickets.insert(bob, TicketStatus::Picked, Some(alice), &here()).expect("picked");
    }
    tickets.insert(alice, TicketStatus::Closed, Some(bob), &here()).expect("closed");

    let stats = tickets.select_ticket_stats(None).expect("stats");
    assert_eq!(stats[&TicketStatus::Open], 3);
    assert_eq!(stats[&TicketStatus::Picked], 2);
    assert_eq!(stats[&TicketStatus::Closed], 1);
    assert_eq!(stats.values().sum::<i64>(), tickets.count(None).expect("count"));

    let alice_stats = tickets.select_ticket_stats(Some(alice)).expect("alice stats");
    assert_eq!(alice_stats[&TicketStatus::Open], 3);
    assert_eq!(alice_stats[&TicketStatus::Picked], 0);
    assert_eq!(alice_stats[&TicketStatus::Closed], 1);
}

#[test]
fn highscores_count_closed_tickets_with_activity() {
    let (_dir, store) = open_store();
    let owner = Uuid::new_v4();
    let active = Uuid::new_v4();
    let silent = Uuid::new_v4();
    let veteran = Uuid::new_v4();
    let tickets = store.tickets();
    let now = Utc::now();

    let with_message = tickets
        .insert(owner, TicketStatus::Closed, Some(active), &here())
        .expect("t1");
    store
        .messages()
        .insert(with_message, &Message::status_change(MessageReason::Closed, active, now))
        .expect("message");

    tickets.insert(owner, TicketStatus::Closed, Some(silent), &here()).expect("t2");

    let old = tickets.insert(owner, TicketStatus::Closed, Some(veteran), &here()).expect("t3");
    store
        .messages()
        .insert(old, &Message::text(owner, "help", now - TimeDelta::days(10)))
        .expect("old message");

    // Open tickets never count, even with fresh messages.
    let open = tickets.insert(owner, TicketStatus::Picked, Some(active), &here()).expect("t4");
    store
        .messages()
        .insert(open, &Message::text(owner, "still waiting", now))
        .expect("message");

    let forever = tickets.highscores(TimeAmount::Forever).expect("forever");
    assert_eq!(forever.get(&active), Some(&1));
    assert_eq!(forever.get(&veteran), Some(&1));
    assert!(!forever.contains_key(&silent));

    let week = tickets.highscores(TimeAmount::Week).expect("week");
    assert_eq!(week.len(), 1);
    assert_eq!(week.get(&active), Some(&1));

    let year = tickets.highscores(TimeAmount::Year).expect("year");
    assert_eq!(year.len(), 2);
}

#[test]
fn background_update_is_visible_after_flush() {
    let (_dir, store) = open_store();
    let owner = Uuid::new_v4();
    let staff = Uuid::new_v4();

    let id = store
        .tickets()
        .insert(owner, TicketStatus::Open, None, &here())
        .expect("insert");
    let mut ticket = store.tickets().select(id).expect("select");

    ticket.pick(staff);
    store.tickets().update(&ticket);
    store.flush_updates().expect("flush");

    let stored = store.tickets().select(id).expect("select");
    assert_eq!(stored.status, TicketStatus::Picked);
    assert_eq!(stored.picker, Some(staff));
    assert_eq!(stored.owner, owner);
    assert_eq!(stored.location, here());

    ticket.yield_pick();
    store.tickets().update(&ticket);
    store.flush_updates().expect("flush");
    assert_eq!(store.tickets().select(id).expect("select").picker, None);
}

#[test]
fn queued_updates_land_before_the_store_closes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let id = {
        let store = SqliteStore::open(dir.path()).expect("open store");
        let id = store
            .tickets()
            .insert(Uuid::new_v4(), TicketStatus::Open, None, &here())
            .expect("insert");
        let mut ticket = store.tickets().select(id).expect("select");
        ticket.close(Uuid::new_v4());
        store.tickets().update(&ticket);
        id
    };

    let store = SqliteStore::open(dir.path()).expect("reopen store");
    assert_eq!(store.tickets().select(id).expect("select").status, TicketStatus::Closed);
}
