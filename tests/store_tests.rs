// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use expensebook::db;
use expensebook::error::StoreError;
use expensebook::models::{NewTransaction, PaymentType, TxKind};
use expensebook::store::{Change, Op, LedgerStore, Table};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::rc::Rc;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn lunch() -> NewTransaction {
    NewTransaction {
        amount: Decimal::new(1250, 2),
        kind: TxKind::Expense,
        category: Some("Food".into()),
        description: Some("Lunch".into()),
        date: NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(12, 15, 0)
            .unwrap(),
        group_id: None,
        payment_type: Some(PaymentType::Cash),
    }
}

#[test]
fn seeding_is_idempotent() {
    let conn = setup();
    db::seed_defaults(&conn).unwrap();
    db::seed_defaults(&conn).unwrap();
    let store = LedgerStore::new(&conn);
    let accounts = store.accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, db::DEFAULT_GROUP);
    let cats = store.categories().unwrap();
    assert!(cats.iter().any(|c| c.name == "Food" && c.kind == TxKind::Expense));
    assert!(cats.iter().any(|c| c.name == "Salary" && c.kind == TxKind::Income));
}

#[test]
fn transaction_crud_round_trips_fields() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let tx = store.add_transaction(lunch()).unwrap();
    let loaded = store.transaction(tx.id).unwrap().unwrap();
    assert_eq!(loaded, tx);

    let mut edited = loaded.clone();
    edited.amount = Decimal::new(900, 2);
    edited.payment_type = Some(PaymentType::ECash);
    store.update_transaction(&edited).unwrap();
    assert_eq!(store.transaction(tx.id).unwrap().unwrap(), edited);

    store.delete_transaction(tx.id).unwrap();
    assert!(store.transaction(tx.id).unwrap().is_none());
    assert!(matches!(
        store.delete_transaction(tx.id),
        Err(StoreError::NotFound { what: "transaction", .. })
    ));
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    store
        .add_category("Food", TxKind::Expense, "#FF6384", "fast-food")
        .unwrap();
    let tx = store.add_transaction(lunch()).unwrap();

    match store.delete_category("Food") {
        Err(StoreError::CategoryInUse { name, count }) => {
            assert_eq!(name, "Food");
            assert_eq!(count, 1);
        }
        other => panic!("expected CategoryInUse, got {:?}", other),
    }
    assert!(store.category_by_name("Food").unwrap().is_some());

    store.delete_transaction(tx.id).unwrap();
    store.delete_category("Food").unwrap();
    assert!(store.category_by_name("Food").unwrap().is_none());
}

#[test]
fn duplicate_names_are_reported() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    store.add_account("Trip", "airplane").unwrap();
    assert!(matches!(
        store.add_account("Trip", "car"),
        Err(StoreError::Duplicate { what: "group", .. })
    ));
    store.add_category("Gym", TxKind::Expense, "#000000", "bike").unwrap();
    assert!(matches!(
        store.add_category("Gym", TxKind::Income, "#000000", "bike"),
        Err(StoreError::Duplicate { what: "category", .. })
    ));
}

#[test]
fn deleting_a_group_keeps_its_transactions() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let trip = store.add_account("Trip", "airplane").unwrap();
    let mut t = lunch();
    t.group_id = Some(trip);
    let tx = store.add_transaction(t).unwrap();
    store.delete_account(trip).unwrap();
    assert_eq!(store.transaction(tx.id).unwrap().unwrap().group_id, Some(trip));
    assert!(store.accounts().unwrap().is_empty());
}

#[test]
fn observers_see_every_write_until_unsubscribed() {
    let conn = setup();
    let mut store = LedgerStore::new(&conn);
    let seen: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = store.subscribe(move |c| sink.borrow_mut().push(*c));

    let tx = store.add_transaction(lunch()).unwrap();
    let gid = store.add_account("Home", "home").unwrap();
    store.delete_transaction(tx.id).unwrap();
    assert!(store.unsubscribe(sub));
    assert!(!store.unsubscribe(sub));
    store.add_transaction(lunch()).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            Change { table: Table::Expenses, op: Op::Insert, id: tx.id },
            Change { table: Table::Accounts, op: Op::Insert, id: gid },
            Change { table: Table::Expenses, op: Op::Delete, id: tx.id },
        ]
    );
}

#[test]
fn failed_write_does_not_notify() {
    let conn = setup();
    let mut store = LedgerStore::new(&conn);
    store.add_account("Trip", "airplane").unwrap();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    store.subscribe(move |_| *sink.borrow_mut() += 1);
    assert!(store.add_account("Trip", "airplane").is_err());
    assert!(store.delete_account(9999).is_err());
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn corrupt_row_fails_the_whole_snapshot() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    store.add_transaction(lunch()).unwrap();
    conn.execute(
        "INSERT INTO expenses(amount, kind, date) VALUES (?1, 'expense', ?2)",
        params!["twelve", "2025-03-05T10:00:00.000"],
    )
    .unwrap();
    match store.snapshot() {
        Err(StoreError::Retrieval(msg)) => assert!(msg.contains("twelve")),
        other => panic!("expected Retrieval error, got {:?}", other),
    }
}

#[test]
fn unknown_kind_survives_storage() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let mut t = lunch();
    t.kind = TxKind::from("transfer");
    store.add_transaction(t).unwrap();
    let snap = store.snapshot().unwrap();
    assert_eq!(snap[0].kind, TxKind::Other("transfer".into()));
    assert_eq!(snap[0].signed_amount(), Decimal::ZERO);
}

#[test]
fn snapshot_between_is_inclusive_and_ordered() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    for (d, h) in [(5, 9), (1, 0), (3, 12), (7, 8)] {
        let mut t = lunch();
        t.date = NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        store.add_transaction(t).unwrap();
    }
    let from = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 3, 5)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let days: Vec<u32> = store
        .snapshot_between(from, to)
        .unwrap()
        .iter()
        .map(|t| chrono::Datelike::day(&t.date))
        .collect();
    assert_eq!(days, vec![1, 3, 5]);
}

#[test]
fn renaming_a_category_relabels_its_transactions() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let id = store
        .add_category("Food", TxKind::Expense, "#FF6384", "fast-food")
        .unwrap();
    store.add_category("Rent", TxKind::Expense, "#000000", "home").unwrap();
    let tx = store.add_transaction(lunch()).unwrap();

    let mut cat = store.category_by_name("Food").unwrap().unwrap();
    cat.name = "Groceries".into();
    cat.color = "#00FF00".into();
    store.update_category(&cat).unwrap();
    assert_eq!(
        store.transaction(tx.id).unwrap().unwrap().category.as_deref(),
        Some("Groceries")
    );
    assert_eq!(store.category_by_name("Groceries").unwrap().unwrap().id, id);

    cat.name = "Rent".into();
    assert!(matches!(
        store.update_category(&cat),
        Err(StoreError::Duplicate { what: "category", .. })
    ));
    assert_eq!(
        store.transaction(tx.id).unwrap().unwrap().category.as_deref(),
        Some("Groceries")
    );
}

#[test]
fn renaming_a_group_keeps_its_id() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let id = store.add_account("Trip", "airplane").unwrap();
    store.rename_account(id, "Japan 2025").unwrap();
    assert_eq!(store.account_by_name("Japan 2025").unwrap().unwrap().id, id);
    assert!(store.account_by_name("Trip").unwrap().is_none());
    assert!(matches!(
        store.rename_account(id + 100, "Nope"),
        Err(StoreError::NotFound { what: "group", .. })
    ));
}

#[test]
fn group_snapshot_only_returns_that_group() {
    let conn = setup();
    let store = LedgerStore::new(&conn);
    let home = store.add_account("Home", "home").unwrap();
    let mut t = lunch();
    t.group_id = Some(home);
    store.add_transaction(t).unwrap();
    store.add_transaction(lunch()).unwrap();
    let rows = store.snapshot_for_group(home).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].group_id, Some(home));
}
