// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: CRUD over categories, groups and transactions, plus the
//! snapshot reads that feed the aggregation engine.
//!
//! Every successful write is announced to registered observers so callers can
//! schedule a recomputation (see [`crate::watch`]).

use crate::error::{StoreError, StoreResult};
use crate::models::{Account, Category, NewTransaction, PaymentType, Transaction, TxKind};
use crate::utils::{TIMESTAMP_FMT, format_timestamp};
use chrono::NaiveDateTime;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Categories,
    Accounts,
    Expenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub table: Table,
    pub op: Op,
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&Change)>;

const TX_COLUMNS: &str =
    "id, amount, kind, category, description, date, group_id, payment_type";

pub struct LedgerStore<'c> {
    conn: &'c Connection,
    observers: Vec<(SubscriptionId, Observer)>,
    next_sub: u64,
}

impl<'c> LedgerStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            observers: Vec::new(),
            next_sub: 0,
        }
    }

    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: Fn(&Change) + 'static,
    {
        let id = SubscriptionId(self.next_sub);
        self.next_sub += 1;
        self.observers.push((id, Box::new(f)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&self, table: Table, op: Op, id: i64) {
        let change = Change { table, op, id };
        tracing::debug!(?change, observers = self.observers.len(), "ledger changed");
        for (_, f) in &self.observers {
            f(&change);
        }
    }

    // ---- categories ----

    pub fn add_category(&self, name: &str, kind: TxKind, color: &str, icon: &str) -> StoreResult<i64> {
        self.conn
            .execute(
                "INSERT INTO categories(name, kind, color, icon) VALUES (?1,?2,?3,?4)",
                params![name, kind.as_str(), color, icon],
            )
            .map_err(|e| duplicate_or(e, "category", name))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, "added category");
        self.notify(Table::Categories, Op::Insert, id);
        Ok(id)
    }

    /// A rename is carried over to every transaction labelled with the old name.
    pub fn update_category(&self, cat: &Category) -> StoreResult<()> {
        let old: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM categories WHERE id=?1",
                params![cat.id],
                |r| r.get(0),
            )
            .optional()?;
        let old = old.ok_or_else(|| not_found("category", cat.id))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE categories SET name=?1, kind=?2, color=?3, icon=?4 WHERE id=?5",
            params![cat.name, cat.kind.as_str(), cat.color, cat.icon, cat.id],
        )
        .map_err(|e| duplicate_or(e, "category", &cat.name))?;
        let relabelled = if old != cat.name {
            tx.execute(
                "UPDATE expenses SET category=?1 WHERE category=?2",
                params![cat.name, old],
            )?
        } else {
            0
        };
        tx.commit()?;
        tracing::info!(id = cat.id, name = %cat.name, relabelled, "updated category");
        self.notify(Table::Categories, Op::Update, cat.id);
        Ok(())
    }

    /// Refuses while any transaction still carries the category's name.
    pub fn delete_category(&self, name: &str) -> StoreResult<()> {
        let cat = self
            .category_by_name(name)?
            .ok_or_else(|| not_found("category", name))?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE category=?1",
            params![cat.name],
            |r| r.get(0),
        )?;
        if count > 0 {
            tracing::warn!(name, count, "refusing to delete category in use");
            return Err(StoreError::CategoryInUse {
                name: cat.name,
                count,
            });
        }
        self.conn
            .execute("DELETE FROM categories WHERE id=?1", params![cat.id])?;
        tracing::info!(id = cat.id, name, "deleted category");
        self.notify(Table::Categories, Op::Delete, cat.id);
        Ok(())
    }

    pub fn categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, kind, color, icon FROM categories ORDER BY kind, name")?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, kind, color, icon FROM categories WHERE name=?1",
                params![name],
                category_from_row,
            )
            .optional()?)
    }

    // ---- groups ----

    pub fn add_account(&self, name: &str, icon: &str) -> StoreResult<i64> {
        self.conn
            .execute(
                "INSERT INTO accounts(name, icon) VALUES (?1,?2)",
                params![name, icon],
            )
            .map_err(|e| duplicate_or(e, "group", name))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name, "added group");
        self.notify(Table::Accounts, Op::Insert, id);
        Ok(id)
    }

    pub fn rename_account(&self, id: i64, name: &str) -> StoreResult<()> {
        let n = self
            .conn
            .execute("UPDATE accounts SET name=?1 WHERE id=?2", params![name, id])
            .map_err(|e| duplicate_or(e, "group", name))?;
        if n == 0 {
            return Err(not_found("group", id));
        }
        self.notify(Table::Accounts, Op::Update, id);
        Ok(())
    }

    /// Transactions keep their `group_id`; they simply stop matching any group.
    pub fn delete_account(&self, id: i64) -> StoreResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM accounts WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(not_found("group", id));
        }
        tracing::info!(id, "deleted group");
        self.notify(Table::Accounts, Op::Delete, id);
        Ok(())
    }

    pub fn accounts(&self) -> StoreResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, icon FROM accounts ORDER BY id")?;
        let rows = stmt.query_map([], account_from_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn account_by_name(&self, name: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, icon FROM accounts WHERE name=?1",
                params![name],
                account_from_row,
            )
            .optional()?)
    }

    // ---- transactions ----

    pub fn add_transaction(&self, tx: NewTransaction) -> StoreResult<Transaction> {
        self.conn.execute(
            "INSERT INTO expenses(amount, kind, category, description, date, group_id, payment_type)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                tx.amount.to_string(),
                tx.kind.as_str(),
                tx.category,
                tx.description,
                format_timestamp(&tx.date),
                tx.group_id,
                tx.payment_type.map(|p| p.as_str()),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        if tx.amount.is_sign_negative() {
            tracing::warn!(id, amount = %tx.amount, "stored a negative amount");
        }
        tracing::info!(id, kind = %tx.kind, amount = %tx.amount, "recorded transaction");
        self.notify(Table::Expenses, Op::Insert, id);
        Ok(tx.with_id(id))
    }

    pub fn update_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE expenses SET amount=?1, kind=?2, category=?3, description=?4, date=?5,
             group_id=?6, payment_type=?7 WHERE id=?8",
            params![
                tx.amount.to_string(),
                tx.kind.as_str(),
                tx.category,
                tx.description,
                format_timestamp(&tx.date),
                tx.group_id,
                tx.payment_type.map(|p| p.as_str()),
                tx.id,
            ],
        )?;
        if n == 0 {
            return Err(not_found("transaction", tx.id));
        }
        self.notify(Table::Expenses, Op::Update, tx.id);
        Ok(())
    }

    pub fn delete_transaction(&self, id: i64) -> StoreResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(not_found("transaction", id));
        }
        tracing::info!(id, "deleted transaction");
        self.notify(Table::Expenses, Op::Delete, id);
        Ok(())
    }

    pub fn transaction(&self, id: i64) -> StoreResult<Option<Transaction>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {TX_COLUMNS} FROM expenses WHERE id=?1"),
                params![id],
                RawTx::from_row,
            )
            .optional()?;
        raw.map(RawTx::decode).transpose()
    }

    /// Every transaction, oldest first.
    pub fn snapshot(&self) -> StoreResult<Vec<Transaction>> {
        self.read_snapshot(
            &format!("SELECT {TX_COLUMNS} FROM expenses ORDER BY date, id"),
            &[],
        )
    }

    /// Transactions with `from <= date <= to`.
    pub fn snapshot_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<Transaction>> {
        let from = format_timestamp(&from);
        let to = format_timestamp(&to);
        self.read_snapshot(
            &format!(
                "SELECT {TX_COLUMNS} FROM expenses WHERE date >= ?1 AND date <= ?2 ORDER BY date, id"
            ),
            &[&from, &to],
        )
    }

    pub fn snapshot_for_group(&self, group_id: i64) -> StoreResult<Vec<Transaction>> {
        self.read_snapshot(
            &format!("SELECT {TX_COLUMNS} FROM expenses WHERE group_id=?1 ORDER BY date, id"),
            &[&group_id],
        )
    }

    fn read_snapshot(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StoreResult<Vec<Transaction>> {
        let retrieval = |e: rusqlite::Error| StoreError::Retrieval(e.to_string());
        let mut stmt = self.conn.prepare(sql).map_err(retrieval)?;
        let rows = stmt.query_map(args, RawTx::from_row).map_err(retrieval)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(retrieval)?.decode()?);
        }
        tracing::debug!(rows = out.len(), "read ledger snapshot");
        Ok(out)
    }
}

struct RawTx {
    id: i64,
    amount: String,
    kind: String,
    category: Option<String>,
    description: Option<String>,
    date: String,
    group_id: Option<i64>,
    payment_type: Option<String>,
}

impl RawTx {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawTx {
            id: r.get(0)?,
            amount: r.get(1)?,
            kind: r.get(2)?,
            category: r.get(3)?,
            description: r.get(4)?,
            date: r.get(5)?,
            group_id: r.get(6)?,
            payment_type: r.get(7)?,
        })
    }

    fn decode(self) -> StoreResult<Transaction> {
        let amount = self.amount.parse::<Decimal>().map_err(|e| {
            StoreError::Retrieval(format!(
                "transaction {}: invalid amount '{}': {e}",
                self.id, self.amount
            ))
        })?;
        let date = NaiveDateTime::parse_from_str(&self.date, TIMESTAMP_FMT).map_err(|e| {
            StoreError::Retrieval(format!(
                "transaction {}: invalid date '{}': {e}",
                self.id, self.date
            ))
        })?;
        Ok(Transaction {
            id: self.id,
            amount,
            kind: TxKind::from(self.kind),
            category: self.category,
            description: self.description,
            date,
            group_id: self.group_id,
            payment_type: self.payment_type.as_deref().and_then(PaymentType::parse),
        })
    }
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        kind: TxKind::from(r.get::<_, String>(2)?),
        color: r.get(3)?,
        icon: r.get(4)?,
    })
}

fn account_from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        icon: r.get(2)?,
    })
}

fn not_found(what: &'static str, key: impl ToString) -> StoreError {
    StoreError::NotFound {
        what,
        key: key.to_string(),
    }
}

fn duplicate_or(e: rusqlite::Error, what: &'static str, name: &str) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(ref f, _) if f.code == ErrorCode::ConstraintViolation => {
            StoreError::Duplicate {
                what,
                name: name.to_string(),
            }
        }
        other => StoreError::Sqlite(other),
    }
}
