// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Account, Category, Transaction};
use crate::store::LedgerStore;
use crate::utils::format_timestamp;
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full copy of the ledger tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub categories: Vec<Category>,
    pub expenses: Vec<Transaction>,
    pub accounts: Vec<Account>,
}

impl Backup {
    pub fn capture(conn: &Connection) -> Result<Self> {
        let store = LedgerStore::new(conn);
        Ok(Backup {
            categories: store.categories()?,
            expenses: store.snapshot()?,
            accounts: store.accounts()?,
        })
    }

    /// Replaces every category, transaction and group in one SQLite
    /// transaction; on any failure the ledger is left untouched.
    pub fn restore(&self, conn: &mut Connection) -> Result<()> {
        let tx = conn.transaction()?;
        tx.execute_batch("DELETE FROM categories; DELETE FROM expenses; DELETE FROM accounts;")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO categories(id, name, kind, color, icon) VALUES (?1,?2,?3,?4,?5)",
            )?;
            for c in &self.categories {
                stmt.execute(params![c.id, c.name, c.kind.as_str(), c.color, c.icon])
                    .with_context(|| format!("Restore category '{}'", c.name))?;
            }
            let mut stmt =
                tx.prepare("INSERT INTO accounts(id, name, icon) VALUES (?1,?2,?3)")?;
            for a in &self.accounts {
                stmt.execute(params![a.id, a.name, a.icon])
                    .with_context(|| format!("Restore group '{}'", a.name))?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO expenses(id, amount, kind, category, description, date, group_id, payment_type)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            )?;
            for e in &self.expenses {
                stmt.execute(params![
                    e.id,
                    e.amount.to_string(),
                    e.kind.as_str(),
                    e.category,
                    e.description,
                    format_timestamp(&e.date),
                    e.group_id,
                    e.payment_type.map(|p| p.as_str()),
                ])
                .with_context(|| format!("Restore transaction {}", e.id))?;
            }
        }
        tx.commit()?;
        tracing::info!(
            categories = self.categories.len(),
            expenses = self.expenses.len(),
            accounts = self.accounts.len(),
            "restored backup"
        );
        Ok(())
    }
}

pub fn export_json(conn: &Connection, out: &Path) -> Result<Backup> {
    let backup = Backup::capture(conn)?;
    std::fs::write(out, serde_json::to_string_pretty(&backup)?)
        .with_context(|| format!("Write backup {}", out.display()))?;
    Ok(backup)
}

pub fn import_json(conn: &mut Connection, path: &Path) -> Result<Backup> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Read backup {}", path.display()))?;
    let backup: Backup = serde_json::from_str(&text)
        .with_context(|| format!("Parse backup {}", path.display()))?;
    backup.restore(conn)?;
    Ok(backup)
}
