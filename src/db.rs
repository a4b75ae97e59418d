// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Expensebook", "expensebook"));

pub const DEFAULT_GROUP: &str = "General Transactions";

/// (name, kind, color, icon)
const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("General", "expense", "#FF00FF", "box"),
    ("Food", "expense", "#FF6384", "fast-food"),
    ("Transport", "expense", "#36A2EB", "car"),
    ("Housing", "expense", "#FFCE56", "home"),
    ("Salary", "income", "#4BC0C0", "cash"),
    ("Bonus", "income", "#9966FF", "gift"),
];

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("expensebook.sqlite"))
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    seed_defaults(&conn)?;
    tracing::debug!("opened ledger at {}", path.display());
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        icon TEXT NOT NULL DEFAULT 'wallet'
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL,
        color TEXT NOT NULL DEFAULT '#607D8B',
        icon TEXT NOT NULL DEFAULT 'box'
    );
    CREATE INDEX IF NOT EXISTS idx_categories_kind ON categories(kind);

    -- category is a free-text label, group_id a loose reference: neither is
    -- enforced so old rows survive renames and deletions
    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        kind TEXT NOT NULL,
        category TEXT,
        description TEXT,
        date TEXT NOT NULL,
        group_id INTEGER,
        payment_type TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
    CREATE INDEX IF NOT EXISTS idx_expenses_group ON expenses(group_id);
    CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);
    "#,
    )?;
    Ok(())
}

/// Seeds the default group and categories into an empty ledger.
pub fn seed_defaults(conn: &Connection) -> Result<()> {
    let accounts: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?;
    if accounts == 0 {
        conn.execute(
            "INSERT INTO accounts(name, icon) VALUES (?1, 'wallet')",
            params![DEFAULT_GROUP],
        )?;
    }
    let categories: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if categories == 0 {
        let mut stmt =
            conn.prepare("INSERT INTO categories(name, kind, color, icon) VALUES (?1,?2,?3,?4)")?;
        for (name, kind, color, icon) in DEFAULT_CATEGORIES {
            stmt.execute(params![name, kind, color, icon])?;
        }
        tracing::info!("seeded {} default categories", DEFAULT_CATEGORIES.len());
    }
    Ok(())
}
