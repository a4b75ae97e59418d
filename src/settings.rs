// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

const KEY_SELECTED_GROUP: &str = "selected_group_id";
const KEY_SHOW_INCOME: &str = "show_income";
const KEY_USER_NAME: &str = "user_name";

/// Persisted user preferences, loaded once and handed to whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    pub selected_group: Option<i64>,
    pub show_income: bool,
    pub user_name: Option<String>,
}

impl Default for AppContext {
    fn default() -> Self {
        AppContext {
            selected_group: None,
            show_income: true,
            user_name: None,
        }
    }
}

impl AppContext {
    /// Missing or unparsable values fall back to the defaults.
    pub fn load(conn: &Connection) -> Result<Self> {
        let selected_group = get_setting(conn, KEY_SELECTED_GROUP)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);
        let show_income = get_setting(conn, KEY_SHOW_INCOME)?
            .map(|v| v.trim() != "false")
            .unwrap_or(true);
        let user_name = get_setting(conn, KEY_USER_NAME)?.filter(|s| !s.trim().is_empty());
        Ok(AppContext {
            selected_group,
            show_income,
            user_name,
        })
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        match self.selected_group {
            Some(id) => set_setting(conn, KEY_SELECTED_GROUP, &id.to_string())?,
            None => delete_setting(conn, KEY_SELECTED_GROUP)?,
        }
        set_setting(conn, KEY_SHOW_INCOME, &self.show_income.to_string())?;
        match &self.user_name {
            Some(name) => set_setting(conn, KEY_USER_NAME, name)?,
            None => delete_setting(conn, KEY_USER_NAME)?,
        }
        Ok(())
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn delete_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}
