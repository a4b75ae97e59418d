// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::{export_json, import_json};
use crate::utils::req_arg;
use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => {
            let out = PathBuf::from(req_arg(sub, "out")?);
            let b = export_json(conn, &out)?;
            println!(
                "Backed up {} transactions, {} categories, {} groups to {}",
                b.expenses.len(),
                b.categories.len(),
                b.accounts.len(),
                out.display()
            );
        }
        Some(("import", sub)) => {
            let path = PathBuf::from(req_arg(sub, "path")?);
            let b = import_json(conn, &path)?;
            println!(
                "Restored {} transactions, {} categories, {} groups",
                b.expenses.len(),
                b.categories.len(),
                b.accounts.len()
            );
        }
        _ => {}
    }
    Ok(())
}
