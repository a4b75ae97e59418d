// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::{pretty_table, req_arg};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    let store = LedgerStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = req_arg(sub, "name")?;
            let icon = req_arg(sub, "icon")?;
            store.add_account(&name, &icon)?;
            println!("Added group '{}'", name);
        }
        Some(("rename", sub)) => {
            let name = req_arg(sub, "name")?;
            let to = req_arg(sub, "to")?;
            let acct = store
                .account_by_name(&name)?
                .with_context(|| format!("Group '{}' not found", name))?;
            store.rename_account(acct.id, &to)?;
            println!("Renamed group '{}' to '{}'", name, to);
        }
        Some(("list", _)) => {
            let data = store
                .accounts()?
                .into_iter()
                .map(|a| {
                    let mark = if ctx.selected_group == Some(a.id) { "*" } else { "" };
                    vec![mark.to_string(), a.name, a.icon]
                })
                .collect();
            println!("{}", pretty_table(&["", "Group", "Icon"], data));
        }
        Some(("rm", sub)) => {
            let name = req_arg(sub, "name")?;
            let acct = store
                .account_by_name(&name)?
                .with_context(|| format!("Group '{}' not found", name))?;
            store.delete_account(acct.id)?;
            if ctx.selected_group == Some(acct.id) {
                let mut next = ctx.clone();
                next.selected_group = None;
                next.save(conn)?;
            }
            println!("Removed group '{}'", name);
        }
        Some(("select", sub)) => {
            let mut next = ctx.clone();
            let target = if sub.get_flag("all") {
                None
            } else {
                Some(req_arg(sub, "name")?)
            };
            match target {
                Some(name) => {
                    let acct = store
                        .account_by_name(&name)?
                        .with_context(|| format!("Group '{}' not found", name))?;
                    next.selected_group = Some(acct.id);
                    println!("Selected group '{}'", acct.name);
                }
                None => {
                    next.selected_group = None;
                    println!("Showing all groups");
                }
            }
            next.save(conn)?;
        }
        _ => {}
    }
    Ok(())
}
