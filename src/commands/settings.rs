// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::{pretty_table, req_arg};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let group = match ctx.selected_group {
                Some(id) => LedgerStore::new(conn)
                    .accounts()?
                    .into_iter()
                    .find(|a| a.id == id)
                    .map(|a| a.name)
                    .unwrap_or_else(|| format!("#{} (deleted)", id)),
                None => "All groups".to_string(),
            };
            let rows = vec![
                vec!["selected group".to_string(), group],
                vec!["show income".to_string(), ctx.show_income.to_string()],
                vec![
                    "user name".to_string(),
                    ctx.user_name.clone().unwrap_or_default(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("show-income", sub)) => {
            let mut next = ctx.clone();
            next.show_income = sub.get_one::<bool>("value").copied().unwrap_or(true);
            next.save(conn)?;
            println!(
                "Income is now {}",
                if next.show_income { "shown" } else { "hidden" }
            );
        }
        Some(("name", sub)) => {
            let mut next = ctx.clone();
            next.user_name = Some(req_arg(sub, "name")?);
            next.save(conn)?;
            println!("Hello, {}", next.user_name.as_deref().unwrap_or_default());
        }
        _ => {}
    }
    Ok(())
}
