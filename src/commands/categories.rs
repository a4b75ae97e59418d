// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxKind;
use crate::store::LedgerStore;
use crate::utils::{opt_arg, pretty_table, req_arg};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = LedgerStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = req_arg(sub, "name")?;
            let kind = TxKind::from(req_arg(sub, "kind")?);
            let color = req_arg(sub, "color")?;
            let icon = req_arg(sub, "icon")?;
            store.add_category(&name, kind.clone(), &color, &icon)?;
            println!("Added {} category '{}'", kind, name);
        }
        Some(("edit", sub)) => {
            let name = req_arg(sub, "name")?;
            let mut cat = store
                .category_by_name(&name)?
                .with_context(|| format!("Category '{}' not found", name))?;
            if let Some(n) = opt_arg(sub, "new-name") {
                cat.name = n;
            }
            if let Some(c) = opt_arg(sub, "color") {
                cat.color = c;
            }
            if let Some(i) = opt_arg(sub, "icon") {
                cat.icon = i;
            }
            store.update_category(&cat)?;
            println!("Updated category '{}'", cat.name);
        }
        Some(("list", _)) => {
            let data = store
                .categories()?
                .into_iter()
                .map(|c| vec![c.name, c.kind.to_string(), c.color, c.icon])
                .collect();
            println!(
                "{}",
                pretty_table(&["Category", "Kind", "Color", "Icon"], data)
            );
        }
        Some(("rm", sub)) => {
            let name = req_arg(sub, "name")?;
            store.delete_category(&name)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
