// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backup;
pub mod categories;
pub mod groups;
pub mod reports;
pub mod settings;
pub mod summary;
pub mod transactions;

use crate::engine::MonthRef;
use crate::models::Account;
use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::opt_arg;
use anyhow::{Context, Result};

/// `--group NAME` wins; otherwise the selected group, unless `--all-groups`.
pub(crate) fn resolve_group(
    store: &LedgerStore<'_>,
    ctx: &AppContext,
    m: &clap::ArgMatches,
) -> Result<Option<Account>> {
    if let Some(name) = opt_arg(m, "group") {
        let acct = store
            .account_by_name(&name)?
            .with_context(|| format!("Group '{}' not found", name))?;
        return Ok(Some(acct));
    }
    let all = m
        .try_get_one::<bool>("all-groups")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false);
    if all {
        return Ok(None);
    }
    match ctx.selected_group {
        Some(id) => Ok(store.accounts()?.into_iter().find(|a| a.id == id)),
        None => Ok(None),
    }
}

pub(crate) fn resolve_month(m: &clap::ArgMatches) -> Result<MonthRef> {
    match opt_arg(m, "month") {
        Some(s) => MonthRef::parse(&s),
        None => Ok(MonthRef::current()),
    }
}
