// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{resolve_group, resolve_month};
use crate::engine::{MonthSummary, compute_month_summary};
use crate::models::TxKind;
use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::{fmt_masked, fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Reads the snapshot and computes the dashboard. A failed read aborts before
/// any aggregation happens.
pub fn load_summary(
    conn: &Connection,
    ctx: &AppContext,
    sub: &clap::ArgMatches,
) -> Result<MonthSummary> {
    let store = LedgerStore::new(conn);
    let month = resolve_month(sub)?;
    let group = resolve_group(&store, ctx, sub)?;
    let snapshot = store.snapshot().context("Error loading data")?;
    Ok(compute_month_summary(
        &snapshot,
        month,
        group.map(|g| g.id),
    ))
}

/// Copy of `summary` with income and every balance derived from it zeroed, for
/// machine-readable output while income is hidden.
pub fn without_income(summary: &MonthSummary) -> MonthSummary {
    let mut hidden = summary.clone();
    hidden.period_income_total = Decimal::ZERO;
    hidden.opening_balance = Decimal::ZERO;
    hidden.current_balance = Decimal::ZERO;
    hidden.previous_month_net = Decimal::ZERO;
    hidden.income_breakdown.clear();
    hidden
        .period_transactions
        .retain(|t| t.kind != TxKind::Income);
    hidden
}

pub fn handle(conn: &Connection, ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let summary = load_summary(conn, ctx, sub)?;
    let printed = if ctx.show_income {
        maybe_print_json(json_flag, jsonl_flag, &summary)?
    } else {
        maybe_print_json(json_flag, jsonl_flag, &without_income(&summary))?
    };
    if printed {
        return Ok(());
    }

    let accounts = LedgerStore::new(conn).accounts()?;
    let show = ctx.show_income;
    let group_name = summary
        .group_filter
        .and_then(|id| accounts.iter().find(|a| a.id == id))
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "All groups".to_string());
    println!("{} · {}", summary.month, group_name);
    println!(
        "{}",
        pretty_table(
            &["Opening", "Income", "Expenses", "Balance (carry forward)"],
            vec![vec![
                fmt_masked(&summary.opening_balance, show),
                fmt_masked(&summary.period_income_total, show),
                fmt_money(&summary.period_expense_total),
                fmt_masked(&summary.current_balance, show),
            ]],
        )
    );

    if summary.category_breakdown.is_empty() {
        println!("No expense data available");
        return Ok(());
    }
    let mut cats: Vec<_> = summary.category_breakdown.iter().collect();
    cats.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let rows = cats
        .into_iter()
        .map(|(c, v)| vec![c.clone(), fmt_money(v)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], rows));

    if summary.group_filter.is_none() {
        let rows = summary
            .group_labels(&accounts)
            .into_iter()
            .map(|(g, v)| vec![g, fmt_money(&v)])
            .collect();
        println!("{}", pretty_table(&["Group", "Spent"], rows));
    }

    let rows = summary
        .daily_breakdown
        .iter()
        .map(|(d, v)| vec![d.to_string(), fmt_money(v)])
        .collect();
    println!("{}", pretty_table(&["Day", "Spent"], rows));
    Ok(())
}
