// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::summary::load_summary;
use crate::report::MonthReport;
use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, pretty_table, req_arg};
use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;

pub fn handle(conn: &Connection, ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, ctx, sub)?,
        Some(("export", sub)) => export(conn, ctx, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn build_report(
    conn: &Connection,
    ctx: &AppContext,
    sub: &clap::ArgMatches,
) -> Result<MonthReport> {
    let summary = load_summary(conn, ctx, sub)?;
    let accounts = LedgerStore::new(conn).accounts()?;
    Ok(MonthReport::build(&summary, &accounts, ctx))
}

fn show(conn: &Connection, ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let report = build_report(conn, ctx, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!("Monthly report {} · {}", report.month, report.group);
    println!(
        "{}",
        pretty_table(
            &["Opening", "Prev. month net", "Income", "Expenses", "Closing"],
            vec![vec![
                report.opening_balance.clone(),
                report.previous_month_net.clone(),
                report.total_income.clone(),
                report.total_expense.clone(),
                report.closing_balance.clone(),
            ]],
        )
    );
    for (title, rows) in [("Income", &report.income), ("Expenses", &report.expenses)] {
        if rows.is_empty() {
            continue;
        }
        println!("{}", title);
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    r.description.clone(),
                    r.date.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Description", "Date", "Amount"], data)
        );
    }
    if !report.by_category.is_empty() {
        println!("Expense summary by category");
        let data = report
            .by_category
            .iter()
            .map(|(c, v)| vec![c.clone(), v.clone()])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], data));
    }
    Ok(())
}

fn export(conn: &Connection, ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = req_arg(sub, "format")?;
    let out = PathBuf::from(req_arg(sub, "out")?);
    let report = build_report(conn, ctx, sub)?;
    report.export(&fmt, &out)?;
    println!("Exported {} report to {}", report.month, out.display());
    Ok(())
}
