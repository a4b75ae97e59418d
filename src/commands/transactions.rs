// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::resolve_group;
use crate::engine::{MonthRef, compute_month_summary, saturating_total};
use crate::filters::{TxFilter, apply_filters};
use crate::models::{NewTransaction, PaymentType, Transaction, TxKind};
use crate::settings::AppContext;
use crate::store::LedgerStore;
use crate::utils::{
    fmt_masked, fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal,
    parse_timestamp, pretty_table, req_arg,
};
use crate::watch::Debouncer;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub fn handle(conn: &Connection, ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, ctx, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            LedgerStore::new(conn).delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        Some(("list", sub)) => list(conn, ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = req_arg(sub, "id")?;
    raw.parse::<i64>()
        .with_context(|| format!("Invalid transaction id '{}'", raw))
}

/// Largest amount accepted on entry; leaves headroom so ledger totals stay
/// well inside the decimal range.
pub fn max_amount() -> Decimal {
    Decimal::MAX / Decimal::from(1_000_000u32)
}

/// Amounts are magnitudes; the sign lives in the kind.
fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = parse_decimal(raw)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(anyhow!(
            "Amount must not be negative ('{}'); use --kind to record income or expense",
            raw.trim()
        ));
    }
    if amount > max_amount() {
        return Err(anyhow!(
            "Amount '{}' is too large (max {})",
            raw.trim(),
            max_amount().trunc()
        ));
    }
    Ok(amount)
}

fn check_category(store: &LedgerStore<'_>, name: &str) -> Result<()> {
    store
        .category_by_name(name)?
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(())
}

fn add(conn: &Connection, ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = LedgerStore::new(conn);
    let amount = parse_amount(&req_arg(sub, "amount")?)?;
    let kind = TxKind::from(req_arg(sub, "kind")?);
    let category = opt_arg(sub, "category");
    if let Some(c) = &category {
        check_category(&store, c)?;
    }
    let date = match opt_arg(sub, "date") {
        Some(s) => parse_timestamp(&s)?,
        None => Local::now().naive_local(),
    };
    let group = resolve_group(&store, ctx, sub)?;
    let payment_type = opt_arg(sub, "payment").and_then(|p| PaymentType::parse(&p));

    let changes = Rc::new(RefCell::new(Debouncer::new(Duration::ZERO)));
    let sink = Rc::clone(&changes);
    let sub_id = store.subscribe(move |c| sink.borrow_mut().record(c, Instant::now()));

    let tx = store.add_transaction(NewTransaction {
        amount,
        kind,
        category,
        description: opt_arg(sub, "description"),
        date,
        group_id: group.as_ref().map(|g| g.id),
        payment_type,
    })?;
    store.unsubscribe(sub_id);

    println!(
        "Recorded {} {} on {}{}",
        tx.kind,
        fmt_money(&tx.amount),
        tx.date.format("%Y-%m-%d %H:%M"),
        group
            .as_ref()
            .map(|g| format!(" in '{}'", g.name))
            .unwrap_or_default()
    );

    if changes.borrow_mut().poll(Instant::now()).is_some() {
        let month = MonthRef::of(&tx.date);
        let snapshot = store.snapshot()?;
        let summary = compute_month_summary(&snapshot, month, tx.group_id);
        println!(
            "{} balance: {}",
            month,
            fmt_masked(&summary.current_balance, ctx.show_income)
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = LedgerStore::new(conn);
    let id = parse_id(sub)?;
    let mut tx = store
        .transaction(id)?
        .with_context(|| format!("Transaction {} not found", id))?;
    if let Some(raw) = opt_arg(sub, "amount") {
        tx.amount = parse_amount(&raw)?;
    }
    if let Some(kind) = opt_arg(sub, "kind") {
        tx.kind = TxKind::from(kind);
    }
    if let Some(cat) = opt_arg(sub, "category") {
        check_category(&store, &cat)?;
        tx.category = Some(cat);
    }
    if let Some(desc) = opt_arg(sub, "description") {
        tx.description = Some(desc);
    }
    if let Some(date) = opt_arg(sub, "date") {
        tx.date = parse_timestamp(&date)?;
    }
    if let Some(name) = opt_arg(sub, "group") {
        let acct = store
            .account_by_name(&name)?
            .with_context(|| format!("Group '{}' not found", name))?;
        tx.group_id = Some(acct.id);
    }
    if let Some(p) = opt_arg(sub, "payment") {
        tx.payment_type = PaymentType::parse(&p);
    }
    store.update_transaction(&tx)?;
    println!("Updated transaction {}", id);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub group: String,
    pub payment: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ListResult {
    pub description: String,
    pub rows: Vec<TransactionRow>,
    pub total_expense: Decimal,
    pub total_income: Decimal,
}

/// Newest first. Income rows are dropped when the context hides income.
pub fn query_rows(
    conn: &Connection,
    ctx: &AppContext,
    sub: &clap::ArgMatches,
) -> Result<ListResult> {
    let store = LedgerStore::new(conn);
    let group = resolve_group(&store, ctx, sub)?;
    let mut filter = TxFilter::new();
    if let Some(s) = opt_arg(sub, "search") {
        filter = filter.search(s);
    }
    if let Some(c) = opt_arg(sub, "category") {
        filter = filter.category(c);
    }
    if let Some(g) = &group {
        filter = filter.group(g.id);
    }
    if let Some(d) = opt_arg(sub, "date") {
        filter.set_single_date(parse_date(&d)?);
    } else {
        let from = opt_arg(sub, "from").map(|s| parse_date(&s)).transpose()?;
        let to = opt_arg(sub, "to").map(|s| parse_date(&s)).transpose()?;
        filter.set_range(from, to);
    }

    let snapshot = store.snapshot()?;
    let accounts = store.accounts()?;
    let filtered = apply_filters(&snapshot, &filter, group.as_ref().map(|g| g.name.as_str()));

    let mut txs: Vec<Transaction> = filtered
        .transactions
        .into_iter()
        .filter(|t| ctx.show_income || t.kind != TxKind::Income)
        .collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }

    let total_expense = saturating_total(
        txs.iter()
            .filter(|t| t.kind == TxKind::Expense)
            .map(|t| t.amount),
    );
    let total_income = saturating_total(
        txs.iter()
            .filter(|t| t.kind == TxKind::Income)
            .map(|t| t.amount),
    );
    let rows = txs
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.format("%Y-%m-%d %H:%M").to_string(),
            kind: t.kind.to_string(),
            category: t.category.unwrap_or_default(),
            description: t.description.unwrap_or_default(),
            group: t
                .group_id
                .and_then(|id| accounts.iter().find(|a| a.id == id))
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            payment: t.payment_type.map(|p| p.as_str().to_string()).unwrap_or_default(),
            amount: fmt_money(&t.amount),
        })
        .collect();
    Ok(ListResult {
        description: filtered.description,
        rows,
        total_expense,
        total_income,
    })
}

fn list(conn: &Connection, ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, ctx, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data.rows)? {
        if !data.description.is_empty() {
            println!("{}", data.description);
        }
        let rows: Vec<Vec<String>> = data
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.group.clone(),
                    r.payment.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Category", "Description", "Group", "Payment", "Amount"],
                rows,
            )
        );
        println!("Total expenses: {}", fmt_money(&data.total_expense));
        if ctx.show_income {
            println!("Total income: {}", fmt_money(&data.total_income));
        }
    }
    Ok(())
}
