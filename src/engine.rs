// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month aggregation over a transaction snapshot.
//!
//! Everything here is a pure function of its inputs: the caller reads a
//! snapshot from the store, picks a month and an optional group, and gets back
//! a [`MonthSummary`]. Nothing is read from settings or the clock unless the
//! caller asks for [`MonthRef::current`].

use crate::models::{Account, Transaction, TxKind};
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const UNCATEGORIZED: &str = "(uncategorized)";
pub const OTHER_GROUP: &str = "Other";

/// A calendar month in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(anyhow!("Invalid month {}-{:02}", year, month));
        }
        Ok(MonthRef { year, month })
    }

    /// The month containing the local "now". Not reproducible; pass an explicit
    /// month when the result must be.
    pub fn current() -> Self {
        Self::of(&Local::now().naive_local())
    }

    pub fn of(ts: &NaiveDateTime) -> Self {
        MonthRef {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(MonthRef {
            year: d.year(),
            month: d.month(),
        })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Day 1, 00:00:00.000.
    pub fn start(&self) -> NaiveDateTime {
        self.first_day().and_time(NaiveTime::MIN)
    }

    /// Last day, 23:59:59.999.
    pub fn end(&self) -> NaiveDateTime {
        let t = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.last_day().and_time(t)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            MonthRef { year: self.year - 1, month: 12 }
        } else {
            MonthRef { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            MonthRef { year: self.year + 1, month: 1 }
        } else {
            MonthRef { year: self.year, month: self.month + 1 }
        }
    }

    /// Half-open: `start() <= ts < next().start()`. Stored timestamps carry
    /// milliseconds, where this equals `ts <= end()`; finer timestamps after
    /// `end()` still belong to this month, so consecutive months never leave a gap.
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start() && *ts < self.next().start()
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Key of the group breakdown. Transactions without a group land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupBucket {
    Group(i64),
    Other,
}

impl From<Option<i64>> for GroupBucket {
    fn from(id: Option<i64>) -> Self {
        id.map_or(GroupBucket::Other, GroupBucket::Group)
    }
}

impl fmt::Display for GroupBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBucket::Group(id) => write!(f, "#{}", id),
            GroupBucket::Other => f.write_str(OTHER_GROUP),
        }
    }
}

impl Serialize for GroupBucket {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: MonthRef,
    pub group_filter: Option<i64>,
    pub opening_balance: Decimal,
    pub period_income_total: Decimal,
    pub period_expense_total: Decimal,
    pub current_balance: Decimal,
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub income_breakdown: BTreeMap<String, Decimal>,
    pub group_breakdown: BTreeMap<GroupBucket, Decimal>,
    /// Expense totals per day, ascending.
    pub daily_breakdown: Vec<(NaiveDate, Decimal)>,
    /// Net of the immediately preceding month alone; informational only, the
    /// opening balance already covers all earlier history.
    pub previous_month_net: Decimal,
    /// Period rows, ordered by date then id.
    pub period_transactions: Vec<Transaction>,
}

impl MonthSummary {
    /// Group breakdown keyed by group name. Unknown or missing groups fold into
    /// `Other`.
    pub fn group_labels(&self, accounts: &[Account]) -> BTreeMap<String, Decimal> {
        let mut out = BTreeMap::new();
        for (bucket, amount) in &self.group_breakdown {
            let label = match bucket {
                GroupBucket::Group(id) => accounts
                    .iter()
                    .find(|a| a.id == *id)
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| OTHER_GROUP.to_string()),
                GroupBucket::Other => OTHER_GROUP.to_string(),
            };
            accumulate(out.entry(label).or_insert(Decimal::ZERO), *amount);
        }
        out
    }

    pub fn income_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.period_transactions
            .iter()
            .filter(|t| t.kind == TxKind::Income)
    }

    pub fn expense_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.period_transactions
            .iter()
            .filter(|t| t.kind == TxKind::Expense)
    }
}

fn in_group(t: &Transaction, group_filter: Option<i64>) -> bool {
    match group_filter {
        Some(g) => t.group_id == Some(g),
        None => true,
    }
}

/// Adds `v` into `slot`, clamping at the representable bound instead of
/// panicking. Returns `false` when the sum was clamped.
pub fn accumulate(slot: &mut Decimal, v: Decimal) -> bool {
    match slot.checked_add(v) {
        Some(sum) => {
            *slot = sum;
            true
        }
        None => {
            *slot = slot.saturating_add(v);
            false
        }
    }
}

/// Clamped sum of `values`.
pub fn saturating_total(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut clamped = 0usize;
    for v in values {
        if !accumulate(&mut total, v) {
            clamped += 1;
        }
    }
    if clamped > 0 {
        tracing::warn!(clamped, %total, "total exceeds the decimal range, clamped");
    }
    total
}

fn category_key(t: &Transaction) -> String {
    t.category
        .clone()
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Net (income − expense) of transactions in `[from, until)` for the group.
/// `from = None` means all history.
pub fn net_between(
    transactions: &[Transaction],
    from: Option<NaiveDateTime>,
    until: NaiveDateTime,
    group_filter: Option<i64>,
) -> Decimal {
    saturating_total(
        transactions
            .iter()
            .filter(|t| in_group(t, group_filter))
            .filter(|t| t.date < until && from.is_none_or(|f| t.date >= f))
            .map(Transaction::signed_amount),
    )
}

/// Summarises `month` for `group_filter` (or every group when `None`).
///
/// Opening balance accumulates all history before the month, not just the
/// preceding month. Transactions of an unknown kind count nowhere; expenses
/// without a category are bucketed under [`UNCATEGORIZED`].
pub fn compute_month_summary(
    transactions: &[Transaction],
    month: MonthRef,
    group_filter: Option<i64>,
) -> MonthSummary {
    let start = month.start();
    let opening_balance = net_between(transactions, None, start, group_filter);
    let previous_month_net = net_between(
        transactions,
        Some(month.previous().start()),
        start,
        group_filter,
    );

    let mut period: Vec<Transaction> = transactions
        .iter()
        .filter(|t| in_group(t, group_filter) && month.contains(&t.date))
        .cloned()
        .collect();
    period.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_income_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_group: BTreeMap<GroupBucket, Decimal> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut clamped = 0usize;

    for t in &period {
        let ok = match t.kind {
            TxKind::Income => {
                let a = accumulate(&mut income, t.amount);
                let b = accumulate(
                    by_income_category
                        .entry(category_key(t))
                        .or_insert(Decimal::ZERO),
                    t.amount,
                );
                a && b
            }
            TxKind::Expense => {
                let a = accumulate(&mut expense, t.amount);
                let b = accumulate(
                    by_category.entry(category_key(t)).or_insert(Decimal::ZERO),
                    t.amount,
                );
                let c = accumulate(
                    by_group
                        .entry(GroupBucket::from(t.group_id))
                        .or_insert(Decimal::ZERO),
                    t.amount,
                );
                let d = accumulate(by_day.entry(t.date.date()).or_insert(Decimal::ZERO), t.amount);
                a && b && c && d
            }
            TxKind::Other(_) => {
                skipped += 1;
                true
            }
        };
        if !ok {
            clamped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, %month, "ignored transactions of unknown kind");
    }
    if clamped > 0 {
        tracing::warn!(clamped, %month, "period totals exceed the decimal range, clamped");
    }

    let summary = MonthSummary {
        month,
        group_filter,
        opening_balance,
        period_income_total: income,
        period_expense_total: expense,
        current_balance: opening_balance
            .saturating_add(income)
            .saturating_sub(expense),
        category_breakdown: by_category,
        income_breakdown: by_income_category,
        group_breakdown: by_group,
        daily_breakdown: by_day.into_iter().collect(),
        previous_month_net,
        period_transactions: period,
    };
    tracing::debug!(
        %month,
        group = ?group_filter,
        rows = summary.period_transactions.len(),
        opening = %summary.opening_balance,
        balance = %summary.current_balance,
        "computed month summary"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn tx(id: i64, kind: &str, amount: i64, date: NaiveDateTime) -> Transaction {
        Transaction {
            id,
            amount: Decimal::from(amount),
            kind: TxKind::from(kind),
            category: None,
            description: None,
            date,
            group_id: None,
            payment_type: None,
        }
    }

    #[test]
    fn month_bounds_cover_whole_days() {
        let feb = MonthRef::new(2024, 2).unwrap();
        assert_eq!(feb.start().to_string(), "2024-02-01 00:00:00");
        assert_eq!(feb.end().to_string(), "2024-02-29 23:59:59.999");
        assert_eq!(MonthRef::new(2025, 12).unwrap().next().to_string(), "2026-01");
        assert_eq!(MonthRef::new(2025, 1).unwrap().previous().to_string(), "2024-12");
    }

    #[test]
    fn contains_is_inclusive_at_both_edges() {
        let mar = MonthRef::new(2025, 3).unwrap();
        assert!(mar.contains(&mar.start()));
        assert!(mar.contains(&mar.end()));
        assert!(!mar.contains(&mar.next().start()));
        assert!(!mar.contains(&(mar.start() - chrono::Duration::milliseconds(1))));
    }

    #[test]
    fn sub_millisecond_tail_stays_in_its_month() {
        let mar = MonthRef::new(2025, 3).unwrap();
        let tail = NaiveDate::from_ymd_opt(2025, 3, 31)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_500)
            .unwrap();
        assert!(tail > mar.end());
        assert!(mar.contains(&tail));
        assert!(!mar.next().contains(&tail));
    }

    #[test]
    fn huge_totals_clamp_instead_of_panicking() {
        let big = "50000000000000000000000000000".parse::<Decimal>().unwrap();
        let mut a = tx(1, "expense", 0, at(2025, 3, 2));
        a.amount = big;
        let mut b = tx(2, "expense", 0, at(2025, 3, 2));
        b.amount = big;
        let mut c = tx(3, "income", 0, at(2025, 2, 2));
        c.amount = big;
        let mut d = c.clone();
        d.id = 4;

        let s = compute_month_summary(&[a, b, c, d], MonthRef::new(2025, 3).unwrap(), None);
        assert_eq!(s.period_expense_total, Decimal::MAX);
        assert_eq!(s.opening_balance, Decimal::MAX);
        assert_eq!(s.category_breakdown[UNCATEGORIZED], Decimal::MAX);
        assert_eq!(s.daily_breakdown[0].1, Decimal::MAX);
        assert_eq!(s.current_balance, Decimal::ZERO);
    }

    #[test]
    fn rejects_bad_months() {
        assert!(MonthRef::new(2025, 13).is_err());
        assert!(MonthRef::parse("2025-00").is_err());
        assert_eq!(MonthRef::parse(" 2025-07 ").unwrap(), MonthRef::new(2025, 7).unwrap());
    }

    #[test]
    fn previous_month_net_only_covers_that_month() {
        let txs = vec![
            tx(1, "income", 100, at(2025, 1, 5)),
            tx(2, "income", 40, at(2025, 2, 5)),
            tx(3, "expense", 15, at(2025, 2, 20)),
        ];
        let s = compute_month_summary(&txs, MonthRef::new(2025, 3).unwrap(), None);
        assert_eq!(s.previous_month_net, Decimal::from(25));
        assert_eq!(s.opening_balance, Decimal::from(125));
    }

    #[test]
    fn negative_amounts_are_summed_as_stored() {
        let txs = vec![tx(1, "expense", -20, at(2025, 3, 1))];
        let s = compute_month_summary(&txs, MonthRef::new(2025, 3).unwrap(), None);
        assert_eq!(s.period_expense_total, Decimal::from(-20));
        assert_eq!(s.current_balance, Decimal::from(20));
    }

    #[test]
    fn group_labels_resolve_names() {
        let mut a = tx(1, "expense", 10, at(2025, 3, 1));
        a.group_id = Some(7);
        let mut b = tx(2, "expense", 5, at(2025, 3, 2));
        b.group_id = Some(99);
        let c = tx(3, "expense", 1, at(2025, 3, 3));
        let s = compute_month_summary(&[a, b, c], MonthRef::new(2025, 3).unwrap(), None);
        let accounts = vec![Account {
            id: 7,
            name: "Home".into(),
            icon: "home".into(),
        }];
        let labels = s.group_labels(&accounts);
        assert_eq!(labels.get("Home"), Some(&Decimal::from(10)));
        assert_eq!(labels.get(OTHER_GROUP), Some(&Decimal::from(6)));
    }
}
