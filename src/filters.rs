// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Predicate composition for list and search views.

use crate::models::Transaction;
use chrono::{Days, NaiveDate, NaiveTime};

/// At most one kind of date restriction is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    Any,
    Single(NaiveDate),
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxFilter {
    pub search_text: Option<String>,
    pub category: Option<String>,
    pub group: Option<i64>,
    date: DateFilter,
}

impl TxFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search_text = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category = Some(name.into());
        self
    }

    pub fn group(mut self, id: i64) -> Self {
        self.group = Some(id);
        self
    }

    pub fn date(&self) -> &DateFilter {
        &self.date
    }

    /// Replaces any range filter.
    pub fn set_single_date(&mut self, day: NaiveDate) {
        self.date = DateFilter::Single(day);
    }

    /// Replaces any single-date filter. Both ends open clears the date filter.
    pub fn set_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.date = if from.is_none() && to.is_none() {
            DateFilter::Any
        } else {
            DateFilter::Range { from, to }
        };
    }

    pub fn clear_dates(&mut self) {
        self.date = DateFilter::Any;
    }

    fn matches(&self, t: &Transaction, needle: Option<&str>) -> bool {
        if let Some(g) = self.group {
            if t.group_id != Some(g) {
                return false;
            }
        }
        if let Some(cat) = &self.category {
            if t.category.as_deref() != Some(cat.as_str()) {
                return false;
            }
        }
        if let Some(needle) = needle {
            let hit = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|v| v.to_lowercase().contains(needle))
            };
            if !hit(&t.description) && !hit(&t.category) {
                return false;
            }
        }
        match &self.date {
            DateFilter::Any => true,
            DateFilter::Single(day) => t.date.date() == *day,
            DateFilter::Range { from, to } => {
                let after_from = from.is_none_or(|f| t.date >= f.and_time(NaiveTime::MIN));
                let before_to = to.is_none_or(|d| match d.checked_add_days(Days::new(1)) {
                    Some(next) => t.date < next.and_time(NaiveTime::MIN),
                    None => true,
                });
                after_from && before_to
            }
        }
    }

    /// Display text for the active filter combination.
    pub fn describe(&self, group_name: Option<&str>) -> String {
        match &self.date {
            DateFilter::Single(day) => {
                return format!("Showing transactions for date {}", day);
            }
            DateFilter::Range { from, to } => {
                let fmt = |d: &Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
                return format!("Showing transactions from {} to {}", fmt(from), fmt(to))
                    .trim_end()
                    .to_string();
            }
            DateFilter::Any => {}
        }
        if self.search_text.is_none() && self.category.is_none() && self.group.is_none() {
            return String::new();
        }
        let mut parts = vec![format!(
            "Showing transactions for {}",
            self.category.as_deref().unwrap_or("All Categories")
        )];
        if self.group.is_some() {
            parts.push(format!("in group {}", group_name.unwrap_or("(unknown)")));
        }
        if let Some(s) = &self.search_text {
            parts.push(format!("matching \"{}\"", s));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub transactions: Vec<Transaction>,
    pub description: String,
}

/// Group, then category, then case-insensitive search over description or
/// category, then the date filter. Input order is preserved.
pub fn apply_filters(
    transactions: &[Transaction],
    filter: &TxFilter,
    group_name: Option<&str>,
) -> Filtered {
    let needle = filter
        .search_text
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let out: Vec<Transaction> = transactions
        .iter()
        .filter(|t| filter.matches(t, needle.as_deref()))
        .cloned()
        .collect();
    tracing::debug!(
        kept = out.len(),
        total = transactions.len(),
        "applied transaction filters"
    );
    Filtered {
        transactions: out,
        description: filter.describe(group_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxKind;
    use rust_decimal::Decimal;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(id: i64, date: NaiveDate, hour: u32) -> Transaction {
        Transaction {
            id,
            amount: Decimal::ONE,
            kind: TxKind::Expense,
            category: Some("Food".into()),
            description: Some(format!("item {id}")),
            date: date.and_hms_opt(hour, 0, 0).unwrap(),
            group_id: None,
            payment_type: None,
        }
    }

    #[test]
    fn setting_range_clears_single_date_and_back() {
        let mut f = TxFilter::new();
        f.set_single_date(day(2025, 3, 1));
        f.set_range(Some(day(2025, 3, 1)), Some(day(2025, 3, 5)));
        assert!(matches!(f.date(), DateFilter::Range { .. }));
        f.set_single_date(day(2025, 3, 2));
        assert_eq!(f.date(), &DateFilter::Single(day(2025, 3, 2)));
    }

    #[test]
    fn open_range_and_clear_mean_no_date_filter() {
        let mut f = TxFilter::new();
        f.set_range(None, None);
        assert_eq!(f.date(), &DateFilter::Any);
        f.set_single_date(day(2025, 3, 1));
        f.clear_dates();
        assert_eq!(f.date(), &DateFilter::Any);
        let txs = vec![tx(1, day(2020, 1, 1), 0), tx(2, day(2030, 1, 1), 0)];
        assert_eq!(apply_filters(&txs, &f, None).transactions.len(), 2);
    }

    #[test]
    fn range_end_includes_whole_last_day() {
        let txs = vec![
            tx(1, day(2025, 3, 5), 23),
            tx(2, day(2025, 3, 6), 0),
            tx(3, day(2025, 2, 28), 23),
        ];
        let mut f = TxFilter::new();
        f.set_range(Some(day(2025, 3, 1)), Some(day(2025, 3, 5)));
        let got = apply_filters(&txs, &f, None);
        let ids: Vec<i64> = got.transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);
        assert!(got.description.starts_with("Showing transactions from 2025-03-01"));
    }

    #[test]
    fn blank_search_is_ignored() {
        let f = TxFilter::new().search("   ");
        assert_eq!(f.search_text, None);
        assert_eq!(f.describe(None), "");
    }
}
