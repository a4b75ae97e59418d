// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{MonthSummary, UNCATEGORIZED};
use crate::models::{Account, Transaction};
use crate::settings::AppContext;
use crate::utils::{fmt_masked, fmt_money};
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl ReportRow {
    fn from_tx(t: &Transaction) -> Self {
        ReportRow {
            date: t.date.format("%Y-%m-%d").to_string(),
            category: t.category.clone().unwrap_or_else(|| UNCATEGORIZED.into()),
            description: t.description.clone().unwrap_or_default(),
            amount: fmt_money(&t.amount),
        }
    }
}

/// Tabular month report: headline figures plus row listings, ready to print or
/// export. Figures hidden by the context are already masked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub group: String,
    pub opening_balance: String,
    pub previous_month_net: String,
    pub total_income: String,
    pub total_expense: String,
    pub closing_balance: String,
    pub income: Vec<ReportRow>,
    pub expenses: Vec<ReportRow>,
    pub by_category: Vec<(String, String)>,
    pub by_group: Vec<(String, String)>,
}

impl MonthReport {
    pub fn build(summary: &MonthSummary, accounts: &[Account], ctx: &AppContext) -> Self {
        let show = ctx.show_income;
        let group = match summary.group_filter {
            Some(id) => accounts
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| format!("#{}", id)),
            None => "All groups".to_string(),
        };
        let income = if show {
            summary.income_transactions().map(ReportRow::from_tx).collect()
        } else {
            Vec::new()
        };
        let mut items: Vec<_> = summary.category_breakdown.iter().collect();
        // largest spend first, name as tie-break
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let by_category = items
            .into_iter()
            .map(|(k, v)| (k.clone(), fmt_money(v)))
            .collect();
        MonthReport {
            month: summary.month.to_string(),
            group,
            opening_balance: fmt_masked(&summary.opening_balance, show),
            previous_month_net: fmt_masked(&summary.previous_month_net, show),
            total_income: fmt_masked(&summary.period_income_total, show),
            total_expense: fmt_money(&summary.period_expense_total),
            closing_balance: fmt_masked(&summary.current_balance, show),
            income,
            expenses: summary.expense_transactions().map(ReportRow::from_tx).collect(),
            by_category,
            by_group: summary
                .group_labels(accounts)
                .into_iter()
                .map(|(k, v)| (k, fmt_money(&v)))
                .collect(),
        }
    }

    /// Writes the report as `csv` or `json`. Unknown formats fail before the
    /// file is created.
    pub fn export(&self, format: &str, out: &Path) -> Result<()> {
        match format.trim().to_lowercase().as_str() {
            "csv" => self.write_csv(out)?,
            "json" => std::fs::write(out, serde_json::to_string_pretty(self)?)?,
            other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
        }
        tracing::info!(month = %self.month, path = %out.display(), "exported month report");
        Ok(())
    }

    fn write_csv(&self, out: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["section", "date", "category", "description", "amount"])?;
        for (section, rows) in [("income", &self.income), ("expense", &self.expenses)] {
            for r in rows {
                wtr.write_record([section, &r.date, &r.category, &r.description, &r.amount])?;
            }
        }
        for (cat, amt) in &self.by_category {
            wtr.write_record(["category_total", "", cat, "", amt])?;
        }
        for (label, value) in [
            ("opening_balance", &self.opening_balance),
            ("total_income", &self.total_income),
            ("total_expense", &self.total_expense),
            ("closing_balance", &self.closing_balance),
        ] {
            wtr.write_record(["summary", "", label, "", value])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
