// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a money movement.
///
/// Anything other than `income` or `expense` is kept verbatim as `Other` so a
/// stray value read back from storage never turns into an error; aggregations
/// ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxKind {
    Income,
    Expense,
    Other(String),
}

impl TxKind {
    pub fn as_str(&self) -> &str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
            TxKind::Other(s) => s,
        }
    }
}

impl From<String> for TxKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "income" => TxKind::Income,
            "expense" => TxKind::Expense,
            _ => TxKind::Other(s),
        }
    }
}

impl From<&str> for TxKind {
    fn from(s: &str) -> Self {
        TxKind::from(s.to_string())
    }
}

impl From<TxKind> for String {
    fn from(k: TxKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "e-cash")]
    ECash,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Credit => "credit",
            PaymentType::ECash => "e-cash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(PaymentType::Cash),
            "credit" => Some(PaymentType::Credit),
            "e-cash" | "ecash" => Some(PaymentType::ECash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: TxKind,
    pub color: String,
    pub icon: String,
}

/// A group (sub-ledger) that partitions transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub kind: TxKind,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDateTime, // local wall clock
    pub group_id: Option<i64>,
    pub payment_type: Option<PaymentType>,
}

impl Transaction {
    /// Signed contribution to a running balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TxKind::Income => self.amount,
            TxKind::Expense => -self.amount,
            TxKind::Other(_) => Decimal::ZERO,
        }
    }
}

/// Fields of a transaction before the store assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub kind: TxKind,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub group_id: Option<i64>,
    pub payment_type: Option<PaymentType>,
}

impl NewTransaction {
    pub fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            description: self.description,
            date: self.date,
            group_id: self.group_id,
            payment_type: self.payment_type,
        }
    }
}
