// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier. The ledger service is not consistent about
/// sending ids as numbers or strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Num(i64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Num(n) => write!(f, "{}", n),
            RemoteId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: RemoteId,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.username,
        }
    }
}

/// Opaque bearer string. Never inspected, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(BearerToken(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Token and profile travel as one value: there is no way to hold one
/// without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: BearerToken,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// The four fixed savings pockets income is allocated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pocket {
    DanaDarurat,
    Tabungan,
    UangJajan,
    Investasi,
}

impl Pocket {
    pub const ALL: [Pocket; 4] = [
        Pocket::DanaDarurat,
        Pocket::Tabungan,
        Pocket::UangJajan,
        Pocket::Investasi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pocket::DanaDarurat => "dana_darurat",
            Pocket::Tabungan => "tabungan",
            Pocket::UangJajan => "uang_jajan",
            Pocket::Investasi => "investasi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Pocket::DanaDarurat => "Dana Darurat",
            Pocket::Tabungan => "Tabungan",
            Pocket::UangJajan => "Uang Jajan",
            Pocket::Investasi => "Investasi",
        }
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pocket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Pocket::ALL
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| format!("unknown pocket '{}'", key))
    }
}

pub const INCOME_SOURCES: [&str; 6] = ["Gaji", "Bonus", "Hadiah", "Freelance", "Bisnis", "Lainnya"];

pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Makan & Minum",
    "Transportasi",
    "Hiburan",
    "Belanja",
    "Tagihan",
    "Kesehatan",
    "Pendidikan",
    "Lainnya",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RemoteId,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "de_calendar_date")]
    pub date: NaiveDate,
}

impl Transaction {
    /// Pocket named by the category field, if it names one.
    pub fn pocket(&self) -> Option<Pocket> {
        self.category.parse().ok()
    }
}

// The server sometimes appends a time component; only the day matters.
fn de_calendar_date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Unvalidated user input for a new transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub kind: Option<TxKind>,
    pub amount: String,
    pub category: String,
    pub source: String,
    pub description: Option<String>,
    pub date: String,
}

/// A draft that passed local validation and can go on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewTransaction {
    pub(crate) fn matches(&self, tx: &Transaction) -> bool {
        tx.kind == self.kind
            && tx.amount == self.amount
            && tx.category == self.category
            && tx.source == self.source
            && tx.date == self.date
            && tx.description.as_deref().filter(|d| !d.is_empty()) == self.description.as_deref()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}
