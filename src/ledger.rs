// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cached view of the remote ledger and the balances derived from it.
//!
//! The server is the only authority on which transactions exist and in what
//! order. The cache is replaced wholesale on every fetch, and a submit is
//! always followed by a fetch instead of patching the cache locally.

use std::collections::BTreeMap;
use std::slice;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{PocketError, Result};
use crate::http::{AckReply, ApiClient, ApiResponse, ListReply, decode, failure_message};
use crate::models::{NewTransaction, Pocket, RemoteId, Transaction, TransactionDraft, TxKind};
use crate::session::{CredentialStore, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl KindFilter {
    pub fn admits(self, tx: &Transaction) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => tx.kind == TxKind::Income,
            KindFilter::Expense => tx.kind == TxKind::Expense,
        }
    }
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(KindFilter::All),
            "income" => Ok(KindFilter::Income),
            "expense" => Ok(KindFilter::Expense),
            other => Err(format!("unknown filter '{}', expected all|income|expense", other)),
        }
    }
}

/// A lazy, order-preserving view over a transaction slice. Each call to
/// [`Filtered::iter`] starts a fresh pass.
#[derive(Debug, Clone, Copy)]
pub struct Filtered<'a> {
    txs: &'a [Transaction],
    kind: KindFilter,
}

impl<'a> Filtered<'a> {
    pub fn iter(&self) -> FilterIter<'a> {
        FilterIter {
            inner: self.txs.iter(),
            kind: self.kind,
        }
    }
}

impl<'a> IntoIterator for Filtered<'a> {
    type Item = &'a Transaction;
    type IntoIter = FilterIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Filtered<'a> {
    type Item = &'a Transaction;
    type IntoIter = FilterIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct FilterIter<'a> {
    inner: slice::Iter<'a, Transaction>,
    kind: KindFilter,
}

impl<'a> Iterator for FilterIter<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.kind;
        self.inner.by_ref().find(|tx| kind.admits(tx))
    }
}

pub fn filter(txs: &[Transaction], kind: KindFilter) -> Filtered<'_> {
    Filtered { txs, kind }
}

/// Per-pocket running totals plus the grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAggregate {
    pockets: BTreeMap<Pocket, Decimal>,
    grand_total: Decimal,
}

impl Default for BalanceAggregate {
    fn default() -> Self {
        Self {
            pockets: Pocket::ALL.into_iter().map(|p| (p, Decimal::ZERO)).collect(),
            grand_total: Decimal::ZERO,
        }
    }
}

impl BalanceAggregate {
    pub fn pocket(&self, p: Pocket) -> Decimal {
        self.pockets.get(&p).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pocket, Decimal)> + '_ {
        self.pockets.iter().map(|(p, d)| (*p, *d))
    }

    /// Percentage of the grand total held in `p`, clamped to 0..=100.
    pub fn share(&self, p: Pocket) -> Decimal {
        if self.grand_total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = self.pocket(p) / self.grand_total * Decimal::ONE_HUNDRED;
        pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    fn apply(&mut self, pocket: Pocket, delta: Decimal) -> Result<()> {
        let overflow = || PocketError::BalanceOverflow(pocket.to_string());
        let slot = self.pockets.entry(pocket).or_insert(Decimal::ZERO);
        let balance = slot.checked_add(delta).ok_or_else(overflow)?;
        let total = self.grand_total.checked_add(delta).ok_or_else(overflow)?;
        *slot = balance;
        self.grand_total = total;
        Ok(())
    }
}

/// Fold transactions into pocket balances.
///
/// Income must name a pocket; anything else is a data fault. Expenses debit
/// the pocket named by their category, or `expense_pocket` when the category
/// is an ordinary spending label.
pub fn aggregate<'a, I>(txs: I, expense_pocket: Pocket) -> Result<BalanceAggregate>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut agg = BalanceAggregate::default();
    for tx in txs {
        match tx.kind {
            TxKind::Income => {
                let pocket = tx
                    .pocket()
                    .ok_or_else(|| PocketError::UnknownPocket(tx.category.clone()))?;
                agg.apply(pocket, tx.amount)?;
            }
            TxKind::Expense => {
                agg.apply(tx.pocket().unwrap_or(expense_pocket), -tx.amount)?;
            }
        }
    }
    Ok(agg)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cashflow {
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

pub fn cashflow<'a, I>(txs: I) -> Result<Cashflow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut acc = Cashflow::default();
    for tx in txs {
        let (slot, label) = match tx.kind {
            TxKind::Income => (&mut acc.total_income, "total income"),
            TxKind::Expense => (&mut acc.total_expense, "total expense"),
        };
        *slot = slot
            .checked_add(tx.amount)
            .ok_or_else(|| PocketError::BalanceOverflow(label.to_string()))?;
    }
    Ok(acc)
}

/// Largest amount a single transaction may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, 0);

/// Check a draft locally. Never touches the network.
pub fn validate_draft(draft: &TransactionDraft) -> Result<NewTransaction> {
    let kind = draft
        .kind
        .ok_or_else(|| PocketError::Validation("transaction type is required".into()))?;

    let raw_amount = draft.amount.trim();
    let amount = raw_amount
        .parse::<Decimal>()
        .map_err(|_| PocketError::Validation(format!("amount '{}' is not a number", raw_amount)))?;
    if amount <= Decimal::ZERO {
        return Err(PocketError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(PocketError::Validation(format!(
            "amount must not exceed {}, got {}",
            MAX_AMOUNT, amount
        )));
    }

    let category = draft.category.trim();
    if category.is_empty() {
        return Err(PocketError::Validation("category is required".into()));
    }
    if kind == TxKind::Income && category.parse::<Pocket>().is_err() {
        return Err(PocketError::Validation(format!(
            "income must go to one of the pockets ({}), got '{}'",
            Pocket::ALL.map(|p| p.as_str()).join(", "),
            category
        )));
    }

    let source = draft.source.trim();
    if source.is_empty() {
        return Err(PocketError::Validation("source is required".into()));
    }

    let date = NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d").map_err(|_| {
        PocketError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", draft.date))
    })?;

    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(NewTransaction {
        kind,
        amount: amount.normalize(),
        category: category.to_string(),
        source: source.to_string(),
        description,
        date,
    })
}

pub struct LedgerClient {
    api: ApiClient,
    cache: Vec<Transaction>,
    expense_pocket: Pocket,
}

impl LedgerClient {
    pub fn new(api: ApiClient, expense_pocket: Pocket) -> Self {
        Self {
            api,
            cache: Vec::new(),
            expense_pocket,
        }
    }

    /// Last fetched transactions, in server order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.cache
    }

    pub fn filter(&self, kind: KindFilter) -> Filtered<'_> {
        filter(&self.cache, kind)
    }

    pub fn aggregate<'a, I>(&self, txs: I) -> Result<BalanceAggregate>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        aggregate(txs, self.expense_pocket)
    }

    pub fn balance(&self) -> Result<BalanceAggregate> {
        self.aggregate(&self.cache)
    }

    pub fn fetch_all<S: CredentialStore>(
        &mut self,
        session: &mut SessionStore<S>,
    ) -> Result<&[Transaction]> {
        let token = session
            .current_token()
            .ok_or(PocketError::Unauthorized)?
            .to_string();
        let resp = self.api.ledger_get(&token)?;
        reject_expired(session, &resp)?;

        let reply: ListReply = decode(&resp)?;
        if !resp.is_success() || !reply.success {
            return Err(PocketError::server(
                resp.status,
                failure_message(reply.error, "could not load transactions"),
            ));
        }
        self.cache = reply.data.unwrap_or_default();
        tracing::info!(count = self.cache.len(), "transaction cache refreshed");
        Ok(&self.cache)
    }

    /// Validate, send, then resync the whole cache. Returns the stored
    /// transaction as the server reports it after the resync.
    pub fn submit<S: CredentialStore>(
        &mut self,
        session: &mut SessionStore<S>,
        draft: &TransactionDraft,
    ) -> Result<Transaction> {
        let new_tx = validate_draft(draft)?;
        let known: Vec<RemoteId> = self.cache.iter().map(|tx| tx.id.clone()).collect();
        let token = session
            .current_token()
            .ok_or(PocketError::Unauthorized)?
            .to_string();

        let body =
            serde_json::to_value(&new_tx).map_err(|e| PocketError::Validation(e.to_string()))?;
        let resp = self.api.ledger_post(&token, body)?;
        reject_expired(session, &resp)?;

        let reply: AckReply = decode(&resp)?;
        if !resp.is_success() || !reply.success {
            return Err(PocketError::server(
                resp.status,
                failure_message(reply.error, "transaction was not saved"),
            ));
        }
        tracing::debug!(kind = new_tx.kind.as_str(), "transaction accepted, resyncing");

        // Identical entries may already exist; prefer the newest one not seen
        // in the last fetch, else the newest match.
        let txs = self.fetch_all(session)?;
        let matching = txs.iter().filter(|tx| new_tx.matches(tx));
        let fresh = matching.clone().filter(|tx| !known.contains(&tx.id)).last();
        fresh
            .or_else(|| matching.last())
            .cloned()
            .ok_or_else(|| PocketError::server(resp.status, "saved transaction missing from ledger"))
    }
}

// A 401 means the token is dead, whatever the body says.
fn reject_expired<S: CredentialStore>(
    session: &mut SessionStore<S>,
    resp: &ApiResponse,
) -> Result<()> {
    if resp.status != 401 {
        return Ok(());
    }
    if let Err(e) = session.expire() {
        tracing::warn!(
            error = %e,
            "could not clear stored credential; the rejected token stays on disk until the next logout"
        );
    }
    Err(PocketError::Unauthorized)
}
