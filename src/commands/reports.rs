// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::ledger::{BalanceAggregate, Cashflow, cashflow};
use crate::session::CredentialStore;
use crate::utils::{fmt_idr, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
pub struct BalanceReport {
    pub balances: BalanceAggregate,
    pub cashflow: Cashflow,
}

pub fn balance<S: CredentialStore>(app: &mut App<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    app.refresh()?;
    let report = BalanceReport {
        balances: app
            .ledger
            .balance()
            .context("Ledger holds data the pockets cannot account for")?,
        cashflow: cashflow(app.ledger.transactions())?,
    };
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = report
        .balances
        .iter()
        .map(|(p, amount)| {
            vec![
                p.label().to_string(),
                p.as_str().to_string(),
                fmt_idr(&amount),
                format!("{:.1}%", report.balances.share(p)),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        String::new(),
        fmt_idr(&report.balances.grand_total()),
        String::new(),
    ]);
    println!("{}", pretty_table(&["Pocket", "Key", "Balance", "Share"], rows));
    println!(
        "Income: {}   Expense: {}",
        fmt_idr(&report.cashflow.total_income),
        fmt_idr(&report.cashflow.total_expense)
    );
    Ok(())
}
