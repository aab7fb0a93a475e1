// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::app::App;
use crate::ledger::KindFilter;
use crate::models::{Transaction, TransactionDraft, TxKind};
use crate::session::CredentialStore;
use crate::utils::{fmt_idr, maybe_print_json, pretty_table, today};
use anyhow::{Result, anyhow};

pub fn handle<S: CredentialStore>(app: &mut App<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(app, sub)?,
        Some(("list", sub)) => list(app, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn draft_from_args(sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let kind: TxKind = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    Ok(TransactionDraft {
        kind: Some(kind),
        amount: sub.get_one::<String>("amount").unwrap().to_string(),
        category: sub.get_one::<String>("category").unwrap().to_string(),
        source: sub.get_one::<String>("source").unwrap().to_string(),
        description: sub.get_one::<String>("description").map(|s| s.to_string()),
        date: sub
            .get_one::<String>("date")
            .map(|s| s.to_string())
            .unwrap_or_else(today),
    })
}

fn add<S: CredentialStore>(app: &mut App<S>, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_args(sub)?;
    let tx = app.add_transaction(&draft)?;
    println!(
        "Recorded {} {} on {} ({} / {})",
        tx.kind.as_str(),
        fmt_idr(&tx.amount),
        tx.date,
        tx.category,
        tx.source
    );
    Ok(())
}

fn list<S: CredentialStore>(app: &mut App<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind: KindFilter = sub
        .get_one::<String>("filter")
        .map(|s| s.parse())
        .transpose()
        .map_err(|e: String| anyhow!(e))?
        .unwrap_or_default();
    let limit = sub.get_one::<usize>("limit").copied();

    app.refresh()?;
    let data = select(app.ledger.transactions(), kind, limit);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    t.category.clone(),
                    t.source.clone(),
                    fmt_idr(&t.amount),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Category", "Source", "Amount", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn select(txs: &[Transaction], kind: KindFilter, limit: Option<usize>) -> Vec<&Transaction> {
    crate::ledger::filter(txs, kind)
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
