// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{EXPENSE_CATEGORIES, INCOME_SOURCES, Pocket};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct PocketRow {
    key: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct Reference {
    pockets: Vec<PocketRow>,
    income_sources: Vec<&'static str>,
    expense_categories: Vec<&'static str>,
}

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let data = Reference {
        pockets: Pocket::ALL
            .iter()
            .map(|p| PocketRow {
                key: p.as_str(),
                label: p.label(),
            })
            .collect(),
        income_sources: INCOME_SOURCES.to_vec(),
        expense_categories: EXPENSE_CATEGORIES.to_vec(),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .pockets
        .iter()
        .map(|p| vec![p.key.to_string(), p.label.to_string()])
        .collect();
    println!("{}", pretty_table(&["Pocket", "Label"], rows));
    println!("Income sources: {}", data.income_sources.join(", "));
    println!("Expense categories: {}", data.expense_categories.join(", "));
    Ok(())
}
