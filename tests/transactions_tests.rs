// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{ScriptedTransport, credential, list_ok, test_config, tx_json};
use pocketclip::app::App;
use pocketclip::ledger::KindFilter;
use pocketclip::models::TxKind;
use pocketclip::session::{MemoryCredentialStore, SessionState};
use pocketclip::{cli, commands::transactions};
use serde_json::json;

fn app_with(t: &std::rc::Rc<ScriptedTransport>) -> App<MemoryCredentialStore> {
    let mut app = App::new(
        test_config(),
        MemoryCredentialStore::with(credential("tok-1")),
        t.clone(),
    );
    app.start();
    app
}

#[test]
fn list_limit_and_filter_respected() {
    let t = ScriptedTransport::new();
    t.reply(
        200,
        list_ok(vec![
            tx_json(1, "income", "100", "tabungan", "Gaji", "2025-01-03"),
            tx_json(2, "expense", "10", "Belanja", "Pasar", "2025-01-02"),
            tx_json(3, "income", "200", "investasi", "Bonus", "2025-01-01"),
            tx_json(4, "income", "300", "tabungan", "Hadiah", "2024-12-31"),
        ]),
    );
    let mut app = app_with(&t);
    app.refresh().unwrap();

    let matches = cli::build_cli().get_matches_from([
        "pocketclip", "tx", "list", "--filter", "income", "--limit", "2",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let kind: KindFilter = list_m.get_one::<String>("filter").unwrap().parse().unwrap();
            let limit = list_m.get_one::<usize>("limit").copied();
            let rows = transactions::select(app.ledger.transactions(), kind, limit);
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].id.to_string(), "1");
            assert_eq!(rows[1].id.to_string(), "3");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_args_become_a_draft() {
    let matches = cli::build_cli().get_matches_from([
        "pocketclip",
        "tx",
        "add",
        "--type",
        "expense",
        "--amount",
        "25000",
        "--category",
        "Makan & Minum",
        "--source",
        "Warung",
        "--date",
        "2025-02-14",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("add", add_m)) = tx_m.subcommand() else {
        panic!("no add subcommand");
    };
    let draft = transactions::draft_from_args(add_m).unwrap();
    assert_eq!(draft.kind, Some(TxKind::Expense));
    assert_eq!(draft.amount, "25000");
    assert_eq!(draft.category, "Makan & Minum");
    assert_eq!(draft.date, "2025-02-14");
    assert!(draft.description.is_none());
}

#[test]
fn expired_token_is_reported_to_the_orchestrator() {
    let t = ScriptedTransport::new();
    t.reply(401, json!({}));
    let mut app = app_with(&t);
    assert_eq!(app.take_transitions(), vec![SessionState::Authenticated]);

    assert!(app.refresh().unwrap_err().is_unauthorized());
    assert!(app.session_expired());
    assert!(!app.session_expired());
    assert_eq!(app.session.state(), SessionState::Expired);
}
