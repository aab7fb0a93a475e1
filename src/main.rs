// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use anyhow::Result;

use pocketclip::app::App;
use pocketclip::http::ReqwestTransport;
use pocketclip::session::SqliteCredentialStore;
use pocketclip::{cli, commands, config, db, logging, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = config::load()?;
    logging::init(&cfg.log_filter, cfg.log_json);

    let store = SqliteCredentialStore::new(db::open_or_init()?);
    let transport = Rc::new(ReqwestTransport::new(utils::http_client(cfg.timeout_secs)?));
    let mut app = App::new(cfg, store, transport);
    app.start();

    let outcome = match matches.subcommand() {
        Some(("register", sub)) => commands::auth::register(&mut app, sub),
        Some(("login", sub)) => commands::auth::login(&mut app, sub),
        Some(("logout", _)) => commands::auth::logout(&mut app),
        Some(("whoami", _)) => commands::auth::whoami(&app),
        Some(("tx", sub)) => commands::transactions::handle(&mut app, sub),
        Some(("balance", sub)) => commands::reports::balance(&mut app, sub),
        Some(("categories", sub)) => commands::categories::handle(sub),
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };

    if app.session_expired() {
        eprintln!("Session expired. Please log in again with `pocketclip login`.");
    }
    outcome
}
