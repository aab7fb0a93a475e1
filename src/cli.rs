// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("pocketclip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pocket-based savings tracker synced with a remote ledger")
        .subcommand(
            Command::new("register")
                .about("Create an account (does not log in)")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("POCKETCLIP_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(Arg::new("full-name").long("full-name"))
                .arg(
                    Arg::new("login")
                        .long("login")
                        .action(ArgAction::SetTrue)
                        .help("Log in right after registering"),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and remember the session")
                .arg(Arg::new("username").long("username").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("POCKETCLIP_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the cached profile"))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record income or an expense")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .required(true)
                                .help("Pocket key for income, spending category for expenses"),
                        )
                        .arg(
                            Arg::new("source")
                                .long("source")
                                .required(true)
                                .help("Income origin or expense subject"),
                        )
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD, defaults to today"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions from the ledger")
                        .arg(
                            Arg::new("filter")
                                .long("filter")
                                .default_value("all")
                                .value_parser(["all", "income", "expense"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(json_flags(
            Command::new("balance").about("Per-pocket balances and grand total"),
        ))
        .subcommand(json_flags(
            Command::new("categories").about("Pockets, income sources and expense categories"),
        ))
}
