// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::app::App;
use crate::models::Registration;
use crate::session::CredentialStore;

pub fn register<S: CredentialStore>(app: &mut App<S>, sub: &clap::ArgMatches) -> Result<()> {
    let reg = Registration {
        username: sub.get_one::<String>("username").unwrap().trim().to_string(),
        email: sub.get_one::<String>("email").unwrap().trim().to_string(),
        password: sub.get_one::<String>("password").unwrap().to_string(),
        full_name: sub
            .get_one::<String>("full-name")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    if sub.get_flag("login") {
        let cred = app.session.register_and_login(&reg)?;
        println!("Registered and logged in as {}", cred.user.display_name());
    } else {
        app.session.register(&reg)?;
        println!("Registered '{}'. Log in with `pocketclip login`.", reg.username);
    }
    Ok(())
}

pub fn login<S: CredentialStore>(app: &mut App<S>, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap().trim();
    let password = sub.get_one::<String>("password").unwrap();
    let cred = app.session.login(username, password)?;
    println!("Hi, {}!", cred.user.display_name());
    Ok(())
}

pub fn logout<S: CredentialStore>(app: &mut App<S>) -> Result<()> {
    app.session.logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami<S: CredentialStore>(app: &App<S>) -> Result<()> {
    match app.session.profile() {
        Some(user) => {
            println!("{} (@{})", user.display_name(), user.username);
            if let Some(email) = &user.email {
                println!("{}", email);
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
