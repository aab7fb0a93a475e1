// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Wires the session and ledger together for one process run.

use std::sync::mpsc::Receiver;

use crate::config::Config;
use crate::error::Result;
use crate::http::{ApiClient, SharedTransport};
use crate::ledger::LedgerClient;
use crate::models::{Credential, Transaction, TransactionDraft};
use crate::session::{CredentialStore, SessionState, SessionStore};

pub struct App<S: CredentialStore> {
    pub config: Config,
    pub session: SessionStore<S>,
    pub ledger: LedgerClient,
    transitions: Receiver<SessionState>,
}

impl<S: CredentialStore> App<S> {
    pub fn new(config: Config, store: S, transport: SharedTransport) -> Self {
        let api = ApiClient::new(&config, transport);
        let mut session = SessionStore::new(store, api.clone());
        let transitions = session.subscribe();
        let ledger = LedgerClient::new(api, config.expense_pocket);
        Self {
            config,
            session,
            ledger,
            transitions,
        }
    }

    /// Startup: adopt any persisted credential without asking the server.
    pub fn start(&mut self) -> Option<Credential> {
        self.session.restore_session()
    }

    pub fn refresh(&mut self) -> Result<&[Transaction]> {
        self.ledger.fetch_all(&mut self.session)
    }

    /// Returns only once the post-submit resync has finished.
    pub fn add_transaction(&mut self, draft: &TransactionDraft) -> Result<Transaction> {
        self.ledger.submit(&mut self.session, draft)
    }

    /// Transitions observed since the last call, oldest first.
    pub fn take_transitions(&self) -> Vec<SessionState> {
        self.transitions.try_iter().collect()
    }

    /// True when the session ended because the server rejected the token,
    /// so the user should see a "session expired" prompt.
    pub fn session_expired(&self) -> bool {
        self.take_transitions().contains(&SessionState::Expired)
    }
}
