// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credential lifecycle: acquire, persist, restore, invalidate.

use std::sync::mpsc::{self, Receiver, Sender};

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;

use crate::error::{PocketError, Result};
use crate::http::{AckReply, ApiClient, LoginReply, decode, failure_message};
use crate::models::{BearerToken, Credential, Registration, UserProfile};

const TOKEN_KEY: &str = "auth_token";
const PROFILE_KEY: &str = "user_data";

/// Durable home of the credential. Implementations must write and clear the
/// token and profile as one unit.
pub trait CredentialStore {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&mut self, credential: &Credential) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Keeps the credential in the `settings` table of the local database.
pub struct SqliteCredentialStore {
    conn: Connection,
}

impl SqliteCredentialStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let v = self
            .conn
            .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let token = self.get(TOKEN_KEY)?;
        let profile = self.get(PROFILE_KEY)?;
        match (token, profile) {
            (None, None) => Ok(None),
            (Some(t), Some(p)) => {
                let user: UserProfile = serde_json::from_str(&p)
                    .map_err(|e| PocketError::Storage(format!("corrupt {}: {}", PROFILE_KEY, e)))?;
                let token = BearerToken::new(t)
                    .ok_or_else(|| PocketError::Storage(format!("empty {}", TOKEN_KEY)))?;
                Ok(Some(Credential { token, user }))
            }
            _ => Err(PocketError::Storage(
                "token and profile are not stored together".to_string(),
            )),
        }
    }

    fn save(&mut self, credential: &Credential) -> Result<()> {
        let profile = serde_json::to_string(&credential.user)
            .map_err(|e| PocketError::Storage(e.to_string()))?;
        let tx = self.conn.transaction()?;
        for (key, value) in [(TOKEN_KEY, credential.token.as_str()), (PROFILE_KEY, profile.as_str())] {
            tx.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM settings WHERE key IN (?1, ?2)",
            params![TOKEN_KEY, PROFILE_KEY],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Option<Credential>,
}

impl MemoryCredentialStore {
    pub fn with(credential: Credential) -> Self {
        Self {
            slot: Some(credential),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, credential: &Credential) -> Result<()> {
        self.slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slot = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    Authenticated,
    /// Like `LoggedOut`, but reached because the server rejected the token.
    Expired,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        self == SessionState::Authenticated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    Logout,
    Expired,
}

pub struct SessionStore<S: CredentialStore> {
    store: S,
    api: ApiClient,
    state: SessionState,
    current: Option<Credential>,
    listeners: Vec<Sender<SessionState>>,
}

impl<S: CredentialStore> SessionStore<S> {
    pub fn new(store: S, api: ApiClient) -> Self {
        Self {
            store,
            api,
            state: SessionState::LoggedOut,
            current: None,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current(&self) -> Option<&Credential> {
        self.current.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.current.as_ref().map(|c| &c.user)
    }

    pub fn current_token(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.token.as_str())
    }

    /// Receive every state transition from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionState> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        tracing::info!(from = ?self.state, to = ?next, "session state change");
        self.state = next;
        self.listeners.retain(|l| l.send(next).is_ok());
    }

    /// Pick up a credential persisted by an earlier run. No network call:
    /// a cached credential is trusted until the server says otherwise.
    pub fn restore_session(&mut self) -> Option<Credential> {
        match self.store.load() {
            Ok(Some(credential)) => {
                tracing::debug!(user = %credential.user.username, "restored cached session");
                self.current = Some(credential.clone());
                self.transition(SessionState::Authenticated);
                Some(credential)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cached session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "could not clear cached session");
                }
                None
            }
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<Credential> {
        self.transition(SessionState::Authenticating);
        match self.try_login(username, password) {
            Ok(credential) => {
                self.current = Some(credential.clone());
                self.transition(SessionState::Authenticated);
                Ok(credential)
            }
            Err(e) => {
                tracing::debug!(error = %e, "login failed");
                // A failed attempt ends any previous session, on disk too.
                self.current = None;
                if let Err(clear_err) = self.store.clear() {
                    tracing::warn!(
                        error = %clear_err,
                        "could not clear stored credential after failed login"
                    );
                }
                self.transition(SessionState::LoggedOut);
                Err(e)
            }
        }
    }

    fn try_login(&mut self, username: &str, password: &str) -> Result<Credential> {
        let resp = self.api.auth(
            "login",
            json!({ "username": username, "password": password }),
        )?;
        if resp.status == 401 || resp.status == 403 {
            let msg = decode::<AckReply>(&resp)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| "invalid username or password".to_string());
            return Err(PocketError::InvalidCredentials(msg));
        }
        if resp.status >= 500 {
            return Err(PocketError::server(resp.status, "login service unavailable"));
        }
        let reply: LoginReply = decode(&resp)?;
        if !reply.success {
            return Err(PocketError::InvalidCredentials(failure_message(
                reply.error,
                "invalid username or password",
            )));
        }
        let token = reply
            .token
            .and_then(BearerToken::new)
            .ok_or_else(|| PocketError::server(resp.status, "login response missing token"))?;
        let user = reply
            .user
            .ok_or_else(|| PocketError::server(resp.status, "login response missing user"))?;
        let credential = Credential { token, user };
        self.store.save(&credential)?;
        Ok(credential)
    }

    /// Create an account. Does not log in.
    pub fn register(&self, reg: &Registration) -> Result<()> {
        validate_registration(reg)?;
        let body = serde_json::to_value(reg).map_err(|e| PocketError::Validation(e.to_string()))?;
        let resp = self.api.auth("register", body)?;
        let reply = decode::<AckReply>(&resp);
        let message = |fallback: &str| {
            reply
                .as_ref()
                .ok()
                .and_then(|r| r.error.clone())
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        match resp.status {
            409 => Err(PocketError::Conflict(message("account already exists"))),
            400 | 422 => Err(PocketError::Validation(message("registration rejected"))),
            s if s >= 300 => Err(PocketError::server(s, message("registration failed"))),
            // Input already passed local checks, so a refusal here is a collision.
            _ => match reply? {
                AckReply { success: true, .. } => Ok(()),
                AckReply { error, .. } => Err(PocketError::Conflict(failure_message(
                    error,
                    "account already exists",
                ))),
            },
        }
    }

    pub fn register_and_login(&mut self, reg: &Registration) -> Result<Credential> {
        self.register(reg)?;
        self.login(&reg.username, &reg.password)
    }

    /// Forget the credential. Safe to call in any state; the persisted
    /// pair is cleared every time, only the transition is skipped when
    /// there was no live session.
    pub fn invalidate(&mut self, cause: EndCause) -> Result<()> {
        let had_session = self.current.take().is_some();
        if had_session || self.state.is_authenticated() {
            let next = match cause {
                EndCause::Logout => SessionState::LoggedOut,
                EndCause::Expired => {
                    tracing::warn!("server rejected bearer token; session expired");
                    SessionState::Expired
                }
            };
            self.transition(next);
        }
        self.store.clear()
    }

    pub fn logout(&mut self) -> Result<()> {
        self.invalidate(EndCause::Logout)
    }

    pub fn expire(&mut self) -> Result<()> {
        self.invalidate(EndCause::Expired)
    }
}

fn validate_registration(reg: &Registration) -> Result<()> {
    if reg.username.trim().is_empty() {
        return Err(PocketError::Validation("username is required".into()));
    }
    if reg.password.is_empty() {
        return Err(PocketError::Validation("password is required".into()));
    }
    let email = reg.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(PocketError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}
