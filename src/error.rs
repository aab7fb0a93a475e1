// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Everything the session and ledger layers can report to a caller.
///
/// `Validation` and `Unauthorized` are recoverable by the caller (fix the
/// input, log in again). `Network` and `Server` are transient and are never
/// retried automatically.
#[derive(Debug, Error)]
pub enum PocketError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("login rejected: {0}")]
    InvalidCredentials(String),

    #[error("registration conflict: {0}")]
    Conflict(String),

    #[error("session expired or not logged in")]
    Unauthorized,

    #[error("could not reach server: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("income category '{0}' is not a known pocket")]
    UnknownPocket(String),

    #[error("{0} balance exceeds the representable range")]
    BalanceOverflow(String),

    #[error("credential storage failed: {0}")]
    Storage(String),
}

impl PocketError {
    pub(crate) fn server(status: u16, message: impl Into<String>) -> Self {
        PocketError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PocketError::Unauthorized)
    }
}

impl From<rusqlite::Error> for PocketError {
    fn from(e: rusqlite::Error) -> Self {
        PocketError::Storage(e.to_string())
    }
}

pub type Result<T, E = PocketError> = std::result::Result<T, E>;
