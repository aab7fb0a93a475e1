// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Wire plumbing shared by the session and ledger layers.
//!
//! [`Transport`] is the only place bytes leave the process. Everything above
//! it speaks [`PocketError`]; transport failures never escape as anything but
//! [`PocketError::Network`].

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::error::{PocketError, Result};
use crate::models::{Transaction, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait Transport {
    fn send(&self, req: &ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

pub type SharedTransport = Rc<dyn Transport>;

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, req: &ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let mut rb = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
        };
        if let Some(token) = &req.bearer {
            rb = rb.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            rb = rb.json(body);
        }
        let resp = rb.send().map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| TransportError(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AckReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<Transaction>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Endpoint layout of the remote ledger service.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    auth_path: String,
    api_path: String,
    transport: SharedTransport,
}

impl ApiClient {
    pub fn new(config: &Config, transport: SharedTransport) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_path: config.auth_path.clone(),
            api_path: config.api_path.clone(),
            transport,
        }
    }

    pub fn auth(&self, action: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let req = ApiRequest {
            method: Method::Post,
            url: format!("{}{}?action={}", self.base_url, self.auth_path, action),
            bearer: None,
            body: Some(body),
        };
        self.send(&req)
    }

    pub fn ledger_get(&self, token: &str) -> Result<ApiResponse> {
        let req = ApiRequest {
            method: Method::Get,
            url: format!("{}{}", self.base_url, self.api_path),
            bearer: Some(token.to_string()),
            body: None,
        };
        self.send(&req)
    }

    pub fn ledger_post(&self, token: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let req = ApiRequest {
            method: Method::Post,
            url: format!("{}{}", self.base_url, self.api_path),
            bearer: Some(token.to_string()),
            body: Some(body),
        };
        self.send(&req)
    }

    fn send(&self, req: &ApiRequest) -> Result<ApiResponse> {
        tracing::debug!(method = ?req.method, url = %req.url, "sending request");
        match self.transport.send(req) {
            Ok(resp) => {
                tracing::debug!(status = resp.status, "response received");
                Ok(resp)
            }
            Err(e) => {
                tracing::warn!(url = %req.url, error = %e, "transport failure");
                Err(PocketError::Network(e.0))
            }
        }
    }
}

/// Decode a JSON reply; a body that is not the expected JSON is a server fault.
pub(crate) fn decode<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T> {
    serde_json::from_str(&resp.body).map_err(|e| {
        PocketError::server(resp.status, format!("malformed response body: {}", e))
    })
}

pub(crate) fn failure_message(error: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
