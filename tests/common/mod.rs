// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use pocketclip::config::Config;
use pocketclip::http::{ApiClient, ApiRequest, ApiResponse, SharedTransport, Transport, TransportError};
use pocketclip::models::{BearerToken, Credential, RemoteId, UserProfile};
use serde_json::{Value, json};

/// Plays back canned replies in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    pub calls: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: Value) -> &Self {
        self.replies.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(&self, msg: &str) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Err(TransportError(msg.to_string())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn call(&self, i: usize) -> ApiRequest {
        self.calls.borrow()[i].clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, req: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.borrow_mut().push(req.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {:?}", req))
    }
}

pub fn test_config() -> Config {
    Config {
        api_base_url: "http://ledger.test".to_string(),
        ..Config::default()
    }
}

pub fn api(transport: &Rc<ScriptedTransport>) -> ApiClient {
    let shared: SharedTransport = transport.clone();
    ApiClient::new(&test_config(), shared)
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: RemoteId::Num(7),
        username: "sari".to_string(),
        full_name: Some("Sari Wulandari".to_string()),
        email: Some("sari@example.com".to_string()),
    }
}

pub fn credential(token: &str) -> Credential {
    Credential {
        token: BearerToken::new(token).unwrap(),
        user: profile(),
    }
}

pub fn login_ok(token: &str) -> Value {
    json!({
        "success": true,
        "token": token,
        "user": { "id": 7, "username": "sari", "full_name": "Sari Wulandari", "email": "sari@example.com" }
    })
}

pub fn tx_json(id: i64, kind: &str, amount: &str, category: &str, source: &str, date: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "amount": amount,
        "category": category,
        "source": source,
        "description": null,
        "date": date
    })
}

pub fn list_ok(data: Vec<Value>) -> Value {
    json!({ "success": true, "data": data })
}
