// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod session;
pub mod utils;

pub use error::PocketError;
