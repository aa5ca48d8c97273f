//! # relay-core
//!
//! Shared vocabulary of the relay dispatch server:
//! - the JSON request/response envelope ([`envelope`])
//! - the branded session identifier ([`ids`])
//! - the dispatch error taxonomy and its status mapping ([`errors`])
//!
//! This crate is transport-agnostic; the HTTP layer lives in `relay-server`.

#![deny(unsafe_code)]

pub mod envelope;
pub mod errors;
pub mod ids;
