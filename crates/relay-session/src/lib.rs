//! # relay-session
//!
//! Session-side half of the dispatch server:
//! - [`table`] — per-concrete-type operation tables (name → handler), the
//!   [`Operations`](table::Operations) contract new session types implement
//! - [`session`] — the generic session container with per-session mutual
//!   exclusion and a last-activity timestamp
//! - the dispatch path (`Session::invoke`) translating resolution and
//!   execution failures into response envelopes
//! - [`store`] — the concurrent id → session mapping with sweep-based eviction
//!
//! A session is reachable only through the store's mapping; callers hold
//! short-lived `Arc` handles while a request is in flight.

#![deny(unsafe_code)]

mod dispatch;
pub mod session;
pub mod store;
pub mod table;
