//! Inbound adapters translating external requests into driving-port calls.
//!
//! REST handlers live under [`http`]; live notifications use [`ws`].

pub mod http;
pub mod ws;
