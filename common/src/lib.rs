//! Shared value types for the netatlas workspace.
//!
//! Everything in this crate is a pure, immutable value: IP addresses,
//! endpoints, CIDR ranges and DNS server literals. No I/O, no async, no
//! global state, so every type here is safe to use from any thread.

pub mod network;
