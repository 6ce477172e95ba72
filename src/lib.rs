//! TON Swap Bot
//!
//! Buys a jetton with TON on DeDust, at most once per invocation.
//!
//! ## Flow
//!
//! ```text
//! Settings (env/.env/TOML) → amount draw → chance gate → price gate → balance gate
//!                                                                         ↓
//!                          Notifier ← SwapRunner ← DedustVenue (pool/vault readiness, swap)
//! ```

pub mod client;
pub mod config;
pub mod dex;
pub mod error;
pub mod executor;
pub mod notify;
pub mod strategy;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod types_tests;
