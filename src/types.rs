//! Core types shared across the bot

use crate::error::{BotError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tonlib_core::TonAddress;

/// Nanotons per TON
pub const NANO_PER_TON: u128 = 1_000_000_000;

/// Convert a TON amount to nanotons, rounding to the nearest nanoton
pub fn to_nano(ton: Decimal) -> Result<u128> {
    if ton.is_sign_negative() {
        return Err(BotError::Amount(format!("negative amount {}", ton)));
    }
    ton.checked_mul(Decimal::from(NANO_PER_TON as u64))
        .and_then(|nano| nano.round().to_u128())
        .ok_or_else(|| BotError::Amount(format!("{} TON does not fit in nanotons", ton)))
}

/// Convert nanotons to a TON amount
pub fn from_nano(nano: u128) -> Decimal {
    Decimal::from_i128_with_scale(nano as i128, 9).normalize()
}

/// Parse an address in any of the user-friendly or raw forms
pub fn parse_address(s: &str) -> Result<TonAddress> {
    s.trim().parse::<TonAddress>().map_err(|e| BotError::InvalidAddress {
        address: s.to_string(),
        reason: e.to_string(),
    })
}

/// Deployment/readiness of a DEX contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    NotDeployed,
    NotReady,
    Ready,
}

impl ReadinessStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessStatus::Ready)
    }
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessStatus::NotDeployed => write!(f, "not deployed"),
            ReadinessStatus::NotReady => write!(f, "not ready"),
            ReadinessStatus::Ready => write!(f, "ready"),
        }
    }
}

/// DeDust pool curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    #[default]
    Volatile,
    Stable,
}

impl PoolType {
    pub fn code(&self) -> u8 {
        match self {
            PoolType::Volatile => 0,
            PoolType::Stable => 1,
        }
    }
}

/// A tradable asset as DeDust identifies it
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Native,
    Jetton(TonAddress),
}

/// Account state as reported by the chain API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Active,
    Uninitialized,
    Frozen,
}

/// Why a run ended without swapping
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotThisTime,
    PriceTooHigh { price: Decimal, max: Decimal },
    InsufficientBalance { balance: Decimal, required: Decimal },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotThisTime => write!(f, "Not this time"),
            SkipReason::PriceTooHigh { price, max } => {
                write!(f, "Price {} TON is above the ceiling of {} TON", price, max)
            }
            SkipReason::InsufficientBalance { balance, required } => write!(
                f,
                "Balance {} TON is below the required {} TON",
                balance, required
            ),
        }
    }
}

/// Result of a swap that was sent to the vault
#[derive(Debug, Clone, PartialEq)]
pub struct SwapReceipt {
    pub wallet: String,
    pub pool: String,
    pub amount: Decimal,
    pub gas: Decimal,
    pub seqno: u32,
    /// Wallet seqno advanced before the confirmation timeout
    pub confirmed: bool,
}

/// How a single run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Swapped(SwapReceipt),
    DryRun { amount: Decimal, gas: Decimal },
    Failed(String),
}
