//! Pre-swap gates
//!
//! Each gate looks at one number and decides whether this run may go on.


use crate::types::SkipReason;
use rust_decimal::Decimal;

/// Verdict of a single gate
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Proceed,
    Skip(SkipReason),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

/// Run with probability `1/chance`: skip when `roll > 1/chance`.
///
/// `roll` is uniform in `[0, 1)`. A chance of 1 never skips.
pub fn chance_gate(roll: f64, chance: Decimal) -> GateDecision {
    let roll = Decimal::from_f64_retain(roll).unwrap_or(Decimal::ONE);
    if chance <= Decimal::ONE || roll <= Decimal::ONE / chance {
        GateDecision::Proceed
    } else {
        GateDecision::Skip(SkipReason::NotThisTime)
    }
}

/// Skip when the jetton costs more than `max` TON
pub fn price_gate(price: Decimal, max: Decimal) -> GateDecision {
    if price > max {
        GateDecision::Skip(SkipReason::PriceTooHigh { price, max })
    } else {
        GateDecision::Proceed
    }
}

/// Skip unless `reserve` TON remains after `amount + gas` leave the wallet
pub fn balance_gate(balance: Decimal, amount: Decimal, gas: Decimal, reserve: Decimal) -> GateDecision {
    // a sum past Decimal::MAX cannot be covered by any balance
    let required = amount
        .checked_add(gas)
        .and_then(|v| v.checked_add(reserve))
        .unwrap_or(Decimal::MAX);
    if balance < required {
        GateDecision::Skip(SkipReason::InsufficientBalance { balance, required })
    } else {
        GateDecision::Proceed
    }
}
