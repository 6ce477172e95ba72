//! Swap execution
//!
//! One run: pick the amount, pass the gates, check the DEX is ready and send
//! the swap. A failed send is reported and returned, never retried.

#[cfg(test)]
mod tests;

use crate::client::PriceSource;
use crate::config::{AmountRule, Settings};
use crate::error::{BotError, Result};
use crate::notify::Notifier;
use crate::strategy::{balance_gate, chance_gate, price_gate, GateDecision};
use crate::types::{ReadinessStatus, RunOutcome, SwapReceipt};
use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the swap is executed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapVenue: Send + Sync {
    /// User-friendly address of the swapping wallet
    fn wallet_address(&self) -> String;

    async fn pool_readiness(&self) -> Result<ReadinessStatus>;

    async fn vault_readiness(&self) -> Result<ReadinessStatus>;

    /// Wallet balance in TON
    async fn wallet_balance(&self) -> Result<Decimal>;

    /// Send `amount` TON into the pool, attaching `gas` TON for fees
    async fn send_swap(&self, amount: Decimal, gas: Decimal) -> Result<SwapReceipt>;
}

/// Parameters of a run, taken from settings
#[derive(Debug, Clone)]
pub struct RunParams {
    pub amount_rule: AmountRule,
    pub gas: Decimal,
    pub chance: Decimal,
    pub max_price: Option<Decimal>,
    pub min_balance: Option<Decimal>,
    pub dry_run: bool,
}

impl RunParams {
    pub fn from_settings(settings: &Settings, dry_run: bool) -> Result<Self> {
        Ok(Self {
            amount_rule: settings.amount_rule()?,
            gas: settings.gas_amount,
            chance: settings.chance,
            max_price: settings.max_price,
            min_balance: settings.min_balance,
            dry_run,
        })
    }
}

/// Random inputs of a run, drawn up front
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub amount: Decimal,
    pub roll: f64,
}

pub struct SwapRunner {
    venue: Arc<dyn SwapVenue>,
    price_source: Option<Arc<dyn PriceSource>>,
    notifier: Notifier,
    params: RunParams,
}

impl SwapRunner {
    pub fn new(venue: Arc<dyn SwapVenue>, notifier: Notifier, params: RunParams) -> Self {
        Self {
            venue,
            price_source: None,
            notifier,
            params,
        }
    }

    pub fn with_price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.price_source = Some(source);
        self
    }

    /// Sample the swap amount and the chance roll
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        Draw {
            amount: self.params.amount_rule.sample(rng),
            roll: rng.random::<f64>(),
        }
    }

    /// Execute one run with pre-drawn random inputs.
    ///
    /// Gates end the run with `Skipped`; a DEX that is not ready is an error.
    pub async fn run(&self, draw: Draw) -> Result<RunOutcome> {
        let params = &self.params;
        info!("TON value: {}", draw.amount);

        if let GateDecision::Skip(reason) = chance_gate(draw.roll, params.chance) {
            info!("{}", reason);
            return Ok(RunOutcome::Skipped(reason));
        }

        if let Some(max_price) = params.max_price {
            let source = self.price_source.as_ref().ok_or_else(|| {
                BotError::Config("MAX_PRICE is set but no price source is configured".into())
            })?;
            let price = source.jetton_price_ton().await?;
            info!("Jetton price: {} TON (max {})", price, max_price);
            if let GateDecision::Skip(reason) = price_gate(price, max_price) {
                info!("{}", reason);
                return Ok(RunOutcome::Skipped(reason));
            }
        }

        if let Some(reserve) = params.min_balance {
            let balance = self.venue.wallet_balance().await?;
            debug!("Wallet balance: {} TON", balance);
            if let GateDecision::Skip(reason) = balance_gate(balance, draw.amount, params.gas, reserve) {
                warn!("{}", reason);
                return Ok(RunOutcome::Skipped(reason));
            }
        }

        if !self.venue.pool_readiness().await?.is_ready() {
            return Err(BotError::NotReady("Pool (TON, JETTON)".into()));
        }
        if !self.venue.vault_readiness().await?.is_ready() {
            return Err(BotError::NotReady("Vault (TON)".into()));
        }

        let wallet = self.venue.wallet_address();
        if params.dry_run {
            warn!(
                "DRY RUN: would swap {} TON (+{} gas) from {}",
                draw.amount, params.gas, wallet
            );
            return Ok(RunOutcome::DryRun {
                amount: draw.amount,
                gas: params.gas,
            });
        }

        match self.venue.send_swap(draw.amount, params.gas).await {
            Ok(receipt) => {
                info!("Swap successful for wallet: {}", receipt.wallet);
                if let Err(e) = self.notifier.swap_success(&receipt).await {
                    warn!("Failed to send swap notification: {}", e);
                }
                Ok(RunOutcome::Swapped(receipt))
            }
            Err(e) => {
                error!("Swap failed for wallet {}: {}", wallet, e);
                if let Err(notify_err) = self.notifier.swap_failed(&wallet, &e.to_string()).await {
                    warn!("Failed to send failure notification: {}", notify_err);
                }
                Ok(RunOutcome::Failed(e.to_string()))
            }
        }
    }
}
