//! DeDust swap venue backed by a TON provider and a local wallet

use super::{swap_body, Factory, NativeVault, Pool};
use crate::client::{PriceSource, TonProvider};
use crate::error::{BotError, Result};
use crate::executor::SwapVenue;
use crate::types::{from_nano, to_nano, Asset, PoolType, ReadinessStatus, SwapReceipt};
use crate::wallet::WalletSigner;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tonlib_core::TonAddress;
use tracing::{debug, info, warn};

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// TON -> jetton swaps through the native vault
///
/// Pool and vault addresses are resolved through the factory on first use,
/// so a run that is skipped early makes no chain calls.
pub struct DedustVenue {
    provider: Arc<dyn TonProvider>,
    signer: WalletSigner,
    factory: Factory,
    jetton: TonAddress,
    pool_type: PoolType,
    contracts: OnceCell<(Pool, NativeVault)>,
    confirm_timeout: Duration,
}

impl DedustVenue {
    pub fn new(
        provider: Arc<dyn TonProvider>,
        signer: WalletSigner,
        factory: TonAddress,
        jetton: TonAddress,
        pool_type: PoolType,
        confirm_timeout: Duration,
    ) -> Self {
        Self {
            factory: Factory::new(factory, provider.clone()),
            provider,
            signer,
            jetton,
            pool_type,
            contracts: OnceCell::new(),
            confirm_timeout,
        }
    }

    async fn contracts(&self) -> Result<&(Pool, NativeVault)> {
        self.contracts
            .get_or_try_init(|| async {
                let pool = self
                    .factory
                    .pool(self.pool_type, [Asset::Jetton(self.jetton.clone()), Asset::Native])
                    .await?;
                let vault = self.factory.native_vault().await?;
                debug!(
                    "Resolved pool {} and vault {}",
                    pool.address.to_base64_url(),
                    vault.address.to_base64_url()
                );
                Ok::<_, BotError>((pool, vault))
            })
            .await
    }

    /// The (JETTON, TON) pool
    pub async fn pool(&self) -> Result<&Pool> {
        Ok(&self.contracts().await?.0)
    }

    pub async fn vault(&self) -> Result<&NativeVault> {
        Ok(&self.contracts().await?.1)
    }

    pub async fn seqno(&self) -> Result<u32> {
        self.signer.seqno(self.provider.as_ref()).await
    }

    /// Poll until the wallet seqno moves past `sent`, or the timeout elapses
    async fn wait_for_seqno(&self, sent: u32) -> bool {
        if self.confirm_timeout.is_zero() {
            return false;
        }

        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
            match self.seqno().await {
                Ok(current) if current > sent => return true,
                Ok(_) => {}
                Err(e) => debug!("seqno poll failed: {}", e),
            }
        }
        false
    }
}

#[async_trait]
impl SwapVenue for DedustVenue {
    fn wallet_address(&self) -> String {
        self.signer.address().to_base64_url()
    }

    async fn pool_readiness(&self) -> Result<ReadinessStatus> {
        self.pool().await?.readiness().await
    }

    async fn vault_readiness(&self) -> Result<ReadinessStatus> {
        self.vault().await?.readiness().await
    }

    async fn wallet_balance(&self) -> Result<Decimal> {
        let nano = self.provider.balance(self.signer.address()).await?;
        Ok(from_nano(nano))
    }

    async fn send_swap(&self, amount: Decimal, gas: Decimal) -> Result<SwapReceipt> {
        let amount_in = to_nano(amount)?;
        let value = amount_in
            .checked_add(to_nano(gas)?)
            .ok_or_else(|| BotError::Amount("amount + gas overflows".into()))?;

        let (pool, vault) = self.contracts().await?;
        let body = swap_body(&pool.address, amount_in, 0, 0)?;
        let transfer = self
            .signer
            .transfer(self.provider.as_ref(), &vault.address, value, body)
            .await?;

        self.provider.send_boc(transfer.boc).await?;
        info!(
            "Swap sent: {} TON to vault {} (seqno {})",
            amount,
            vault.address.to_base64_url(),
            transfer.seqno
        );

        let confirmed = self.wait_for_seqno(transfer.seqno).await;
        if !confirmed && !self.confirm_timeout.is_zero() {
            warn!("Seqno did not advance within {:?}", self.confirm_timeout);
        }

        Ok(SwapReceipt {
            wallet: self.wallet_address(),
            pool: pool.address.to_base64_url(),
            amount,
            gas,
            seqno: transfer.seqno,
            confirmed,
        })
    }
}

/// Jetton price estimated from the pool by quoting a 1 TON swap
pub struct PoolPriceSource {
    venue: Arc<DedustVenue>,
    jetton_decimals: u32,
}

impl PoolPriceSource {
    pub fn new(venue: Arc<DedustVenue>, jetton_decimals: u32) -> Self {
        Self {
            venue,
            jetton_decimals,
        }
    }
}

/// TON paid per whole jetton, given a quote of `amount_out` jetton units for `amount_in` nanotons
pub(crate) fn price_from_quote(amount_in: u128, amount_out: u128, jetton_decimals: u32) -> Result<Decimal> {
    if amount_out == 0 {
        return Err(BotError::Api("pool quoted zero output".into()));
    }
    let jettons = Decimal::try_from_i128_with_scale(amount_out as i128, jetton_decimals)
        .map_err(|e| BotError::Amount(format!("quote {} out of range: {}", amount_out, e)))?;
    Ok(from_nano(amount_in) / jettons)
}

#[async_trait]
impl PriceSource for PoolPriceSource {
    async fn jetton_price_ton(&self) -> Result<Decimal> {
        let amount_in = to_nano(Decimal::ONE)?;
        let estimate = self
            .venue
            .pool()
            .await?
            .estimate_swap_out(&Asset::Native, amount_in)
            .await?;
        debug!(
            "Pool quote for 1 TON: {} jetton units, trade fee {}",
            estimate.amount_out, estimate.trade_fee
        );
        price_from_quote(amount_in, estimate.amount_out, self.jetton_decimals)
    }
}
