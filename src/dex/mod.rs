//! DeDust contracts: factory, pools and the native TON vault
//!
//! Only the pieces needed for a TON -> jetton swap are covered. Contract
//! addresses are resolved through factory get-methods; the swap itself is a
//! single message to the native vault.

pub mod venue;

#[cfg(test)]
mod tests;

pub use venue::{DedustVenue, PoolPriceSource};

use crate::client::{stack_item, StackArg, TonProvider};
use crate::error::Result;
use crate::types::{AccountState, Asset, PoolType, ReadinessStatus};
use num_bigint::BigUint;
use std::sync::Arc;
use tonlib_core::cell::{Cell, CellBuilder};
use tonlib_core::TonAddress;

/// `swap` op of the native vault
pub const NATIVE_VAULT_SWAP: u32 = 0xea06185d;

/// Serialize an asset the way DeDust contracts expect it
pub fn asset_cell(asset: &Asset) -> Result<Cell> {
    let mut builder = CellBuilder::new();
    match asset {
        Asset::Native => {
            builder.store_u8(4, 0b0000)?;
        }
        Asset::Jetton(master) => {
            builder
                .store_u8(4, 0b0001)?
                .store_i8(8, master.workchain as i8)?
                .store_slice(master.hash_part.as_slice())?;
        }
    }
    Ok(builder.build()?)
}

/// Estimated output of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapEstimate {
    pub amount_out: u128,
    pub trade_fee: u128,
}

/// DeDust factory
#[derive(Clone)]
pub struct Factory {
    pub address: TonAddress,
    provider: Arc<dyn TonProvider>,
}

impl Factory {
    pub fn new(address: TonAddress, provider: Arc<dyn TonProvider>) -> Self {
        Self { address, provider }
    }

    pub async fn pool_address(&self, pool_type: PoolType, assets: [Asset; 2]) -> Result<TonAddress> {
        let [a0, a1] = assets;
        let stack = self
            .provider
            .run_get_method(
                &self.address,
                "get_pool_address",
                vec![
                    StackArg::Num(pool_type.code() as u128),
                    StackArg::Slice(asset_cell(&a0)?),
                    StackArg::Slice(asset_cell(&a1)?),
                ],
            )
            .await?;
        stack_item(&stack, 0)?.as_address()
    }

    pub async fn native_vault_address(&self) -> Result<TonAddress> {
        let stack = self
            .provider
            .run_get_method(
                &self.address,
                "get_vault_address",
                vec![StackArg::Slice(asset_cell(&Asset::Native)?)],
            )
            .await?;
        stack_item(&stack, 0)?.as_address()
    }

    pub async fn pool(&self, pool_type: PoolType, assets: [Asset; 2]) -> Result<Pool> {
        let address = self.pool_address(pool_type, assets).await?;
        Ok(Pool::new(address, self.provider.clone()))
    }

    pub async fn native_vault(&self) -> Result<NativeVault> {
        let address = self.native_vault_address().await?;
        Ok(NativeVault::new(address, self.provider.clone()))
    }
}

/// DeDust liquidity pool
#[derive(Clone)]
pub struct Pool {
    pub address: TonAddress,
    provider: Arc<dyn TonProvider>,
}

impl Pool {
    pub fn new(address: TonAddress, provider: Arc<dyn TonProvider>) -> Self {
        Self { address, provider }
    }

    /// Deployed with liquidity on both sides
    pub async fn readiness(&self) -> Result<ReadinessStatus> {
        if self.provider.account_state(&self.address).await? != AccountState::Active {
            return Ok(ReadinessStatus::NotDeployed);
        }
        let (reserve0, reserve1) = self.reserves().await?;
        if reserve0 > 0 && reserve1 > 0 {
            Ok(ReadinessStatus::Ready)
        } else {
            Ok(ReadinessStatus::NotReady)
        }
    }

    pub async fn reserves(&self) -> Result<(u128, u128)> {
        let stack = self
            .provider
            .run_get_method(&self.address, "get_reserves", Vec::new())
            .await?;
        Ok((stack_item(&stack, 0)?.as_u128()?, stack_item(&stack, 1)?.as_u128()?))
    }

    pub async fn estimate_swap_out(&self, asset_in: &Asset, amount_in: u128) -> Result<SwapEstimate> {
        let stack = self
            .provider
            .run_get_method(
                &self.address,
                "estimate_swap_out",
                vec![StackArg::Slice(asset_cell(asset_in)?), StackArg::Num(amount_in)],
            )
            .await?;
        // asset_out, amount_out, trade_fee
        Ok(SwapEstimate {
            amount_out: stack_item(&stack, 1)?.as_u128()?,
            trade_fee: stack_item(&stack, 2)?.as_u128()?,
        })
    }
}

/// Vault holding native TON for every TON pool
#[derive(Clone)]
pub struct NativeVault {
    pub address: TonAddress,
    provider: Arc<dyn TonProvider>,
}

impl NativeVault {
    pub fn new(address: TonAddress, provider: Arc<dyn TonProvider>) -> Self {
        Self { address, provider }
    }

    pub async fn readiness(&self) -> Result<ReadinessStatus> {
        match self.provider.account_state(&self.address).await? {
            AccountState::Active => Ok(ReadinessStatus::Ready),
            _ => Ok(ReadinessStatus::NotDeployed),
        }
    }
}

/// Body of a single-hop swap sent to the native vault.
///
/// No follow-up step, no deadline, output goes back to the sender.
pub fn swap_body(pool: &TonAddress, amount: u128, limit: u128, query_id: u64) -> Result<Cell> {
    let mut params = CellBuilder::new();
    params
        .store_u32(32, 0)? // deadline
        .store_address(&TonAddress::NULL)? // recipient
        .store_address(&TonAddress::NULL)? // referral
        .store_bit(false)? // fulfill payload
        .store_bit(false)?; // reject payload
    let params = params.build()?;

    let mut body = CellBuilder::new();
    body.store_u32(32, NATIVE_VAULT_SWAP)?
        .store_u64(64, query_id)?
        .store_coins(&BigUint::from(amount))?
        .store_address(pool)?
        .store_bit(false)? // kind: given in
        .store_coins(&BigUint::from(limit))?
        .store_bit(false)? // next step
        .store_reference(&Arc::new(params))?;
    Ok(body.build()?)
}
