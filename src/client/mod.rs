//! Chain and price API clients

pub mod price;
pub mod toncenter;


pub use price::TonApiPriceClient;
pub use toncenter::ToncenterClient;

use crate::error::{cell_err, BotError, Result};
use crate::types::AccountState;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rust_decimal::Decimal;
use std::sync::Arc;
use tonlib_core::cell::{BagOfCells, Cell};
use tonlib_core::TonAddress;

/// Argument passed to a contract get-method
#[derive(Debug, Clone)]
pub enum StackArg {
    Num(u128),
    Slice(Cell),
}

/// Value returned on a get-method stack
#[derive(Debug, Clone)]
pub enum StackValue {
    Num(i128),
    Cell(Arc<Cell>),
}

impl StackValue {
    pub fn as_num(&self) -> Result<i128> {
        match self {
            StackValue::Num(n) => Ok(*n),
            other => Err(BotError::Api(format!("expected number on stack, got {:?}", other))),
        }
    }

    pub fn as_u128(&self) -> Result<u128> {
        let n = self.as_num()?;
        u128::try_from(n).map_err(|_| BotError::Api(format!("negative value {} on stack", n)))
    }

    pub fn as_cell(&self) -> Result<&Arc<Cell>> {
        match self {
            StackValue::Cell(c) => Ok(c),
            other => Err(BotError::Api(format!("expected cell on stack, got {:?}", other))),
        }
    }

    /// Read a MsgAddress from the start of a returned slice
    pub fn as_address(&self) -> Result<TonAddress> {
        self.as_cell()?.parser().load_address().map_err(cell_err)
    }
}

/// Fetch item `idx` from a get-method result
pub fn stack_item(stack: &[StackValue], idx: usize) -> Result<&StackValue> {
    stack
        .get(idx)
        .ok_or_else(|| BotError::Api(format!("get-method stack has no item {}", idx)))
}

/// Serialize a cell into a base64 BoC without CRC
pub fn cell_to_base64(cell: Cell) -> Result<String> {
    let boc = BagOfCells::from_root(cell).serialize(false).map_err(cell_err)?;
    Ok(STANDARD.encode(boc))
}

/// Parse a base64 BoC with a single root
pub fn cell_from_base64(b64: &str) -> Result<Arc<Cell>> {
    let boc = BagOfCells::parse_base64(b64).map_err(cell_err)?;
    let root = boc.single_root().map_err(cell_err)?;
    Ok(root.clone())
}

/// Read-only and send access to the TON chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TonProvider: Send + Sync {
    async fn account_state(&self, address: &TonAddress) -> Result<AccountState>;

    /// Balance in nanotons
    async fn balance(&self, address: &TonAddress) -> Result<u128>;

    async fn run_get_method(
        &self,
        address: &TonAddress,
        method: &str,
        stack: Vec<StackArg>,
    ) -> Result<Vec<StackValue>>;

    /// Broadcast a serialized external message
    async fn send_boc(&self, boc: Vec<u8>) -> Result<()>;
}

/// Source of the current jetton price
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Price of one whole jetton, in TON
    async fn jetton_price_ton(&self) -> Result<Decimal>;
}
