//! Wallet derivation and message signing
//!
//! Key derivation, wallet contract code and external-message signing are
//! delegated to `tonlib-core`; this module only assembles the internal
//! message that carries the swap.


use crate::client::{stack_item, TonProvider};
use crate::config::WalletKind;
use crate::error::{cell_err, BotError, Result};
use crate::types::AccountState;
use num_bigint::BigUint;
use std::sync::Arc;
use tonlib_core::cell::{BagOfCells, Cell, CellBuilder};
use tonlib_core::mnemonic::Mnemonic;
use tonlib_core::wallet::{TonWallet, WalletVersion};
use tonlib_core::TonAddress;
use tracing::debug;

/// External messages expire this many seconds after signing
const MESSAGE_TTL_SECS: i64 = 60;

/// A wallet that can sign transfers
pub struct WalletSigner {
    wallet: TonWallet,
}

/// A signed external message ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    pub boc: Vec<u8>,
    pub seqno: u32,
}

impl WalletSigner {
    /// Derive the wallet from a space-separated mnemonic
    pub fn from_mnemonic(phrase: &str, kind: WalletKind) -> Result<Self> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        let key_pair = Mnemonic::new(words, &None)
            .and_then(|m| m.to_key_pair())
            .map_err(|e| BotError::Wallet(format!("invalid mnemonic: {}", e)))?;

        let version = match kind {
            WalletKind::V3r2 => WalletVersion::V3R2,
            WalletKind::V4r2 => WalletVersion::V4R2,
        };
        let wallet = TonWallet::derive_default(version, &key_pair)
            .map_err(|e| BotError::Wallet(e.to_string()))?;

        Ok(Self { wallet })
    }

    pub fn address(&self) -> &TonAddress {
        &self.wallet.address
    }

    /// Current wallet seqno; an undeployed wallet starts at 0
    pub async fn seqno(&self, provider: &dyn TonProvider) -> Result<u32> {
        let deployed = provider.account_state(self.address()).await? == AccountState::Active;
        self.seqno_if_deployed(provider, deployed).await
    }

    async fn seqno_if_deployed(&self, provider: &dyn TonProvider, deployed: bool) -> Result<u32> {
        if !deployed {
            return Ok(0);
        }
        let stack = provider
            .run_get_method(self.address(), "seqno", Vec::new())
            .await?;
        let seqno = stack_item(&stack, 0)?.as_num()?;
        u32::try_from(seqno).map_err(|_| BotError::Api(format!("bad seqno {}", seqno)))
    }

    /// Sign a single bounceable transfer of `value` nanotons to `dest` carrying `body`
    pub async fn transfer(
        &self,
        provider: &dyn TonProvider,
        dest: &TonAddress,
        value: u128,
        body: Cell,
    ) -> Result<SignedTransfer> {
        let deployed = provider.account_state(self.address()).await? == AccountState::Active;
        let seqno = self.seqno_if_deployed(provider, deployed).await?;
        let expire_at = (chrono::Utc::now().timestamp() + MESSAGE_TTL_SECS) as u32;

        let internal = internal_message(dest, value, body)?;
        let external_body = self
            .wallet
            .create_external_body(expire_at, seqno, vec![Arc::new(internal)])
            .map_err(cell_err)?;
        let signed = self
            .wallet
            .sign_external_body(&external_body)
            .map_err(|e| BotError::Wallet(e.to_string()))?;
        let message = self
            .wallet
            .wrap_signed_body(signed, !deployed)
            .map_err(cell_err)?;

        debug!(
            "Signed transfer seqno={} deployed={} to {}",
            seqno,
            deployed,
            dest.to_base64_url()
        );

        let boc = BagOfCells::from_root(message)
            .serialize(true)
            .map_err(cell_err)?;
        Ok(SignedTransfer { boc, seqno })
    }
}

/// Internal message: bounceable, no state init, body in a reference
pub(crate) fn internal_message(dest: &TonAddress, value: u128, body: Cell) -> Result<Cell> {
    let mut builder = CellBuilder::new();
    builder
        .store_bit(false)? // int_msg_info$0
        .store_bit(true)? // ihr_disabled
        .store_bit(true)? // bounce
        .store_bit(false)? // bounced
        .store_address(&TonAddress::NULL)?
        .store_address(dest)?
        .store_coins(&BigUint::from(value))?
        .store_bit(false)? // no extra currencies
        .store_coins(&BigUint::from(0u8))? // ihr_fee
        .store_coins(&BigUint::from(0u8))? // fwd_fee
        .store_u64(64, 0)? // created_lt
        .store_u32(32, 0)? // created_at
        .store_bit(false)? // no state init
        .store_bit(true)? // body as ref
        .store_reference(&Arc::new(body))?;
    Ok(builder.build()?)
}
