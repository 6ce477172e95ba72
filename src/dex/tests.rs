//! Tests for DeDust contract wrappers

#[cfg(test)]
mod tests {
    use super::super::venue::price_from_quote;
    use super::super::*;
    use crate::client::{MockTonProvider, StackValue};
    use crate::config::WalletKind;
    use crate::error::BotError;
    use crate::executor::SwapVenue;
    use crate::wallet::WalletSigner;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::time::Duration;
    use tonlib_core::cell::BagOfCells;

    const FACTORY: &str = "0:5f0564fb5f604783db57031ce1cf668a88d4d4d6da6de4db222b4b920d6fd800";
    const JETTON: &str = "0:65aac9b5e380eae928db3c8e238d9bc0d61a9320fdc2bc7a2f6c87d6fedf9208";
    const POOL: &str = "0:3e5ffca8ddfcf36c36c9ff46f31562aab51b9914845ad6c26cbde649d58a5588";
    const VAULT: &str = "0:a1b2c3d4e5f60718293a4b5c6d7e8f90112233445566778899aabbccddeeff00";
    const PHRASE: &str = "absent abstract about abandon abandon above above about ability accident \
        above abstract ability able absent abstract abstract abuse absent above able absurd \
        ability abandon";

    fn addr(s: &str) -> TonAddress {
        s.parse().unwrap()
    }

    fn address_slice(a: &TonAddress) -> StackValue {
        let mut builder = CellBuilder::new();
        builder.store_address(a).unwrap();
        StackValue::Cell(Arc::new(builder.build().unwrap()))
    }

    #[test]
    fn test_native_asset_cell() {
        let cell = asset_cell(&Asset::Native).unwrap();
        let mut parser = cell.parser();
        assert_eq!(parser.load_u8(4).unwrap(), 0);
        assert_eq!(cell.bit_len(), 4);
    }

    #[test]
    fn test_jetton_asset_cell() {
        let jetton = addr(JETTON);
        let cell = asset_cell(&Asset::Jetton(jetton.clone())).unwrap();
        assert_eq!(cell.bit_len(), 4 + 8 + 256);

        let mut parser = cell.parser();
        assert_eq!(parser.load_u8(4).unwrap(), 1);
        assert_eq!(parser.load_i8(8).unwrap(), 0);
        let mut hash = [0u8; 32];
        parser.load_slice(&mut hash).unwrap();
        assert_eq!(hash.as_slice(), jetton.hash_part.as_slice());
    }

    #[test]
    fn test_swap_body_layout() {
        let pool = addr(POOL);
        let body = swap_body(&pool, 2_000_000_000, 0, 42).unwrap();

        let mut parser = body.parser();
        assert_eq!(parser.load_u32(32).unwrap(), NATIVE_VAULT_SWAP);
        assert_eq!(parser.load_u64(64).unwrap(), 42);
        assert_eq!(parser.load_coins().unwrap(), BigUint::from(2_000_000_000u64));
        assert_eq!(parser.load_address().unwrap(), pool);
        assert!(!parser.load_bit().unwrap()); // kind
        assert_eq!(parser.load_coins().unwrap(), BigUint::from(0u8));
        assert!(!parser.load_bit().unwrap()); // no next step

        assert_eq!(body.references().len(), 1);
        let mut params = body.references()[0].parser();
        assert_eq!(params.load_u32(32).unwrap(), 0);
        assert_eq!(params.load_address().unwrap(), TonAddress::NULL);
        assert_eq!(params.load_address().unwrap(), TonAddress::NULL);
    }

    #[tokio::test]
    async fn test_factory_resolves_pool() {
        let pool = addr(POOL);
        let returned = pool.clone();
        let mut provider = MockTonProvider::new();
        provider
            .expect_run_get_method()
            .withf(|_, method, stack| method == "get_pool_address" && stack.len() == 3)
            .times(1)
            .returning(move |_, _, _| Ok(vec![address_slice(&returned)]));

        let factory = Factory::new(addr(FACTORY), Arc::new(provider));
        let resolved = factory
            .pool_address(PoolType::Volatile, [Asset::Jetton(addr(JETTON)), Asset::Native])
            .await
            .unwrap();
        assert_eq!(resolved, pool);
    }

    #[tokio::test]
    async fn test_pool_not_deployed() {
        let mut provider = MockTonProvider::new();
        provider
            .expect_account_state()
            .returning(|_| Ok(AccountState::Uninitialized));

        let pool = Pool::new(addr(POOL), Arc::new(provider));
        assert_eq!(pool.readiness().await.unwrap(), ReadinessStatus::NotDeployed);
    }

    #[tokio::test]
    async fn test_pool_readiness_depends_on_reserves() {
        for (r0, r1, expected) in [
            (10, 20, ReadinessStatus::Ready),
            (0, 20, ReadinessStatus::NotReady),
            (10, 0, ReadinessStatus::NotReady),
        ] {
            let mut provider = MockTonProvider::new();
            provider
                .expect_account_state()
                .returning(|_| Ok(AccountState::Active));
            provider
                .expect_run_get_method()
                .withf(|_, method, _| method == "get_reserves")
                .returning(move |_, _, _| Ok(vec![StackValue::Num(r0), StackValue::Num(r1)]));

            let pool = Pool::new(addr(POOL), Arc::new(provider));
            assert_eq!(pool.readiness().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_vault_readiness() {
        let mut provider = MockTonProvider::new();
        provider
            .expect_account_state()
            .returning(|_| Ok(AccountState::Frozen));

        let vault = NativeVault::new(addr(POOL), Arc::new(provider));
        assert_eq!(vault.readiness().await.unwrap(), ReadinessStatus::NotDeployed);
    }

    #[tokio::test]
    async fn test_estimate_swap_out() {
        let mut provider = MockTonProvider::new();
        provider
            .expect_run_get_method()
            .withf(|_, method, stack| method == "estimate_swap_out" && stack.len() == 2)
            .returning(|_, _, _| {
                Ok(vec![
                    address_slice(&TonAddress::NULL),
                    StackValue::Num(250_000_000_000),
                    StackValue::Num(3_000_000),
                ])
            });

        let pool = Pool::new(addr(POOL), Arc::new(provider));
        let estimate = pool
            .estimate_swap_out(&Asset::Native, 1_000_000_000)
            .await
            .unwrap();
        assert_eq!(
            estimate,
            SwapEstimate {
                amount_out: 250_000_000_000,
                trade_fee: 3_000_000,
            }
        );
    }

    #[test]
    fn test_price_from_quote() {
        // 1 TON buys 250 jettons with 9 decimals
        assert_eq!(
            price_from_quote(1_000_000_000, 250_000_000_000, 9).unwrap(),
            dec!(0.004)
        );
        // 6 decimals
        assert_eq!(price_from_quote(1_000_000_000, 2_000_000, 6).unwrap(), dec!(0.5));
        assert!(price_from_quote(1_000_000_000, 0, 9).is_err());
    }

    /// Internal message carried by a signed wallet external message
    fn internal_message_of(boc: &[u8]) -> Arc<Cell> {
        let boc = BagOfCells::parse(boc).unwrap();
        let root = boc.single_root().unwrap().clone();
        let signed_body = root.references().last().unwrap().clone();
        signed_body.references()[0].clone()
    }

    #[tokio::test]
    async fn test_send_swap_pays_amount_plus_gas_to_vault() {
        let pool = addr(POOL);
        let vault = addr(VAULT);
        let sent: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));

        let mut provider = MockTonProvider::new();
        let returned_pool = pool.clone();
        provider
            .expect_run_get_method()
            .withf(|_, method, _| method == "get_pool_address")
            .times(1)
            .returning(move |_, _, _| Ok(vec![address_slice(&returned_pool)]));
        let returned_vault = vault.clone();
        provider
            .expect_run_get_method()
            .withf(|_, method, _| method == "get_vault_address")
            .times(1)
            .returning(move |_, _, _| Ok(vec![address_slice(&returned_vault)]));
        provider
            .expect_run_get_method()
            .withf(|_, method, _| method == "seqno")
            .returning(|_, _, _| Ok(vec![StackValue::Num(3)]));
        provider
            .expect_account_state()
            .returning(|_| Ok(AccountState::Active));
        let captured = sent.clone();
        provider.expect_send_boc().times(2).returning(move |boc| {
            captured.lock().unwrap().push(boc);
            Ok(())
        });

        let signer = WalletSigner::from_mnemonic(PHRASE, WalletKind::V4r2).unwrap();
        let venue = DedustVenue::new(
            Arc::new(provider),
            signer,
            addr(FACTORY),
            addr(JETTON),
            PoolType::Volatile,
            Duration::ZERO,
        );

        let receipt = venue.send_swap(dec!(1.5), dec!(0.25)).await.unwrap();
        assert_eq!(receipt.pool, pool.to_base64_url());
        assert_eq!(receipt.seqno, 3);
        assert!(!receipt.confirmed);
        venue.send_swap(dec!(0.5), dec!(0.25)).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        for (boc, (amount, value)) in sent
            .iter()
            .zip([(1_500_000_000u64, 1_750_000_000u64), (500_000_000, 750_000_000)])
        {
            let internal = internal_message_of(boc);
            let mut parser = internal.parser();
            parser.load_u8(4).unwrap(); // flags
            parser.load_address().unwrap(); // src
            assert_eq!(parser.load_address().unwrap(), vault);
            assert_eq!(parser.load_coins().unwrap(), BigUint::from(value));

            let mut body = internal.references()[0].parser();
            assert_eq!(body.load_u32(32).unwrap(), NATIVE_VAULT_SWAP);
            assert_eq!(body.load_u64(64).unwrap(), 0);
            assert_eq!(body.load_coins().unwrap(), BigUint::from(amount));
            assert_eq!(body.load_address().unwrap(), pool);
        }
    }

    #[tokio::test]
    async fn test_send_swap_surfaces_broadcast_failure() {
        let vault = addr(VAULT);
        let mut provider = MockTonProvider::new();
        provider
            .expect_run_get_method()
            .withf(|_, method, _| method == "get_pool_address" || method == "get_vault_address")
            .returning(move |_, _, _| Ok(vec![address_slice(&vault)]));
        provider
            .expect_account_state()
            .returning(|_| Ok(AccountState::Uninitialized));
        provider
            .expect_send_boc()
            .times(1)
            .returning(|_| Err(BotError::Api("sendBoc failed (code 500)".into())));

        let signer = WalletSigner::from_mnemonic(PHRASE, WalletKind::V4r2).unwrap();
        let venue = DedustVenue::new(
            Arc::new(provider),
            signer,
            addr(FACTORY),
            addr(JETTON),
            PoolType::Volatile,
            Duration::ZERO,
        );

        let result = venue.send_swap(dec!(1), dec!(0.25)).await;
        assert!(matches!(result, Err(BotError::Api(_))));
    }
}
