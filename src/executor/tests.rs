//! Tests for the swap run sequence

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::client::MockPriceSource;
    use crate::types::SkipReason;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn params() -> RunParams {
        RunParams {
            amount_rule: AmountRule::Fixed(dec!(1)),
            gas: dec!(0.25),
            chance: dec!(1),
            max_price: None,
            min_balance: None,
            dry_run: false,
        }
    }

    fn draw() -> Draw {
        Draw {
            amount: dec!(1),
            roll: 0.5,
        }
    }

    fn receipt() -> SwapReceipt {
        SwapReceipt {
            wallet: "EQwallet".to_string(),
            pool: "EQpool".to_string(),
            amount: dec!(1),
            gas: dec!(0.25),
            seqno: 3,
            confirmed: true,
        }
    }

    fn ready_venue() -> MockSwapVenue {
        let mut venue = MockSwapVenue::new();
        venue.expect_wallet_address().returning(|| "EQwallet".to_string());
        venue
            .expect_pool_readiness()
            .returning(|| Ok(ReadinessStatus::Ready));
        venue
            .expect_vault_readiness()
            .returning(|| Ok(ReadinessStatus::Ready));
        venue
    }

    fn runner(venue: MockSwapVenue, params: RunParams) -> SwapRunner {
        SwapRunner::new(Arc::new(venue), Notifier::disabled(), params)
    }

    #[tokio::test]
    async fn test_successful_swap() {
        let mut venue = ready_venue();
        venue
            .expect_send_swap()
            .withf(|amount, gas| *amount == dec!(1) && *gas == dec!(0.25))
            .times(1)
            .returning(|_, _| Ok(receipt()));

        let outcome = runner(venue, params()).run(draw()).await.unwrap();
        assert_eq!(outcome, RunOutcome::Swapped(receipt()));
    }

    #[tokio::test]
    async fn test_chance_skip_touches_nothing() {
        // no expectations: any venue call would panic
        let venue = MockSwapVenue::new();
        let mut p = params();
        p.chance = dec!(10);

        let outcome = runner(venue, p)
            .run(Draw { amount: dec!(1), roll: 0.5 })
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NotThisTime));
    }

    #[tokio::test]
    async fn test_price_above_ceiling_skips() {
        let venue = MockSwapVenue::new();
        let mut price = MockPriceSource::new();
        price.expect_jetton_price_ton().returning(|| Ok(dec!(0.02)));

        let mut p = params();
        p.max_price = Some(dec!(0.01));

        let outcome = runner(venue, p)
            .with_price_source(Arc::new(price))
            .run(draw())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Skipped(SkipReason::PriceTooHigh {
                price: dec!(0.02),
                max: dec!(0.01),
            })
        );
    }

    #[tokio::test]
    async fn test_price_below_ceiling_swaps() {
        let mut venue = ready_venue();
        venue.expect_send_swap().returning(|_, _| Ok(receipt()));
        let mut price = MockPriceSource::new();
        price.expect_jetton_price_ton().returning(|| Ok(dec!(0.005)));

        let mut p = params();
        p.max_price = Some(dec!(0.01));

        let outcome = runner(venue, p)
            .with_price_source(Arc::new(price))
            .run(draw())
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Swapped(_)));
    }

    #[tokio::test]
    async fn test_price_ceiling_without_source_is_config_error() {
        let mut p = params();
        p.max_price = Some(dec!(0.01));

        let result = runner(MockSwapVenue::new(), p).run(draw()).await;
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[tokio::test]
    async fn test_low_balance_skips() {
        let mut venue = MockSwapVenue::new();
        venue.expect_wallet_balance().returning(|| Ok(dec!(1.5)));

        let mut p = params();
        p.min_balance = Some(dec!(0.5));

        let outcome = runner(venue, p).run(draw()).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Skipped(SkipReason::InsufficientBalance {
                balance: dec!(1.5),
                required: dec!(1.75),
            })
        );
    }

    #[tokio::test]
    async fn test_pool_not_ready_is_fatal() {
        let mut venue = MockSwapVenue::new();
        venue
            .expect_pool_readiness()
            .returning(|| Ok(ReadinessStatus::NotDeployed));

        let result = runner(venue, params()).run(draw()).await;
        match result {
            Err(BotError::NotReady(what)) => assert_eq!(what, "Pool (TON, JETTON)"),
            other => panic!("expected NotReady, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_vault_not_ready_is_fatal() {
        let mut venue = MockSwapVenue::new();
        venue
            .expect_pool_readiness()
            .returning(|| Ok(ReadinessStatus::Ready));
        venue
            .expect_vault_readiness()
            .returning(|| Ok(ReadinessStatus::NotReady));

        let result = runner(venue, params()).run(draw()).await;
        assert!(matches!(result, Err(BotError::NotReady(what)) if what == "Vault (TON)"));
    }

    #[tokio::test]
    async fn test_send_failure_is_reported_not_raised() {
        let mut venue = ready_venue();
        venue
            .expect_send_swap()
            .times(1)
            .returning(|_, _| Err(BotError::Api("sendBoc failed".into())));

        let outcome = runner(venue, params()).run(draw()).await.unwrap();
        match outcome {
            RunOutcome::Failed(msg) => assert!(msg.contains("sendBoc failed")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_does_not_send() {
        let venue = ready_venue();
        let mut p = params();
        p.dry_run = true;

        let outcome = runner(venue, p).run(draw()).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::DryRun {
                amount: dec!(1),
                gas: dec!(0.25),
            }
        );
    }

    #[test]
    fn test_draw_respects_range() {
        let mut p = params();
        p.amount_rule = AmountRule::Range {
            min: dec!(0.5),
            max: dec!(1.5),
        };
        let runner = runner(MockSwapVenue::new(), p);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let draw = runner.draw(&mut rng);
            assert!(draw.amount >= dec!(0.5) && draw.amount <= dec!(1.5));
            assert!((0.0..1.0).contains(&draw.roll));
        }
    }
}
