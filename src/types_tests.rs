//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_nano() {
        assert_eq!(to_nano(dec!(1)).unwrap(), 1_000_000_000);
        assert_eq!(to_nano(dec!(0.25)).unwrap(), 250_000_000);
        assert_eq!(to_nano(dec!(0.000000001)).unwrap(), 1);
        assert_eq!(to_nano(dec!(0)).unwrap(), 0);
    }

    #[test]
    fn test_to_nano_rounds_sub_nanoton() {
        assert_eq!(to_nano(dec!(0.0000000014)).unwrap(), 1);
        assert_eq!(to_nano(dec!(0.0000000016)).unwrap(), 2);
    }

    #[test]
    fn test_to_nano_rejects_overflow() {
        assert!(matches!(
            to_nano(dec!(100000000000000000000)),
            Err(crate::error::BotError::Amount(_))
        ));
        assert!(to_nano(Decimal::MAX).is_err());
    }

    #[test]
    fn test_to_nano_rejects_negative() {
        assert!(to_nano(dec!(-1)).is_err());
    }

    #[test]
    fn test_from_nano() {
        assert_eq!(from_nano(1_500_000_000), dec!(1.5));
        assert_eq!(from_nano(1), dec!(0.000000001));
        assert_eq!(from_nano(0), dec!(0));
    }

    #[test]
    fn test_parse_address_forms() {
        let raw = "0:5f0564fb5f604783db57031ce1cf668a88d4d4d6da6de4db222b4b920d6fd800";
        let addr = parse_address(raw).unwrap();
        assert_eq!(addr.workchain, 0);
        // padded input is accepted
        assert_eq!(parse_address(&format!("  {}  ", raw)).unwrap(), addr);
        // friendly form round-trips
        assert_eq!(parse_address(&addr.to_base64_url()).unwrap(), addr);
    }

    #[test]
    fn test_parse_address_invalid() {
        match parse_address("not-an-address") {
            Err(crate::error::BotError::InvalidAddress { address, .. }) => {
                assert_eq!(address, "not-an-address")
            }
            other => panic!("expected InvalidAddress, got ok={}", other.is_ok()),
        }
    }

    #[test]
    fn test_readiness() {
        assert!(ReadinessStatus::Ready.is_ready());
        assert!(!ReadinessStatus::NotReady.is_ready());
        assert!(!ReadinessStatus::NotDeployed.is_ready());
        assert_eq!(ReadinessStatus::NotDeployed.to_string(), "not deployed");
    }

    #[test]
    fn test_pool_type_codes() {
        assert_eq!(PoolType::Volatile.code(), 0);
        assert_eq!(PoolType::Stable.code(), 1);
        assert_eq!(PoolType::default(), PoolType::Volatile);
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(SkipReason::NotThisTime.to_string(), "Not this time");
        let reason = SkipReason::PriceTooHigh {
            price: dec!(0.02),
            max: dec!(0.01),
        };
        assert_eq!(
            reason.to_string(),
            "Price 0.02 TON is above the ceiling of 0.01 TON"
        );
    }
}
