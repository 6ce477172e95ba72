//! Configuration management
//!
//! Settings come from an optional TOML file, overridden by the process
//! environment. A `.env` file is loaded into the environment first, so each
//! wallet/jetton pair can live in its own env file.

use crate::error::{BotError, Result};
use crate::types::{parse_address, to_nano, PoolType};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

/// DeDust factory on mainnet
pub const MAINNET_FACTORY_ADDR: &str = "EQBfBWT7X2BHg9tXAxzhz2aKiNTU1tpt5NsiK0uSDW_YAJ67";

const MNEMONIC_WORDS: usize = 24;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Jetton master to buy
    pub jetton_address: String,
    /// Forward gas attached to the swap (TON)
    #[serde(default = "default_gas_amount")]
    pub gas_amount: Decimal,
    #[serde(default)]
    pub ton_value: Option<Decimal>,
    #[serde(default)]
    pub min_value: Option<Decimal>,
    #[serde(default)]
    pub max_value: Option<Decimal>,
    pub mnemonic: String,
    /// Expected wallet address, compared against the derived one
    #[serde(default)]
    pub address: Option<String>,
    /// The swap runs with probability 1/chance
    #[serde(default = "default_chance")]
    pub chance: Decimal,
    /// Ceiling for the price of one whole jetton, in TON
    #[serde(default)]
    pub max_price: Option<Decimal>,
    /// Balance that must remain after amount + gas leave the wallet
    #[serde(default)]
    pub min_balance: Option<Decimal>,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub price_source: PriceSourceKind,
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
    #[serde(default = "default_toncenter_url")]
    pub toncenter_url: String,
    #[serde(default)]
    pub toncenter_api_key: Option<String>,
    #[serde(default = "default_jetton_decimals")]
    pub jetton_decimals: u32,
    #[serde(default)]
    pub wallet_version: WalletKind,
    #[serde(default = "default_factory_address")]
    pub factory_address: String,
    #[serde(default)]
    pub pool_type: PoolType,
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_gas_amount() -> Decimal {
    dec!(0.25)
}

fn default_chance() -> Decimal {
    Decimal::ONE
}

fn default_price_api_url() -> String {
    "https://tonapi.io/v2".to_string()
}

fn default_toncenter_url() -> String {
    "https://toncenter.com/api/v2".to_string()
}

fn default_jetton_decimals() -> u32 {
    9
}

fn default_factory_address() -> String {
    MAINNET_FACTORY_ADDR.to_string()
}

fn default_confirm_timeout() -> u64 {
    60
}

fn default_http_timeout() -> u64 {
    30
}

/// Where the price gate reads the jetton price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSourceKind {
    /// Public rates API
    #[default]
    Api,
    /// Estimate from the pool itself
    Pool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    V3r2,
    #[default]
    V4r2,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// How the swap amount is chosen on each run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountRule {
    Fixed(Decimal),
    /// Uniform in `[min, max)`
    Range { min: Decimal, max: Decimal },
    /// `min + r * (center - min) * 2`, i.e. symmetric around `center`
    Spread { min: Decimal, center: Decimal },
}

impl AmountRule {
    /// Sample an amount in TON, rounded to nanoton precision
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let r = Decimal::from_f64_retain(rng.random::<f64>()).unwrap_or(Decimal::ZERO);
        let value = match *self {
            AmountRule::Fixed(v) => v,
            AmountRule::Range { min, max } => min + r * (max - min),
            AmountRule::Spread { min, center } => min + r * (center - min) * Decimal::TWO,
        };
        value.round_dp(9)
    }
}

impl Settings {
    /// Load settings: env file into the process environment, then TOML file, then env
    pub fn load(config_path: Option<&Path>, env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    BotError::Config(format!("cannot load {}: {}", path.display(), e))
                })?;
            }
            None => {
                if let Err(e) = dotenvy::dotenv() {
                    if !e.not_found() {
                        return Err(BotError::Config(format!("cannot load .env: {}", e)));
                    }
                }
            }
        }

        let mut builder = config::Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings: Settings = builder
            .add_source(config::Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check everything a run depends on before touching the network
    pub fn validate(&self) -> Result<()> {
        parse_address(&self.jetton_address)?;
        parse_address(&self.factory_address)?;
        if let Some(address) = &self.address {
            parse_address(address)?;
        }

        let words = self.mnemonic.split_whitespace().count();
        if words != MNEMONIC_WORDS {
            return Err(BotError::Config(format!(
                "MNEMONIC must have {} words, got {}",
                MNEMONIC_WORDS, words
            )));
        }

        if self.chance < Decimal::ONE {
            return Err(BotError::Config(format!(
                "CHANCE must be at least 1, got {}",
                self.chance
            )));
        }

        if self.gas_amount <= Decimal::ZERO {
            return Err(BotError::Config("GAS_AMOUNT must be positive".into()));
        }

        if let Some(max_price) = self.max_price {
            if max_price <= Decimal::ZERO {
                return Err(BotError::Config("MAX_PRICE must be positive".into()));
            }
        }

        if self.jetton_decimals > 28 {
            return Err(BotError::Config(format!(
                "JETTON_DECIMALS must be at most 28, got {}",
                self.jetton_decimals
            )));
        }

        if let Some(min_balance) = self.min_balance {
            if min_balance.is_sign_negative() {
                return Err(BotError::Config("MIN_BALANCE must not be negative".into()));
            }
        }

        for (key, value) in [
            ("GAS_AMOUNT", Some(self.gas_amount)),
            ("TON_VALUE", self.ton_value),
            ("MIN_VALUE", self.min_value),
            ("MAX_VALUE", self.max_value),
            ("MIN_BALANCE", self.min_balance),
        ] {
            if let Some(v) = value {
                to_nano(v).map_err(|e| BotError::Config(format!("{}: {}", key, e)))?;
            }
        }

        match self.amount_rule()? {
            AmountRule::Fixed(v) if v <= Decimal::ZERO => {
                Err(BotError::Config("TON_VALUE must be positive".into()))
            }
            AmountRule::Range { min, max } if min <= Decimal::ZERO || max < min => Err(
                BotError::Config(format!("invalid value range [{}, {})", min, max)),
            ),
            AmountRule::Spread { min, center } if min <= Decimal::ZERO || center < min => Err(
                BotError::Config(format!("TON_VALUE {} must not be below MIN_VALUE {}", center, min)),
            ),
            _ => Ok(()),
        }
    }

    /// Resolve MIN_VALUE / MAX_VALUE / TON_VALUE into a sampling rule
    pub fn amount_rule(&self) -> Result<AmountRule> {
        match (self.min_value, self.max_value, self.ton_value) {
            (Some(min), Some(max), _) => Ok(AmountRule::Range { min, max }),
            (Some(min), None, Some(center)) => Ok(AmountRule::Spread { min, center }),
            (Some(_), None, None) => Err(BotError::Config(
                "MIN_VALUE without MAX_VALUE needs TON_VALUE".into(),
            )),
            (None, _, Some(value)) => Ok(AmountRule::Fixed(value)),
            (None, _, None) => Err(BotError::Config(
                "set TON_VALUE or MIN_VALUE/MAX_VALUE".into(),
            )),
        }
    }

    /// Telegram target, only when both token and chat are set
    pub fn telegram(&self) -> Option<TelegramConfig> {
        match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some(TelegramConfig {
                    bot_token: token.clone(),
                    chat_id: chat.clone(),
                })
            }
            _ => None,
        }
    }
}
