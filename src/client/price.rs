//! Jetton price from the public tonapi rates endpoint

use super::PriceSource;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone)]
pub struct TonApiPriceClient {
    http: Client,
    base_url: String,
    jetton: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatesResponse {
    rates: HashMap<String, TokenRates>,
}

#[derive(Debug, Deserialize)]
struct TokenRates {
    #[serde(default)]
    prices: HashMap<String, Decimal>,
}

impl TonApiPriceClient {
    pub fn new(base_url: &str, jetton: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            jetton: jetton.to_string(),
        })
    }
}

/// Pick the TON price out of a rates response
pub(crate) fn ton_price(resp: &RatesResponse, jetton: &str) -> Result<Decimal> {
    let rates = resp
        .rates
        .get(jetton)
        .or_else(|| resp.rates.values().next())
        .ok_or_else(|| BotError::Api(format!("no rates for {}", jetton)))?;

    rates
        .prices
        .iter()
        .find(|(currency, _)| currency.eq_ignore_ascii_case("ton"))
        .map(|(_, price)| *price)
        .ok_or_else(|| BotError::Api(format!("no TON price for {}", jetton)))
}

#[async_trait]
impl PriceSource for TonApiPriceClient {
    async fn jetton_price_ton(&self) -> Result<Decimal> {
        let url = format!("{}/rates", self.base_url);
        let resp: RatesResponse = self
            .http
            .get(&url)
            .query(&[("tokens", self.jetton.as_str()), ("currencies", "ton")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        ton_price(&resp, &self.jetton)
    }
}
