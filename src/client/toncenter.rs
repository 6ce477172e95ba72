//! toncenter v2 HTTP API client
//!
//! Account state, balances, get-methods and message broadcast.

use super::{cell_from_base64, cell_to_base64, StackArg, StackValue, TonProvider};
use crate::error::{BotError, Result};
use crate::types::AccountState;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tonlib_core::TonAddress;
use tracing::debug;

/// toncenter API client
#[derive(Clone)]
pub struct ToncenterClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) ok: bool,
    pub(crate) result: Option<T>,
    pub(crate) error: Option<String>,
    pub(crate) code: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RunGetMethodRequest<'a> {
    address: String,
    method: &'a str,
    stack: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct RunGetMethodResult {
    exit_code: i32,
    stack: Vec<(String, Value)>,
}

#[derive(Debug, Serialize)]
struct SendBocRequest {
    boc: String,
}

impl ToncenterClient {
    /// Create a new toncenter client
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("X-API-Key", key),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, address: &TonAddress) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp: ApiResponse<T> = self
            .with_key(self.http.get(&url))
            .query(&[("address", address.to_base64_url())])
            .send()
            .await?
            .json()
            .await?;

        unwrap_response(endpoint, resp)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp: ApiResponse<T> = self
            .with_key(self.http.post(&url))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        unwrap_response(endpoint, resp)
    }
}

pub(crate) fn unwrap_response<T>(endpoint: &str, resp: ApiResponse<T>) -> Result<T> {
    if !resp.ok {
        return Err(BotError::Api(format!(
            "{} failed (code {}): {}",
            endpoint,
            resp.code.unwrap_or_default(),
            resp.error.unwrap_or_else(|| "unknown error".to_string())
        )));
    }
    resp.result
        .ok_or_else(|| BotError::Api(format!("{} returned no result", endpoint)))
}

/// Parse a numeric stack entry: decimal or `0x` hex, optionally negative
pub(crate) fn parse_stack_num(s: &str) -> Result<i128> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let value = match digits.strip_prefix("0x") {
        Some(hex) => i128::from_str_radix(hex, 16),
        None => digits.parse::<i128>(),
    }
    .map_err(|e| BotError::Api(format!("bad stack number {}: {}", s, e)))?;

    Ok(if negative { -value } else { value })
}

pub(crate) fn parse_stack_entry(kind: &str, value: &Value) -> Result<StackValue> {
    match kind {
        "num" | "int" => {
            let s = value
                .as_str()
                .ok_or_else(|| BotError::Api(format!("number entry is not a string: {}", value)))?;
            Ok(StackValue::Num(parse_stack_num(s)?))
        }
        "cell" | "slice" | "tvm.Cell" | "tvm.Slice" => {
            let b64 = value
                .get("bytes")
                .and_then(Value::as_str)
                .or_else(|| value.as_str())
                .ok_or_else(|| BotError::Api(format!("cell entry has no bytes: {}", value)))?;
            Ok(StackValue::Cell(cell_from_base64(b64)?))
        }
        other => Err(BotError::Api(format!("unsupported stack entry type {}", other))),
    }
}

fn encode_stack_arg(arg: StackArg) -> Result<(String, String)> {
    match arg {
        StackArg::Num(n) => Ok(("num".to_string(), n.to_string())),
        StackArg::Slice(cell) => Ok(("tvm.Slice".to_string(), cell_to_base64(cell)?)),
    }
}

#[async_trait]
impl TonProvider for ToncenterClient {
    async fn account_state(&self, address: &TonAddress) -> Result<AccountState> {
        let state: String = self.get("getAddressState", address).await?;
        match state.as_str() {
            "active" => Ok(AccountState::Active),
            "uninitialized" | "uninit" => Ok(AccountState::Uninitialized),
            "frozen" => Ok(AccountState::Frozen),
            other => Err(BotError::Api(format!("unknown account state {}", other))),
        }
    }

    async fn balance(&self, address: &TonAddress) -> Result<u128> {
        let balance: Value = self.get("getAddressBalance", address).await?;
        let raw = match &balance {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => return Err(BotError::Api(format!("unexpected balance {}", other))),
        };
        raw.parse::<u128>()
            .map_err(|e| BotError::Api(format!("bad balance {}: {}", raw, e)))
    }

    async fn run_get_method(
        &self,
        address: &TonAddress,
        method: &str,
        stack: Vec<StackArg>,
    ) -> Result<Vec<StackValue>> {
        let request = RunGetMethodRequest {
            address: address.to_base64_url(),
            method,
            stack: stack
                .into_iter()
                .map(encode_stack_arg)
                .collect::<Result<Vec<_>>>()?,
        };

        debug!("runGetMethod {} on {}", method, request.address);
        let result: RunGetMethodResult = self.post("runGetMethod", &request).await?;

        if result.exit_code != 0 && result.exit_code != 1 {
            return Err(BotError::Api(format!(
                "{} exited with code {}",
                method, result.exit_code
            )));
        }

        result
            .stack
            .iter()
            .map(|(kind, value)| parse_stack_entry(kind, value))
            .collect()
    }

    async fn send_boc(&self, boc: Vec<u8>) -> Result<()> {
        let request = SendBocRequest {
            boc: STANDARD.encode(boc),
        };
        let _: Value = self.post("sendBoc", &request).await?;
        Ok(())
    }
}
