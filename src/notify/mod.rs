//! Telegram notifications
//!
//! Sends HTML-formatted messages to a single chat. A disabled notifier
//! accepts every call and does nothing.


use crate::error::{BotError, Result};
use crate::types::SwapReceipt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct Notifier {
    http: Client,
    api_url: String,
    target: Option<Target>,
}

#[derive(Clone)]
struct Target {
    bot_token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String, timeout_secs: u64) -> Result<Self> {
        Self::with_api_url(TELEGRAM_API, bot_token, chat_id, timeout_secs)
    }

    pub(crate) fn with_api_url(
        api_url: &str,
        bot_token: String,
        chat_id: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            target: Some(Target { bot_token, chat_id }),
        })
    }

    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            api_url: TELEGRAM_API.to_string(),
            target: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Send a raw HTML message
    pub async fn send(&self, text: &str) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, target.bot_token);
        let request = SendMessageRequest {
            chat_id: &target.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let resp: SendMessageResponse = self.http.post(&url).json(&request).send().await?.json().await?;
        if !resp.ok {
            return Err(BotError::Api(format!(
                "Telegram: {}",
                resp.description.unwrap_or_else(|| "sendMessage failed".to_string())
            )));
        }
        Ok(())
    }

    pub async fn swap_success(&self, receipt: &SwapReceipt) -> Result<()> {
        self.send(&format_swap_success(receipt)).await
    }

    pub async fn swap_failed(&self, wallet: &str, error: &str) -> Result<()> {
        let text = format!(
            "❌ <b>Swap failed</b>\n\nWallet: <code>{}</code>\nError: {}",
            wallet,
            escape_html(error)
        );
        self.send(&text).await
    }

    pub async fn error(&self, context: &str, error: &str) -> Result<()> {
        let text = format!("⚠️ <b>{}</b>\n\n{}", escape_html(context), escape_html(error));
        self.send(&text).await
    }
}

pub(crate) fn format_swap_success(receipt: &SwapReceipt) -> String {
    let status = if receipt.confirmed { "confirmed" } else { "sent" };
    format!(
        "✅ <b>Swap {}</b>\n\n\
        Wallet: <code>{}</code>\n\
        Amount: <code>{}</code> TON\n\
        Gas: <code>{}</code> TON\n\
        Pool: <code>{}</code>\n\
        Seqno: {}",
        status, receipt.wallet, receipt.amount, receipt.gas, receipt.pool, receipt.seqno
    )
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
