//! Error types for the swap bot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Cell error: {0}")]
    Cell(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid amount: {0}")]
    Amount(String),

    #[error("{0} does not exist")]
    NotReady(String),
}

impl From<config::ConfigError> for BotError {
    fn from(e: config::ConfigError) -> Self {
        BotError::Config(e.to_string())
    }
}

/// Maps any `tonlib-core` cell/BoC failure into [`BotError::Cell`].
pub(crate) fn cell_err<E: std::fmt::Display>(e: E) -> BotError {
    BotError::Cell(e.to_string())
}

impl From<tonlib_core::cell::TonCellError> for BotError {
    fn from(e: tonlib_core::cell::TonCellError) -> Self {
        BotError::Cell(e.to_string())
    }
}
