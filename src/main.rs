//! TON Swap Bot
//!
//! Buys a jetton with TON on DeDust, gated by chance, price and balance.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use ton_swap_bot::{
    client::{PriceSource, TonApiPriceClient, TonProvider, ToncenterClient},
    config::{PriceSourceKind, Settings},
    dex::{DedustVenue, PoolPriceSource},
    executor::{RunParams, SwapRunner, SwapVenue},
    notify::Notifier,
    types::{parse_address, RunOutcome},
    wallet::WalletSigner,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ton-swap-bot")]
#[command(about = "Swap TON for a jetton on DeDust, maybe")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional TOML config file; environment variables override it
    #[arg(short, long, default_value = "swap.toml")]
    config: PathBuf,

    /// Env file to load instead of ./.env
    #[arg(short, long)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one swap attempt
    Run {
        /// Check everything but do not send the swap
        #[arg(long)]
        dry_run: bool,
    },
    /// Show wallet, pool and price status
    Status,
    /// Send a test Telegram message
    TestNotify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(Some(cli.config.as_path()), cli.env_file.as_deref())?;

    match cli.command {
        Commands::Run { dry_run } => run_swap(settings, dry_run).await,
        Commands::Status => show_status(settings).await,
        Commands::TestNotify => test_notify(settings).await,
    }
}

fn build_notifier(settings: &Settings) -> anyhow::Result<Notifier> {
    match settings.telegram() {
        Some(tg) => Ok(Notifier::new(tg.bot_token, tg.chat_id, settings.http_timeout_secs)?),
        None => {
            tracing::debug!("Telegram not configured, notifications disabled");
            Ok(Notifier::disabled())
        }
    }
}

fn build_venue(settings: &Settings) -> anyhow::Result<Arc<DedustVenue>> {
    let provider: Arc<dyn TonProvider> = Arc::new(ToncenterClient::new(
        &settings.toncenter_url,
        settings.toncenter_api_key.clone(),
        settings.http_timeout_secs,
    )?);

    let signer = WalletSigner::from_mnemonic(&settings.mnemonic, settings.wallet_version)?;
    if let Some(expected) = &settings.address {
        if &parse_address(expected)? != signer.address() {
            tracing::warn!(
                "ADDRESS {} does not match derived wallet {}",
                expected,
                signer.address().to_base64_url()
            );
        }
    }

    Ok(Arc::new(DedustVenue::new(
        provider,
        signer,
        parse_address(&settings.factory_address)?,
        parse_address(&settings.jetton_address)?,
        settings.pool_type,
        Duration::from_secs(settings.confirm_timeout_secs),
    )))
}

fn build_price_source(
    settings: &Settings,
    venue: &Arc<DedustVenue>,
) -> anyhow::Result<Arc<dyn PriceSource>> {
    let source: Arc<dyn PriceSource> = match settings.price_source {
        PriceSourceKind::Api => Arc::new(TonApiPriceClient::new(
            &settings.price_api_url,
            &settings.jetton_address,
            settings.http_timeout_secs,
        )?),
        PriceSourceKind::Pool => Arc::new(PoolPriceSource::new(
            venue.clone(),
            settings.jetton_decimals,
        )),
    };
    Ok(source)
}

async fn run_swap(settings: Settings, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        tracing::warn!("Running in DRY RUN mode - the swap will not be sent");
    }

    let notifier = build_notifier(&settings)?;
    let venue = build_venue(&settings)?;
    let price_source = build_price_source(&settings, &venue)?;
    let params = RunParams::from_settings(&settings, dry_run)?;

    let runner = SwapRunner::new(venue, notifier.clone(), params).with_price_source(price_source);
    let draw = runner.draw(&mut rand::rng());

    match runner.run(draw).await {
        Ok(RunOutcome::Failed(e)) => {
            // reported and notified by the runner; no retry
            tracing::debug!("Run ended with failed swap: {}", e);
            Ok(())
        }
        Ok(outcome) => {
            tracing::debug!("Run outcome: {:?}", outcome);
            Ok(())
        }
        Err(e) => {
            if let Err(notify_err) = notifier.error("Swap run aborted", &e.to_string()).await {
                tracing::warn!("Failed to send error notification: {}", notify_err);
            }
            Err(e.into())
        }
    }
}

async fn show_status(settings: Settings) -> anyhow::Result<()> {
    let venue = build_venue(&settings)?;
    let price_source = build_price_source(&settings, &venue)?;

    println!("Wallet:  {}", venue.wallet_address());
    println!("Balance: {} TON", venue.wallet_balance().await?);
    println!("Seqno:   {}", venue.seqno().await?);

    let pool = venue.pool().await?;
    println!("Pool:    {} ({})", pool.address.to_base64_url(), pool.readiness().await?);
    let vault = venue.vault().await?;
    println!("Vault:   {} ({})", vault.address.to_base64_url(), vault.readiness().await?);

    match price_source.jetton_price_ton().await {
        Ok(price) => println!("Price:   {} TON", price),
        Err(e) => println!("Price:   unavailable ({})", e),
    }
    if let Some(max_price) = settings.max_price {
        println!("Ceiling: {} TON", max_price);
    }

    Ok(())
}

async fn test_notify(settings: Settings) -> anyhow::Result<()> {
    let notifier = build_notifier(&settings)?;
    if !notifier.is_enabled() {
        anyhow::bail!("BOT_TOKEN and CHAT_ID must both be set");
    }

    notifier
        .send("🧪 <b>Test notification</b>\n\nTON swap bot is configured correctly.")
        .await?;
    println!("Test notification sent");
    Ok(())
}
