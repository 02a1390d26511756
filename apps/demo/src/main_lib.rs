use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use breadbox_domain::{
    apply_display_order, Account, Currency, HubConfig, Transfer, TransferDirection,
    TransferState, WalletManagerState,
};
use breadbox_hub::{BreadBox, EnabledWalletTracker};
use breadbox_memory_runtime::{InMemorySystem, InMemorySystemFactory, InMemoryWalletProvider};
use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use rust_decimal_macros::dec;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FORMAT_ENV: &str = "BREADBOX_LOG_FORMAT";
const ACCOUNT_ENV: &str = "BREADBOX_DEMO_ACCOUNT";
const STEP: Duration = Duration::from_millis(400);

pub fn init_tracing() {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn btc(is_mainnet: bool) -> Currency {
    let network = if is_mainnet { "mainnet" } else { "testnet" };
    Currency::new(format!("bitcoin-{network}:__native__"), "btc", "Bitcoin", 8)
}

fn eth(is_mainnet: bool) -> Currency {
    let network = if is_mainnet { "mainnet" } else { "ropsten" };
    Currency::new(format!("ethereum-{network}:__native__"), "eth", "Ethereum", 18)
}

pub struct DemoState {
    hub: BreadBox,
    factory: Arc<InMemorySystemFactory>,
    provider: Arc<InMemoryWalletProvider>,
    account: Account,
    currencies: Vec<Currency>,
}

impl DemoState {
    pub fn build(config: HubConfig) -> anyhow::Result<Self> {
        let currencies = vec![btc(config.is_mainnet), eth(config.is_mainnet)];
        let uid = std::env::var(ACCOUNT_ENV).unwrap_or_else(|_| "demo-account".to_string());
        let account = Account::new(uid.clone(), Utc::now(), uid.into_bytes());

        let factory = Arc::new(InMemorySystemFactory::with_wallets(vec![currencies[0].clone()]));
        let provider = Arc::new(InMemoryWalletProvider::new([currencies[0].id.clone()]));
        let tracker = Arc::new(EnabledWalletTracker::new(provider.clone()));
        let hub = BreadBox::new(
            config,
            factory.clone(),
            provider.clone(),
            tracker,
            Handle::current(),
        );

        Ok(Self {
            hub,
            factory,
            provider,
            account,
            currencies,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        self.hub.open(&self.account).context("Failed to open BreadBox")?;
        let system = self
            .factory
            .last_system()
            .context("Wallet system was not created")?;

        let watchers = self.spawn_watchers();
        self.simulate(&system).await?;

        self.hub.close().context("Failed to close BreadBox")?;
        tokio::time::sleep(STEP).await;
        for watcher in watchers {
            watcher.abort();
        }
        tracing::info!("Demo finished");
        Ok(())
    }

    fn spawn_watchers(&self) -> Vec<JoinHandle<()>> {
        let btc = self.currencies[0].code.clone();
        let eth = self.currencies[1].code.clone();
        let provider = self.provider.clone();
        vec![
            watch("currency_codes", self.hub.currency_codes()),
            watch(
                "tracked_wallets",
                self.hub.wallets(true).map(move |wallets| {
                    // Enabled ids double as the display order.
                    apply_display_order(wallets, &provider.enabled())
                        .into_iter()
                        .map(|wallet| format!("{}={}", wallet.currency.code, wallet.balance))
                        .collect::<Vec<_>>()
                }),
            ),
            watch("btc_sync_state", self.hub.wallet_sync_state(&btc)),
            watch("eth_sync_state", self.hub.wallet_sync_state(&eth)),
            watch(
                "btc_transfers",
                self.hub
                    .wallet_transfers(&btc)
                    .map(|transfers| transfers.len()),
            ),
            watch(
                "btc_transfer_updates",
                self.hub
                    .wallet_transfer_updates(&btc)
                    .map(|transfer| format!("{} {:?}", transfer.hash, transfer.state)),
            ),
        ]
    }

    async fn simulate(&self, system: &InMemorySystem) -> anyhow::Result<()> {
        let btc = &self.currencies[0];
        let eth = &self.currencies[1];

        tracing::info!("Syncing {}", btc.code);
        system.set_manager_state(&btc.code, WalletManagerState::Syncing)?;
        for percent in [25.0, 50.0, 75.0] {
            tokio::time::sleep(STEP).await;
            system.sync_progress(&btc.code, percent, Some(Utc::now()))?;
        }
        tokio::time::sleep(STEP).await;
        system.set_manager_state(&btc.code, WalletManagerState::Connected)?;
        system.update_balance(&btc.code, dec!(0.5))?;

        tracing::info!("Receiving and sending {}", btc.code);
        tokio::time::sleep(STEP).await;
        system.add_transfer(
            &btc.code,
            Transfer::new("0xfeed", dec!(0.5), TransferDirection::Received),
        )?;
        tokio::time::sleep(STEP).await;
        system.submit_transfer(
            &btc.code,
            Transfer::new("0xbeef", dec!(0.1), TransferDirection::Sent).with_fee(dec!(0.0002)),
        )?;
        tokio::time::sleep(STEP).await;
        system.change_transfer(&btc.code, "0xbeef", TransferState::Included { block_height: 700_001 })?;

        tracing::info!("Enabling {}", eth.code);
        tokio::time::sleep(STEP).await;
        system.add_wallet(eth.clone());
        self.provider.enable(&eth.id);
        tokio::time::sleep(STEP).await;
        system.sync_progress(&eth.code, 45.0, None)?;

        tokio::time::sleep(STEP).await;
        Ok(())
    }
}

/// Logs every emission of `stream` under `label` until it ends.
fn watch<S, T>(label: &'static str, stream: S) -> JoinHandle<()>
where
    S: futures::Stream<Item = T> + Send + 'static,
    T: std::fmt::Debug + Send + 'static,
{
    let mut stream: BoxStream<'static, T> = stream.boxed();
    tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            tracing::info!(stream = label, "{:?}", item);
        }
        tracing::debug!(stream = label, "Stream ended");
    })
}
