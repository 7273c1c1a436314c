use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use etn_dashboard::{Dashboard, RefreshReport};
use etn_electroneum::{ChainClient, LocalKeyProvider, RpcWalletProvider};
use etn_error::DashboardError;
use etn_rates::PriceHistoryFetcher;
use etn_traits::{parse_address, WalletProvider, ETN_SYMBOL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
use config::{DashboardConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(
    name = "etn-dashboard",
    about = "Electroneum wallet dashboard",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect (or track an address read-only), refresh once and print the dashboard
    Show {
        #[arg(long)]
        address: Option<String>,
        /// Print the view state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh every INTERVAL seconds until Ctrl-C
    Watch {
        #[arg(long, default_value = "30")]
        interval: u64,
        #[arg(long)]
        address: Option<String>,
    },
    /// Connect and submit an ETN transfer
    Send {
        #[arg(long)]
        to: String,
        /// Amount in ETN, e.g. 2.5
        #[arg(long)]
        amount: String,
    },
    /// Print the balance of an address
    Balance { address: String },
    /// Print the node's current gas price
    GasPrice,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let args = Args::parse();
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = args.command
    {
        return init_config(&args.config, force);
    }
    let config = DashboardConfig::load(&args.config).context("failed to load configuration")?;

    match args.command {
        Commands::Show { address, json } => show(&config, address.as_deref(), json).await,
        Commands::Watch { interval, address } => watch(&config, address.as_deref(), interval).await,
        Commands::Send { to, amount } => send(&config, &to, &amount).await,
        Commands::Balance { address } => balance(&config, &address).await,
        Commands::GasPrice => gas_price(&config).await,
        Commands::Config { .. } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_wallet(config: &DashboardConfig) -> Result<Arc<dyn WalletProvider>> {
    let chain_id = config.network.chain_id;
    let wallet: Arc<dyn WalletProvider> = if let Some(key) = &config.wallet.private_key {
        Arc::new(LocalKeyProvider::from_private_key(key, &config.network.rpc_url, chain_id)?)
    } else if let Some(url) = &config.wallet.rpc_url {
        Arc::new(RpcWalletProvider::new(url, chain_id)?)
    } else {
        Arc::new(RpcWalletProvider::unconfigured(chain_id))
    };
    tracing::debug!(provider = wallet.name(), "Wallet provider selected");
    Ok(wallet)
}

fn build_chain(config: &DashboardConfig) -> Result<Arc<ChainClient>> {
    let chain = ChainClient::with_provider_config(config.network(), config.provider_config())?;
    Ok(Arc::new(chain))
}

fn build_dashboard(config: &DashboardConfig) -> Result<Dashboard> {
    let chain = build_chain(config)?;
    let prices = Arc::new(PriceHistoryFetcher::with_timeout(
        &config.price.url,
        config.price.timeout_secs,
    )?);
    let wallet = build_wallet(config)?;
    Ok(Dashboard::new(chain, prices, wallet).with_scan_limit(config.scan.limit))
}

/// Connects the wallet, or tracks `address` read-only when given.
async fn open(dashboard: &Dashboard, address: Option<&str>) -> Result<RefreshReport> {
    let report = match address {
        Some(address) => dashboard.track(parse_address(address)?).await,
        None => dashboard.connect().await,
    };
    report.map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))
}

/// Prints failed sections. In watch mode retryable failures mention the
/// next refresh.
fn print_failures(report: &RefreshReport, next_refresh_secs: Option<u64>) {
    for (section, error) in report.failures() {
        match next_refresh_secs {
            Some(secs) if error.is_retryable() => eprintln!(
                "warning: {section} not updated: {} (next refresh in {secs}s)",
                error.user_message()
            ),
            _ => eprintln!("warning: {section} not updated: {}", error.user_message()),
        }
    }
}

async fn show(config: &DashboardConfig, address: Option<&str>, json: bool) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    let report = open(&dashboard, address).await?;
    print_failures(&report, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard.state().await)?);
    } else {
        print!("{}", dashboard.render().await);
    }
    Ok(())
}

async fn watch(config: &DashboardConfig, address: Option<&str>, interval: u64) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    let interval = interval.max(1);
    let report = open(&dashboard, address).await?;
    print_failures(&report, Some(interval));
    print!("{}", dashboard.render().await);

    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                dashboard.disconnect().await;
                return Ok(());
            }
            _ = ticker.tick() => {
                let report = dashboard.refresh().await?;
                if report.is_stale() {
                    continue;
                }
                if !report.is_complete() {
                    print_failures(&report, Some(interval));
                }
                println!();
                print!("{}", dashboard.render().await);
            }
        }
    }
}

async fn send(config: &DashboardConfig, to: &str, amount: &str) -> Result<()> {
    let dashboard = build_dashboard(config)?;
    open(&dashboard, None).await?;

    match dashboard.send(to, amount).await {
        Ok(hash) => {
            println!("{hash}");
            println!("{}", config.network().explorer_tx_url(hash.as_str()));
            Ok(())
        }
        Err(e @ (DashboardError::InvalidAddress { .. } | DashboardError::InvalidAmount(_))) => {
            Err(e.into())
        }
        Err(e) => Err(anyhow::anyhow!("{} ({e})", e.user_message())),
    }
}

async fn balance(config: &DashboardConfig, address: &str) -> Result<()> {
    let address = parse_address(address)?;
    let chain = build_chain(config)?;
    let balance = chain.get_balance(address).await?;
    println!("{} {ETN_SYMBOL}", balance.to_decimal_string());
    Ok(())
}

async fn gas_price(config: &DashboardConfig) -> Result<()> {
    let price = build_chain(config)?.gas_price().await?;
    println!("{} (base units)", price.base_units());
    Ok(())
}

fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    DashboardConfig::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
