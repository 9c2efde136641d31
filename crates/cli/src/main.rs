//! Command Line Interface for the launch pool engine.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use launchpad_api::{ApiServer, ServerConfig};
use launchpad_data::PgPoolStore;
use launchpad_domain::value_objects::Amount;
use launchpad_domain::{CurveState, LaunchParams, MigrationState, QuoteEngine, TradeDirection};
use launchpad_execution::prelude::*;
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Bonding-curve launch pool engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a trade against a curve at a given quote reserve
    Quote {
        /// buy or sell
        #[arg(short, long, default_value = "buy")]
        direction: TradeDirection,

        /// Input amount in smallest units
        #[arg(short, long)]
        amount: u64,

        /// Quote already raised by earlier buys, in smallest units
        #[arg(long, default_value_t = 0)]
        raised: u64,
    },
    /// Buy in equal steps on a fresh in-memory pool and migrate it
    Simulate {
        /// Number of buys
        #[arg(short, long, default_value_t = 10)]
        steps: u32,

        /// Quote spent per buy, in smallest units
        #[arg(short, long, default_value_t = 500_000_000_000)]
        amount: u64,
    },
    /// Run the HTTP API and the migration worker
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ExecutorConfig::from_env();

    match cli.command {
        Commands::Quote {
            direction,
            amount,
            raised,
        } => quote(&config.launch, direction, amount, raised),
        Commands::Simulate { steps, amount } => simulate(config, steps, amount).await,
        Commands::Serve => serve(config).await,
    }
}

fn units(raw: u64, decimals: u8) -> String {
    Amount::new(raw, decimals).to_decimal().normalize().to_string()
}

fn quote(params: &LaunchParams, direction: TradeDirection, amount: u64, raised: u64) -> Result<()> {
    let mut curve = CurveState::launch(params);
    if raised > 0 {
        let opening = QuoteEngine::quote(&curve, TradeDirection::Buy, raised)
            .context("raised amount cannot be bought on this curve")?;
        curve.apply_buy(opening.amount_in, opening.amount_out)?;
    }

    let quote = QuoteEngine::quote(&curve, direction, amount)?;
    let decimals = params.decimals;
    println!(
        "Curve:  {} raised of {} target ({})",
        units(curve.quote_balance, decimals),
        units(curve.target_quote_liquidity, decimals),
        curve.migration_state()
    );
    println!(
        "{direction}:    {} in -> {} out",
        units(quote.amount_in, decimals),
        units(quote.amount_out, decimals)
    );
    println!("Impact: {} bps", quote.price_impact_bps);
    Ok(())
}

async fn simulate(config: ExecutorConfig, steps: u32, amount: u64) -> Result<()> {
    let decimals = config.launch.decimals;
    let executor = TradeExecutor::new(
        Arc::new(InMemoryPoolStore::new()),
        Arc::new(SimulatedHandoff::new("simulated-dex")),
        config,
    );
    let pool = executor.launch_pool("MEME", "QUOTE", None).await?;
    println!("Launched pool {}", pool.id);
    println!(
        "{:>4} | {:>20} | {:>20} | {:>12} | {:<10}",
        "#", "Coin out", "Raised", "Progress %", "State"
    );
    println!("{}", "-".repeat(78));

    for step in 0..steps {
        let trade = match executor
            .execute_trade(TradeRequest {
                pool_id: pool.id,
                direction: TradeDirection::Buy,
                amount_in: amount,
                min_amount_out: 0,
                trader: format!("trader-{step}"),
            })
            .await
        {
            Ok(trade) => trade,
            Err(e) => {
                println!("Stopped at step {step}: {e}");
                break;
            }
        };
        let current = executor.get_pool(pool.id).await?;
        println!(
            "{:>4} | {:>20} | {:>20} | {:>12} | {:<10}",
            trade.sequence,
            units(trade.coin_amount, decimals),
            units(current.curve.quote_balance, decimals),
            current.curve.bonding_curve_progress().0.round_dp(2),
            current.state()
        );
        if current.can_migrate() {
            break;
        }
    }

    let status = executor.get_migration_status(pool.id).await?;
    if status.state != MigrationState::Migratable {
        bail!("pool did not reach its migration target; raise --steps or --amount");
    }
    let ack = executor.migrate(pool.id).await?;
    println!();
    println!("Migrated to {}", ack.external_ref);
    println!("  coin:  {}", units(ack.coin_amount, decimals));
    println!("  quote: {}", units(ack.quote_amount, decimals));
    Ok(())
}

async fn serve(config: ExecutorConfig) -> Result<()> {
    let handoff: Arc<dyn LiquidityHandoff> = Arc::new(SimulatedHandoff::new(
        env::var("LAUNCHPAD_HANDOFF_VENUE").unwrap_or_else(|_| "simulated".to_string()),
    ));

    let executor = match env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PgPoolStore::connect(&url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            TradeExecutor::restore(Arc::new(store), handoff, config).await?
        }
        Err(_) => {
            info!("DATABASE_URL not set, pools are kept in memory only");
            TradeExecutor::new(Arc::new(InMemoryPoolStore::new()), handoff, config)
        }
    };

    let worker = Arc::new(MigrationWorker::new(executor.clone()));
    let sweeper = worker.clone();
    let sweep_task = tokio::spawn(async move { sweeper.start().await });

    let result = ApiServer::new(ServerConfig::from_env(), executor).run().await;
    worker.stop();
    sweep_task.abort();
    result.context("API server failed")
}
