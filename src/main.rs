use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use floorbook::client::{LooksRareClient, ReservoirClient};
use floorbook::config::Config;
use floorbook::marketplace;
use floorbook::registry::ProjectRegistry;
use floorbook::store::Store;
use floorbook::types::DataType;
use floorbook::{ingest, report};

#[derive(Parser, Debug)]
#[command(
    name = "floorbook",
    version,
    about = "NFT order-book collector (asks, bids, trades)"
)]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: String,
    /// One of: asks, ask_distribution, bids, trades (aliases accepted).
    #[arg(long, alias = "data_type")]
    data_type: String,
    /// Project display name from the config registry.
    #[arg(long)]
    project: String,
    /// Comma-separated marketplace list (opensea, looksrare, x2y2).
    #[arg(long, default_value = "opensea,looksrare,x2y2")]
    marketplaces: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = Config::load(&args.config).context("load config")?;

    let data_type = DataType::parse(&args.data_type)?;
    let targets = marketplace::parse_target_set(&args.marketplaces)?;
    anyhow::ensure!(!targets.is_empty(), "no target marketplaces given");

    let registry = ProjectRegistry::from_entries(&cfg.registry).context("build registry")?;
    let contract = registry.contract_for_project(&args.project)?.to_string();
    info!(
        project = %args.project,
        %contract,
        data_type = data_type.as_str(),
        "fetching data"
    );

    let store = Store::open(&cfg.run.db_path).await.context("open store")?;
    let reservoir = ReservoirClient::from_config(&cfg).context("reservoir client")?;

    match data_type {
        DataType::Asks => {
            let run = ingest::run_asks(&cfg, &reservoir, &contract, &targets).await?;
            report::print_bucket_table(&run.buckets, run.min_price, run.max_price);
            store
                .insert_asks(&run.accepted)
                .await
                .context("writing ask data failed")?;
        }
        DataType::AskDistribution => {
            let run = ingest::run_asks(&cfg, &reservoir, &contract, &targets).await?;
            let counts = report::marketplace_counts(&run.accepted);
            report::print_marketplace_counts(&counts);
            report::print_bar_chart(&args.project, &counts);
            store
                .insert_asks(&run.accepted)
                .await
                .context("writing ask data failed")?;
        }
        DataType::Bids => {
            let looksrare = LooksRareClient::from_config(&cfg).context("looksrare client")?;
            let run = ingest::run_bids(&cfg, &looksrare, &registry, &contract).await?;
            store
                .insert_bids(&run.accepted)
                .await
                .context("writing bid data failed")?;
        }
        DataType::Trades => {
            let run = ingest::run_trades(&cfg, &reservoir, &registry, &contract, &targets).await?;
            report::print_trades(&run.accepted);
            store
                .insert_trades(&run.accepted)
                .await
                .context("writing trade data failed")?;
        }
    }

    info!("data parsing complete");
    Ok(())
}
