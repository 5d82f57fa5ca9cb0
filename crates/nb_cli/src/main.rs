use anyhow::Context;
use clap::{Parser, Subcommand};
use nb_bot::{CommandRouter, NotificationScheduler, TelegramBot, TelegramClient};
use nb_core::BatchCache;
use nb_scrapers::{ScrapeIngestor, TechXploreScraper};
use nb_storage::Storage;
use nb_web::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod duration;
mod logging;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrapes tech news and sends it to Telegram subscribers", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "STORAGE", default_value = "memory")]
    storage: String,
    /// Database URL for the sqlite backend (e.g. sqlite://articles.db)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Listing page to scrape
    #[arg(long, env = "SOURCE_URL", default_value = TechXploreScraper::DEFAULT_LISTING_URL)]
    source_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server, the bot and the scheduled notifications
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        telegram_token: String,
        /// How often subscribers get a random article (e.g. 5s, 1m, 1h15m)
        #[arg(long, default_value = "5s")]
        interval: HumanDuration,
    },
    /// Scrape the listing page once
    Scrape {
        /// Also store the scraped articles
        #[arg(long)]
        save: bool,
    },
    /// Send one round of notifications
    Notify {
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        telegram_token: String,
    },
}

async fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    nb_storage::create_storage(&cli.storage, cli.database_url.as_deref())
        .await
        .with_context(|| format!("Failed to open {} storage", cli.storage))
}

fn ingestor(cli: &Cli, storage: &Storage) -> anyhow::Result<ScrapeIngestor> {
    let scraper = TechXploreScraper::with_listing_url(&cli.source_url)?;
    Ok(ScrapeIngestor::new(
        Arc::new(scraper),
        storage.articles.clone(),
        Arc::new(BatchCache::new()),
    ))
}

async fn serve(cli: &Cli, port: u16, token: &str, interval: HumanDuration) -> anyhow::Result<()> {
    let storage = open_storage(cli).await?;
    let telegram = Arc::new(TelegramClient::new(token)?);

    let router = CommandRouter::new(storage.articles.clone(), storage.subscribers.clone());
    let bot = TelegramBot::new(telegram.clone(), router);
    let scheduler = NotificationScheduler::new(
        storage.articles.clone(),
        storage.subscribers.clone(),
        telegram,
    )
    .with_interval(interval.0);

    let state = AppState {
        ingestor: Arc::new(ingestor(cli, &storage)?),
        articles: storage.articles.clone(),
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tokio::select! {
        result = nb_web::serve(state, addr) => result.context("HTTP server stopped")?,
        _ = bot.run() => {}
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => info!("👋 Shutting down"),
    }
    Ok(())
}

async fn scrape(cli: &Cli, save: bool) -> anyhow::Result<()> {
    let storage = open_storage(cli).await?;
    let ingestor = ingestor(cli, &storage)?;

    let articles = if save {
        ingestor.refresh().await?;
        ingestor.batch().snapshot().await.to_vec()
    } else {
        ingestor.scrape().await?
    };

    for article in &articles {
        info!("- {} ({})", article.title, article.link);
    }
    info!("✅ Found {} articles", articles.len());
    Ok(())
}

async fn notify(cli: &Cli, token: &str) -> anyhow::Result<()> {
    let storage = open_storage(cli).await?;
    let scheduler = NotificationScheduler::new(
        storage.articles,
        storage.subscribers,
        Arc::new(TelegramClient::new(token)?),
    );
    let report = scheduler.tick().await?;
    info!(
        "✅ Notified {} of {} subscribers",
        report.delivered, report.subscribers
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve {
            port,
            telegram_token,
            interval,
        } => serve(&cli, *port, telegram_token, *interval).await,
        Commands::Scrape { save } => scrape(&cli, *save).await,
        Commands::Notify { telegram_token } => notify(&cli, telegram_token).await,
    }
}
