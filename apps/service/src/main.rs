mod config;
mod database;
mod error;
mod http;
mod monitoring;
mod notify;
mod pool;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::database::{LibsqlServiceRepository, ServiceRepository};
use crate::monitoring::{CycleRunner, Scheduler, StatusTracker};
use crate::monitoring::prober::HttpProber;
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};

#[derive(Debug, Parser)]
#[command(name = "vigil-service", about = "HTTP(S) uptime monitoring service")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Override the database path from the configuration file
    #[arg(long)]
    database: Option<String>,
    /// Do not start the background sweep (on-demand checks only)
    #[arg(long)]
    no_scheduler: bool,
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_config(cli.config.as_deref())
        .map_err(|err| anyhow!("failed to load configuration: {err:?}"))?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    info!("{config}");

    let pool = pool::connect(&config.database.path).await?;
    {
        let conn = pool.get().await?;
        database::initialize_database(&conn).await?;
    }

    let repository: Arc<dyn ServiceRepository> =
        Arc::new(LibsqlServiceRepository::new_from_pool(pool));
    let prober =
        Arc::new(HttpProber::new(Duration::from_secs(config.monitoring.probe_timeout_seconds))?);
    let tracker = Arc::new(StatusTracker::new(repository.clone()));

    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .or_else(|| config.notifier.telegram_bot_token.clone());
    let notifier: Arc<dyn Notifier> = match token {
        Some(token) => Arc::new(TelegramNotifier::new(&token)),
        None => {
            info!("no telegram bot token configured, transitions will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let runner = Arc::new(CycleRunner::new(repository, prober, tracker, notifier));

    let mut scheduler = Scheduler::new(
        runner.clone(),
        Duration::from_secs(config.monitoring.sweep_interval_seconds),
    );
    if !cli.no_scheduler {
        scheduler.start();
    }

    let state = web::Data::new(http::AppState { runner });
    info!(bind = %config.http.bind, port = config.http.port, "starting http server");
    HttpServer::new(move || App::new().app_data(state.clone()).configure(http::routes))
        .bind((config.http.bind.as_str(), config.http.port))?
        .run()
        .await
        .context("http server terminated")?;

    scheduler.stop();
    Ok(())
}
