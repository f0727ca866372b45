mod cli;
mod config;
mod display;

use std::io;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use fetcher_engine::{BatchRunner, FetchRequest, ImageFetcher, ReqwestTransport};
use fetcher_logging::fetcher_info;

use crate::cli::Cli;
use crate::display::ConsoleSink;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("image_fetcher error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    fetcher_logging::initialize(
        &cli.log_destination(),
        cli.log_level.into(),
        cli.log_stream(),
    );

    let mut app_config = config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.dir {
        app_config.storage_dir = dir.clone();
    }
    let settings = app_config.to_settings();

    let urls = cli::collect_urls(&cli, io::stdin().lock())?;
    if urls.is_empty() {
        bail!("no URLs provided");
    }

    let transport = ReqwestTransport::new(&settings)
        .map_err(|err| anyhow!("could not build HTTP client: {err}"))?;
    let mut fetcher = ImageFetcher::open(&settings, Box::new(transport))
        .with_context(|| format!("could not open storage directory {:?}", settings.storage_dir))?;
    fetcher_info!(
        "Fetching {} urls into {:?}",
        urls.len(),
        fetcher.storage_dir()
    );

    let requests: Vec<FetchRequest> = urls.into_iter().map(FetchRequest::from).collect();
    let mut runner = BatchRunner::new(&mut fetcher, settings.request_delay);
    let outcomes = if cli.json {
        runner.run(&requests).await
    } else {
        runner
            .run_with_sink(&requests, &mut ConsoleSink::new())
            .await
    };

    display::print_report(&outcomes, cli.json)
}
