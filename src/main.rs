mod cli;

use anyhow::Result;
use clap::Parser;
use console::Style;

use cli::{Cli, Command};
use jobboard::board::JobBoard;
use jobboard::config::BoardConfig;
use jobboard::error::BoardError;
use jobboard::hn::{HnClient, Job};
use jobboard::query::{QueryManager, QueryOptions};
use jobboard::ui::{TerminalView, format_job};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "warn,jobboard=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = BoardConfig::load(cli.config.as_deref())?;
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
        config.validate()?;
    }
    let client = config.client()?;

    match cli.command {
        Command::List { pages, all } => list(client, config.batch_size, pages, all).await,
        Command::Show { id } => show(client, id).await,
        Command::Ids => ids(client).await,
    }
}

async fn list(client: HnClient, batch_size: usize, pages: usize, all: bool) -> Result<()> {
    let mut board = JobBoard::new(client, batch_size, TerminalView::new());
    board.view().heading();
    board.start().await;

    if let Some(err) = board.job_ids().state().error {
        return Err(BoardError::JobIds(err).into());
    }

    let mut loaded = 1;
    while board.has_more() && (all || loaded < pages) {
        board.next_page().await;
        loaded += 1;
    }

    if let Some(err) = board.job_details().state().error {
        return Err(BoardError::JobDetails(err).into());
    }

    if board.view().can_load_more() {
        println!();
        println!(
            "{}",
            Style::new().dim().apply_to(format!(
                "{} jobs shown, more available (use --pages {} or --all)",
                board.view().rendered(),
                loaded + 1
            ))
        );
    }
    Ok(())
}

async fn show(client: HnClient, id: u64) -> Result<()> {
    let manager = QueryManager::new(move |id: u64| {
        let client = client.clone();
        async move { client.fetch_job(id).await }
    })
    .with_name("job");

    let options = QueryOptions::new().on_success(|job: &Job| {
        let (title, metadata) = format_job(job);
        println!("{}", Style::new().bold().apply_to(title));
        println!("{metadata}");
    });
    manager.query(options, id).await;

    match manager.state().error {
        Some(err) => Err(BoardError::JobDetails(err).into()),
        None => Ok(()),
    }
}

async fn ids(client: HnClient) -> Result<()> {
    let job_ids = QueryManager::new(move |()| {
        let client = client.clone();
        async move { client.fetch_job_ids().await }
    })
    .with_name("job_ids");

    job_ids.fetch(()).await;

    let state = job_ids.state();
    if let Some(err) = state.error {
        return Err(BoardError::JobIds(err).into());
    }
    for id in state.data.unwrap_or_default() {
        println!("{id}");
    }
    Ok(())
}
