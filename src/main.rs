use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kv_dashboard::commands::{parse_command, UserCommand, HELP};
use kv_dashboard::models::{DashboardState, StatusKind};
use kv_dashboard::{trigger, view, Config, Dashboard, DashboardError, KvBackend, KvClient};

#[derive(Debug, Parser)]
#[command(
    name = "kv-dashboard",
    version,
    about = "Live status dashboard over a blocking-query key/value API"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the dashboard API, overrides the config file
    #[arg(long)]
    api_url: Option<String>,

    /// Category to open first
    #[arg(long)]
    category: Option<String>,

    /// Only show items with this status
    #[arg(long)]
    status: Option<StatusKind>,

    /// Only show items whose node contains this text
    #[arg(long)]
    node: Option<String>,

    /// Shell command run with the item JSON on stdin when a category's status changes
    #[arg(long)]
    trigger: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match run(Cli::parse()).await {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "Dashboard exited with an error");
            1
        }
    };
    // A pending stdin read holds a blocking thread that runtime shutdown would wait on.
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), DashboardError> {
    let mut config = Config::load(cli.config.as_deref()).await;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if cli.trigger.is_some() {
        config.trigger = cli.trigger;
    }

    let backend: Arc<dyn KvBackend> = Arc::new(KvClient::new(&config)?);
    let (dashboard, engine_task) =
        Dashboard::spawn(backend.clone(), config.timing(), cli.category);
    if cli.status.is_some() {
        dashboard.set_status_filter(cli.status).await?;
    }
    if cli.node.is_some() {
        dashboard.set_node_filter(cli.node).await?;
    }

    let shutdown = CancellationToken::new();
    let trigger_task = config.trigger.clone().map(|command| {
        tokio::spawn(trigger::watch_for_trigger(
            backend.clone(),
            command,
            config.timing(),
            shutdown.clone(),
        ))
    });

    let printer = tokio::spawn(print_snapshots(dashboard.subscribe(), shutdown.clone()));
    load_categories(&dashboard).await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if !handle_line(&dashboard, &line).await? {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!(error = ?err, "Failed to read stdin, ignoring further input");
                    stdin_open = false;
                }
            },
        }
    }

    shutdown.cancel();
    // The engine may already be gone; nothing left to stop then.
    let _ = dashboard.shutdown().await;
    if let Err(err) = engine_task.await {
        warn!(error = ?err, "Sync engine task failed");
    }
    if let Some(task) = trigger_task {
        let _ = task.await;
    }
    let _ = printer.await;
    Ok(())
}

/// Apply one stdin line. Returns `false` when the user asked to quit.
async fn handle_line(dashboard: &Dashboard, line: &str) -> Result<bool, DashboardError> {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(true),
        Err(err) => {
            println!("{err}\n{HELP}");
            return Ok(true);
        }
    };

    match command {
        UserCommand::SelectCategory(category) => dashboard.select_category(category).await?,
        UserCommand::StatusFilter(status) => dashboard.set_status_filter(status).await?,
        UserCommand::NodeFilter(node) => dashboard.set_node_filter(node).await?,
        UserCommand::Reload => load_categories(dashboard).await,
        UserCommand::List => {
            let snapshot = dashboard.snapshot();
            println!("categories: {}", snapshot.categories.join(" "));
        }
        UserCommand::Quit => return Ok(false),
    }
    Ok(true)
}

async fn load_categories(dashboard: &Dashboard) {
    if let Err(err) = dashboard.load_categories().await {
        error!(error = %err, "Could not load categories, type `reload` to retry");
    }
}

/// Print the rendered view whenever a published snapshot changes what is shown.
async fn print_snapshots(
    mut updates: watch::Receiver<Arc<DashboardState>>,
    shutdown: CancellationToken,
) {
    let mut last_rendered: Vec<String> = Vec::new();
    loop {
        let rendered = view::render(&updates.borrow_and_update(), Utc::now());
        if rendered != last_rendered {
            println!();
            for line in &rendered {
                println!("{line}");
            }
            last_rendered = rendered;
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
