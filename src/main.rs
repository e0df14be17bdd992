//! ChemDash CLI
//!
//! - `connect`: establish the database connection (primary or fallback) and hold it
//! - `demo`: play the dashboard page headlessly
//! - `config`: print or write the default configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chemdash::config::{generate_default_config, Config, LoggingConfig};
use chemdash::dashboard::analyze::NAME_INPUT_ID;
use chemdash::dashboard::{demo_document, Dashboard, LogRenderer};
use chemdash::database::{ConnectionHandle, DatabaseConnector};

#[derive(Parser)]
#[command(name = "chemdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chemical analysis dashboard and database bootstrap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to the database and hold the connection until Ctrl-C
    Connect,

    /// Play the demo dashboard: counters, one analysis, then reset
    Demo {
        /// Chemical name to submit
        #[arg(long)]
        chemical: Option<String>,
        /// Skip the wall clock and run timers in virtual time
        #[arg(long)]
        virtual_time: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_logging(&config.logging);
    tracing::info!("ChemDash v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Connect => connect(&config).await,
        Commands::Demo {
            chemical,
            virtual_time,
        } => demo(config, chemical, virtual_time).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chemdash={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect(config: &Config) -> anyhow::Result<()> {
    let connector = DatabaseConnector::from_config(&config.database);

    let handle = match establish(&connector).await {
        Ok(handle) => handle,
        Err(code) => std::process::exit(code),
    };

    tracing::info!(
        origin = ?handle.origin(),
        host = handle.host(),
        live = handle.is_live(),
        since = %handle.connected_at(),
        "Holding database connection; press Ctrl-C to exit"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down...");
    drop(handle);
    Ok(())
}

/// Connect, or report the failure and give the process exit code
async fn establish(connector: &DatabaseConnector) -> Result<ConnectionHandle, i32> {
    connector.connect().await.map_err(|e| {
        eprintln!("Fatal: {}", e);
        e.exit_code()
    })
}

async fn demo(config: Config, chemical: Option<String>, virtual_time: bool) -> anyhow::Result<()> {
    let mut renderer = LogRenderer;
    let mut dashboard = Dashboard::load(demo_document(), config.dashboard, Some(&mut renderer))?;

    let fired = play(&mut dashboard, virtual_time).await;
    tracing::info!(ticks = fired, "Counters finished");

    if let Some(name) = chemical {
        dashboard.document_mut().set_value(NAME_INPUT_ID, name);
    }

    match dashboard.submit_analyze() {
        Some(outcome) => tracing::info!(
            session = %outcome.session,
            name = %outcome.name,
            "Analysis submitted"
        ),
        None => tracing::warn!("Analyze form is not accepting submissions"),
    }

    play(&mut dashboard, virtual_time).await;
    tracing::info!(state = ?dashboard.form_state(), "Analysis finished");

    dashboard.click("resetButton");
    tracing::info!(state = ?dashboard.form_state(), "Form reset");

    Ok(())
}

async fn play(dashboard: &mut Dashboard, virtual_time: bool) -> usize {
    if virtual_time {
        dashboard.run_until_idle()
    } else {
        dashboard.run_realtime().await
    }
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => println!("{}", config),
    }

    Ok(())
}
