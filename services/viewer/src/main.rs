//! GFS forecast panel viewer.
//!
//! `viewer serve` runs the web UI; `viewer render` draws one panel to a file.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use viewer::config::{SourceKind, ViewerConfig};
use viewer::request::PanelQuery;
use viewer::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "GFS forecast panel viewer")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "config/viewer.yaml", env = "VIEWER_CONFIG")]
    config: PathBuf,

    /// Data source, overriding the config file
    #[arg(long, global = true, value_enum, env = "VIEWER_SOURCE")]
    source: Option<SourceKind>,

    /// Log level
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI
    Serve {
        /// Listen address, overriding the config file
        #[arg(short, long, env = "VIEWER_LISTEN_ADDR")]
        listen: Option<String>,

        /// Number of tokio worker threads (default: number of CPU cores)
        #[arg(long)]
        worker_threads: Option<usize>,
    },
    /// Render one panel to a PNG file
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Run date, YYYY-MM-DD (default: today UTC)
    #[arg(long)]
    date: Option<String>,

    /// Run hour: 00, 06, 12 or 18
    #[arg(long, default_value = "00")]
    hour: String,

    /// Lead-hour index
    #[arg(long, default_value_t = 0)]
    lead: usize,

    /// Parameter id or label (precip, t2m, wind, mslp)
    #[arg(long, default_value = "precip")]
    parameter: String,

    /// Output file (default: the download filename)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = ViewerConfig::load(&cli.config)?;
    if let Some(source) = cli.source {
        config.source.kind = source;
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    match cli.command {
        Command::Serve { listen, worker_threads } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            let threads = worker_threads.or_else(|| {
                env::var("TOKIO_WORKER_THREADS")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
            });
            if let Some(threads) = threads {
                info!("Configuring tokio runtime with {} worker threads", threads);
                runtime_builder.worker_threads(threads);
            }
            runtime_builder.build()?.block_on(serve(config))
        }
        Command::Render(args) => runtime_builder.build()?.block_on(render_once(config, args)),
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();
}

async fn serve(config: ViewerConfig) -> Result<()> {
    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    let state = Arc::new(AppState::new(&config, Some(prometheus))?);
    let app = viewer::build_router(state);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen))?;
    info!(address = %addr, source = ?config.source.kind, "Starting viewer");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn render_once(config: ViewerConfig, args: RenderArgs) -> Result<()> {
    let state = AppState::new(&config, None)?;
    let query = PanelQuery {
        date: args.date,
        hour: Some(args.hour),
        lead: Some(args.lead.to_string()),
        parameter: Some(args.parameter),
        download: true,
    };

    let panel = match query.parse() {
        Ok(request) => state.render_panel(request).await,
        Err(e) => Err(e),
    };
    let panel = match panel {
        Ok(panel) => panel,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    let output = args.output.unwrap_or_else(|| PathBuf::from(panel.download_filename()));
    std::fs::write(&output, &panel.png).with_context(|| format!("Failed to write {:?}", output))?;
    println!("{}", panel.status_message());
    info!(path = %output.display(), bytes = panel.png.len(), "Wrote panel");
    Ok(())
}
