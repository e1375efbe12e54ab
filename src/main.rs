//! Frontdesk - Help request relay with supervisor escalation and learned answers.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use frontdesk::client::{CallOutcome, DeskClient, DEFAULT_SERVER_URL};
use frontdesk::config::{ConfigLoader, DeskConfig};
use frontdesk::desk::{HelpDesk, RequestStatus, SweeperConfig, TimeoutSweeper};
use frontdesk::display;
use frontdesk::persist::{JsonFileStore, MemoryStore, Persistence};
use frontdesk::server::DeskServer;

#[derive(Parser)]
#[command(
    name = "frontdesk",
    about = "Help request relay with supervisor escalation and learned answers",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file path (defaults to .frontdesk.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the desk server and timeout sweeper.
    Serve {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
        /// JSON data file.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Keep all state in memory.
        #[arg(long)]
        ephemeral: bool,
        /// Seconds between timeout sweeps.
        #[arg(long)]
        tick_secs: Option<u64>,
        /// Milliseconds before a pending request times out.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Ask a question as a caller.
    Ask {
        /// Caller identifier (e.g. phone number).
        #[arg(short, long)]
        caller: String,
        /// The question.
        #[arg(short, long)]
        question: String,
        /// Wait this many seconds for a supervisor answer.
        #[arg(long)]
        wait_secs: Option<u64>,
        #[command(flatten)]
        remote: Remote,
    },
    /// List help requests.
    Requests {
        /// Only show this status (pending, resolved, unresolved).
        #[arg(short, long)]
        status: Option<RequestStatus>,
        #[command(flatten)]
        remote: Remote,
    },
    /// Show a single help request.
    Show {
        id: String,
        #[command(flatten)]
        remote: Remote,
    },
    /// Answer a pending request as supervisor.
    Answer {
        id: String,
        answer: String,
        #[command(flatten)]
        remote: Remote,
    },
    /// Mark a pending request unresolved.
    Unresolve {
        id: String,
        #[command(flatten)]
        remote: Remote,
    },
    /// List memorized answers.
    Knowledge {
        #[command(flatten)]
        remote: Remote,
    },
}

#[derive(clap::Args)]
struct Remote {
    /// Desk server URL.
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    url: String,
    /// Print full text without truncation.
    #[arg(long)]
    raw: bool,
}

impl Remote {
    fn client(&self) -> Result<DeskClient, Box<dyn std::error::Error>> {
        Ok(DeskClient::new(&self.url)?)
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<DeskConfig, Box<dyn std::error::Error>> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    Ok(loader.load()?)
}

async fn serve(config: DeskConfig) -> Result<(), Box<dyn std::error::Error>> {
    let persistence: Arc<dyn Persistence> = if config.storage.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(config.storage.data_path.clone()))
    };
    let desk = Arc::new(HelpDesk::open(persistence).await?);

    let cancel = CancellationToken::new();
    let sweeper_config: SweeperConfig = config.sweeper.into();
    let sweeper = TimeoutSweeper::new(Arc::clone(&desk), sweeper_config).spawn(cancel.clone());

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C");
        }
        shutdown.cancel();
    });

    tracing::info!(
        address = %config.address(),
        data = %config.storage.data_path.display(),
        ephemeral = config.storage.ephemeral,
        "Starting frontdesk"
    );
    let result = DeskServer::new(desk, cancel.clone())
        .with_config(config.server.clone())
        .run()
        .await;

    cancel.cancel();
    sweeper.await?;
    result?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            data,
            ephemeral,
            tick_secs,
            timeout_ms,
        } => {
            let mut config = load_config(cli.config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data) = data {
                config.storage.data_path = data;
            }
            config.storage.ephemeral |= ephemeral;
            if let Some(tick_secs) = tick_secs {
                config.sweeper.tick_interval_secs = tick_secs;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.sweeper.pending_timeout_ms = timeout_ms;
            }
            serve(config).await
        }
        Commands::Ask {
            caller,
            question,
            wait_secs,
            remote,
        } => {
            let client = remote.client()?;
            let outcome = client.simulate_call(&caller, &question).await?;
            display::print_call_outcome(&caller, &outcome);

            if let (Some(secs), CallOutcome::Escalated { request_id }) =
                (wait_secs, &outcome)
            {
                let request = client
                    .wait_for_resolution(
                        request_id,
                        Duration::from_secs(2),
                        Duration::from_secs(secs),
                    )
                    .await?;
                display::print_request(&request, remote.raw);
            }
            Ok(())
        }
        Commands::Requests { status, remote } => {
            let requests = remote.client()?.list_requests(status).await?;
            display::print_requests(&requests, remote.raw);
            Ok(())
        }
        Commands::Show { id, remote } => {
            let request = remote.client()?.get_request(&id).await?;
            display::print_request(&request, remote.raw);
            Ok(())
        }
        Commands::Answer { id, answer, remote } => {
            let request = remote.client()?.answer_request(&id, &answer).await?;
            display::print_request(&request, remote.raw);
            Ok(())
        }
        Commands::Unresolve { id, remote } => {
            let request = remote.client()?.mark_unresolved(&id).await?;
            display::print_request(&request, remote.raw);
            Ok(())
        }
        Commands::Knowledge { remote } => {
            let items = remote.client()?.list_knowledge().await?;
            display::print_knowledge(&items, remote.raw);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

