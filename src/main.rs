use clap::{Args, Parser, Subcommand};
use gamerec_api::RestApi;
use gamerec_artifacts::{FsArtifactStore, SnapshotCell};
use gamerec_core::{Mode, Recommender};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Game recommendations by nearest neighbors or cosine similarity
#[derive(Parser, Debug)]
#[command(name = "gamerec")]
#[command(about = "Recommend catalog games similar to a title or a custom profile", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API
    Serve {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// HTTP API port
        #[arg(long, default_value_t = 8080)]
        http_port: u16,
    },
    /// Print recommendations for one catalog item as JSON
    Recommend {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// Catalog item name
        #[arg(long)]
        name: String,

        /// distance (knn) or similarity (cosine)
        #[arg(long, default_value = "similarity")]
        mode: Mode,

        /// Number of recommendations
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
}

#[derive(Args, Debug)]
struct ArtifactArgs {
    /// Path to the artifact bundle directory
    #[arg(short, long, default_value = "./models")]
    artifacts: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cell = SnapshotCell::new();

    match cli.command {
        Command::Serve { artifacts, http_port } => {
            info!("Starting gamerec v{}", env!("CARGO_PKG_VERSION"));
            info!("Artifact bundle: {:?}", artifacts.artifacts);

            let recommender = load(&cell, artifacts).await?;
            info!(
                "Serving {} items in a {}-dimensional feature space",
                recommender.snapshot().len(),
                recommender.snapshot().dim()
            );
            info!("HTTP API: http://localhost:{}/", http_port);

            let http_handle = std::thread::spawn(move || {
                let sys = actix_web::rt::System::new();
                sys.block_on(RestApi::start(recommender, http_port))
            });

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                }
                joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
                    if let Ok(Ok(Err(e))) = joined {
                        return Err(e.into());
                    }
                    info!("HTTP server stopped");
                }
            }

            info!("Shutting down...");
        }
        Command::Recommend { artifacts, name, mode, k } => {
            let recommender = load(&cell, artifacts).await?;
            let result = recommender.recommend_by_name(&name, mode, k)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn load(cell: &SnapshotCell, args: ArtifactArgs) -> anyhow::Result<Recommender> {
    let dir = args.artifacts;
    let snapshot = cell.get_or_load(move || FsArtifactStore::open(dir)).await?;
    Ok(Recommender::new(snapshot))
}
