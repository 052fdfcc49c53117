use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use porchlight::config::Config;
use porchlight::github::GithubClient;
use porchlight::visits::VisitStore;
use porchlight::{api, page};

/// How often the visit store sweeps for idle visits.
const PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(600);

#[derive(Parser)]
#[command(name = "porch")]
#[command(about = "Personal landing page: media-gated reveal and GitHub project cards")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the landing page server
    Serve {
        /// Port for the HTTP server
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Fetch, rank, and print the project cards once without serving
    Render {
        /// GitHub account to render (defaults to the configured user)
        #[arg(short, long)]
        user: Option<String>,

        /// Print the ranked repository list as JSON instead of card HTML
        #[arg(long)]
        json: bool,
    },
}

/// Initialize tracing with output to stderr (for render mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "porchlight=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Render mode: log to stderr so stdout stays pipeable output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Render { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await,
        Some(Commands::Render { user, json }) => render(user, json).await,
        // Default: start the server
        None => serve(3000).await,
    }
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = Config::from_env();
    tracing::info!(user = %config.github_user, "Starting porchlight server on port {}", port);

    let store = VisitStore::new(config);
    tokio::spawn(store.clone().run_pruner(PRUNE_INTERVAL));

    let app = api::create_router(store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("porchlight listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn render(user: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(user) = user {
        config.github_user = user;
    }

    let client = GithubClient::new(&config);
    let repos = client.load_projects(&config.github_user).await?;
    tracing::info!(count = repos.len(), "fetched repositories for {}", config.github_user);

    if json {
        println!("{}", serde_json::to_string_pretty(&repos)?);
    } else {
        let fragment = page::render_projects(&repos, chrono::Utc::now());
        println!("{}", fragment.html);
    }
    Ok(())
}
