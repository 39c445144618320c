use anyhow::Context;
use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use click2edit::{
    backend::{BlobBackend, ContentBackend, FileBackend, MemoryBackend},
    server,
    state::{AppState, DEFAULT_ENDPOINT, ServerConfig},
};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Pretty-printed JSON file on local disk
    File,
    /// HTTP blob store (needs --blob-url and --blob-token)
    Blob,
    /// In-memory only, lost on restart
    Memory,
}

#[derive(Parser, Debug)]
#[command(name = "click2edit", about = "Persistence endpoint for inline site editing")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Path of the content resource.
    #[arg(long, env = "EDITABLE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Editing password. If unset, writes are accepted without credentials.
    #[arg(long, env = "EDITABLE_PASSWORD")]
    password: Option<String>,

    /// Secret used to sign session cookies. If unset, the POST login
    /// handshake is disabled and only the password header authorizes writes.
    #[arg(long, env = "EDITABLE_SESSION_SECRET")]
    session_secret: Option<String>,

    /// Value of the Access-Control-Allow-Origin header.
    #[arg(long, env = "EDITABLE_CORS_ORIGIN", default_value = "*")]
    cors_origin: String,

    /// Require credentials for GET as well as PUT.
    #[arg(long, env = "EDITABLE_PROTECT_READS")]
    protect_reads: bool,

    #[arg(long, env = "EDITABLE_BACKEND", value_enum, default_value = "file")]
    backend: BackendKind,

    /// Content file for the file backend.
    #[arg(long, env = "EDITABLE_FILE", default_value = "editable-content.json")]
    file_path: PathBuf,

    /// Base URL of the blob store.
    #[arg(long, env = "BLOB_BASE_URL")]
    blob_url: Option<String>,

    /// Read-write token for the blob store.
    #[arg(long, env = "BLOB_READ_WRITE_TOKEN")]
    blob_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "click2edit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present (silently ignored if absent).
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let backend: Arc<dyn ContentBackend> = match args.backend {
        BackendKind::File => {
            let path = std::env::current_dir()
                .context("Cannot determine working directory")?
                .join(&args.file_path);
            tracing::info!("Content file: {}", path.display());
            Arc::new(FileBackend::new(path))
        }
        BackendKind::Blob => {
            let backend = BlobBackend::new(reqwest::Client::new(), args.blob_url, args.blob_token);
            // Requests answer 500 until the blob settings are complete.
            if let Err(e) = backend.ready() {
                tracing::warn!("Blob backend incomplete: {}", e);
            }
            Arc::new(backend)
        }
        BackendKind::Memory => {
            tracing::warn!("Using in-memory backend; edits are lost on restart");
            Arc::new(MemoryBackend::new())
        }
    };

    let mut config = ServerConfig::new(&args.endpoint);
    config.password = args.password.filter(|p| !p.is_empty());
    config.session_secret = args.session_secret.filter(|s| !s.is_empty());
    config.protect_reads = args.protect_reads;
    config.cors_origin = HeaderValue::from_str(&args.cors_origin)
        .with_context(|| format!("Invalid CORS origin {:?}", args.cors_origin))?;

    if config.password.is_none() {
        tracing::warn!("EDITABLE_PASSWORD not set; writes are unauthenticated");
    }
    if config.session_secret.is_none() {
        tracing::info!("Session login disabled (EDITABLE_SESSION_SECRET not set)");
    }

    let endpoint = config.endpoint.clone();
    let app = server::router(AppState::new(config, backend));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Listening on http://{addr}{endpoint}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result { tracing::error!("ctrl-c error: {}", e); }
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    tracing::info!("Shutting down gracefully");
}
