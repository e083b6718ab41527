use anyhow::Result;
use std::io::Write as _;

use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use modelland::{
    backup::export_filename,
    config::{Cli, Command, Config, ExportArgs, HashAdminPasswordArgs, ImportArgs},
    store::ContentStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cmd = cli.command.clone().unwrap_or(Command::Run);

    match cmd {
        Command::Run => run_server(cli.config).await,
        Command::Export(args) => export_backup(&cli.config, args),
        Command::Import(args) => import_backup(&cli.config, args),
        Command::Reset => reset_store(&cli.config),
        Command::HashAdminPassword(args) => print_admin_password_hash(args),
    }
}

async fn run_server(config: Config) -> Result<()> {
    let store = ContentStore::open(&config.data_dir)?;
    let credentials = config.admin_credentials();
    if config.admin_password_hash().is_none() {
        warn!("no valid admin password hash configured; admin api will reject every request");
    }
    let chat = config
        .chat_client()
        .map_err(|e| anyhow::anyhow!("build chat client: {e}"))?;
    if chat.is_none() {
        info!("chat api key not set; chat replies will use the fallback message");
    }

    let app = modelland::http::build_router(store, credentials, chat)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!(
        bind = %config.bind,
        data_dir = %config.data_dir.display(),
        version = modelland::version::VERSION,
        "starting modelland"
    );
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn export_backup(config: &Config, args: ExportArgs) -> Result<()> {
    let mut store = ContentStore::open(&config.data_dir)?;
    let text = store.export_data()?;

    if args.stdout {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.write_all(b"\n")?;
        return Ok(());
    }

    let path = args
        .out
        .unwrap_or_else(|| export_filename(chrono::Utc::now()).into());
    std::fs::write(&path, text.as_bytes())?;
    info!(path = %path.display(), "backup written");
    Ok(())
}

fn import_backup(config: &Config, args: ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("read {}: {e}", args.file.display()))?;
    let mut store = ContentStore::open(&config.data_dir)?;
    let restored = store.import_data(&text)?;
    println!("{}", serde_json::to_string(&restored)?);
    Ok(())
}

fn reset_store(config: &Config) -> Result<()> {
    let mut store = ContentStore::open(&config.data_dir)?;
    store.reset_to_defaults()?;
    Ok(())
}

fn print_admin_password_hash(args: HashAdminPasswordArgs) -> Result<()> {
    let plaintext = match args.from_env {
        Some(var) => {
            std::env::var(&var).map_err(|e| anyhow::anyhow!("read env {var}: {e}"))?
        }
        None => {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    let hash = modelland::credentials::AdminPasswordHash::hash(&plaintext)
        .map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?;
    println!("{}", hash.as_str());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
