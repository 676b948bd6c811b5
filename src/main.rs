use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use snowstudy::db::Database;
use snowstudy::server::{self, session::SessionStore, ServerContext};
use snowstudy::settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Visual snow perception study server")]
struct Args {
    /// Path to the JSON settings file
    #[arg(long, default_value = "settings.json")]
    config: PathBuf,
    /// Override the bind address from the settings file
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Override the SQLite database path
    #[arg(long)]
    db: Option<PathBuf>,
    /// Override the study image path
    #[arg(long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(&args.config)?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(db_path) = args.db {
        settings.db_path = db_path;
    }
    if let Some(image) = args.image {
        settings.study_image = image;
    }

    log::info!("Study server starting up...");
    let database = Database::new(settings.db_path.clone())?;

    let ctx = ServerContext {
        db: database,
        sessions: SessionStore::new(),
        settings: Arc::new(settings),
    };
    server::serve(ctx).await;

    Ok(())
}
