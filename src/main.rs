use std::sync::Arc;

use clap::Parser;
use log::info;
use zarrs_serve::{config::Args, sample, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let registry = Arc::new(sample::registry(!args.no_random)?);
    for name in registry.dataset_names() {
        info!("serving dataset {name}");
    }

    let listener = tokio::net::TcpListener::bind(args.address).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, server::router(registry)).await?;
    Ok(())
}
