use std::net::SocketAddr;

use clap::Parser;

/// Serve example arrays over HTTP as a Zarr v2 hierarchy.
#[derive(Parser, Debug, Clone)]
#[command(name = "zarrs_serve", version)]
pub struct Args {
    /// Socket address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub address: SocketAddr,

    /// Do not register the lazily generated random dataset
    #[arg(long)]
    pub no_random: bool,
}
