//! xfer - copy and remove objects in S3-compatible storage
//!
//! A command-line interface for uploading, downloading, copying and
//! deleting objects, recursively with include/exclude globs.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use xfer_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG; otherwise only warnings and errors
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
