//! cp command - Copy objects
//!
//! Uploads local files, downloads objects or copies objects server-side,
//! depending on which side carries the `s3://` scheme.

use clap::Args;
use xfer_core::{Plan, StorageConfig};

use super::transfer::{self, TransferArgs};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy objects
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source: local path or s3://bucket[/key]
    pub source: String,

    /// Target: local path or s3://bucket[/key]
    pub target: String,

    #[command(flatten)]
    pub transfer: TransferArgs,
}

/// Execute the cp command
pub async fn execute(args: CpArgs, storage: &StorageConfig, formatter: &Formatter) -> ExitCode {
    let plan = Plan::copy(&args.source, &args.target);
    transfer::run(plan, &args.transfer, storage, formatter).await
}
