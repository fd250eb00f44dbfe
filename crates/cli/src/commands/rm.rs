//! rm command - Remove objects
//!
//! Removes a single object, or with `-r` every object under a prefix.

use clap::Args;
use xfer_core::{Plan, StorageConfig};

use super::transfer::{self, TransferArgs};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object or prefix to remove (s3://bucket[/key])
    pub path: String,

    #[command(flatten)]
    pub transfer: TransferArgs,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, storage: &StorageConfig, formatter: &Formatter) -> ExitCode {
    let plan = Plan::delete(&args.path);
    transfer::run(plan, &args.transfer, storage, formatter).await
}
