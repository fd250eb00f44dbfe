//! Shared runner for cp and rm
//!
//! Builds the glob filter and S3 client, drives the core dispatcher and
//! reports per-item lines plus a final summary.

use clap::Args;
use serde::Serialize;
use xfer_core::{
    Dispatcher, FilterSpec, FsLister, Locator, ObjectInfo, Plan, Result, StorageConfig,
    TransferItem, TransferObserver, TransferSummary,
};
use xfer_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, ProgressBar};

/// Flags shared by cp and rm
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferArgs {
    /// Operate on every object under the prefix (or every file under the directory)
    #[arg(short, long)]
    pub recursive: bool,

    /// Only process relative paths matching this glob (recursive mode)
    #[arg(short, long, value_name = "GLOB")]
    pub include: Option<String>,

    /// Skip relative paths matching this glob (recursive mode)
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Option<String>,

    /// Only show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

impl TransferArgs {
    fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(self.include.clone(), self.exclude.clone())
    }
}

#[derive(Debug, Serialize)]
struct TransferOutput {
    status: &'static str,
    operation: String,
    dry_run: bool,
    items: usize,
    bytes: u64,
    size_human: String,
}

impl TransferOutput {
    fn new(operation: String, dry_run: bool, summary: TransferSummary) -> Self {
        Self {
            status: "success",
            operation,
            dry_run,
            items: summary.items,
            bytes: summary.bytes,
            size_human: humansize::format_size(summary.bytes, humansize::BINARY),
        }
    }
}

/// Prints one line per completed item and keeps the spinner current
struct CliObserver<'a> {
    formatter: &'a Formatter,
    spinner: ProgressBar,
    dry_run: bool,
}

impl TransferObserver for CliObserver<'_> {
    fn on_start(&self, item: &TransferItem) {
        self.spinner.set_message(&item.source.to_string());
    }

    fn on_complete(&self, item: &TransferItem, info: Option<&ObjectInfo>) {
        if self.formatter.is_json() {
            return;
        }

        let line = item_line(item, info, self.dry_run);
        self.spinner.suspend(|| self.formatter.println(&line));
    }
}

fn item_line(item: &TransferItem, info: Option<&ObjectInfo>, dry_run: bool) -> String {
    let prefix = if dry_run { "Would " } else { "" };
    match &item.target {
        Some(target) => {
            let verb = match (&item.source, target) {
                (Locator::Local(_), _) => "upload",
                (Locator::Remote(_), Locator::Local(_)) => "download",
                (Locator::Remote(_), Locator::Remote(_)) => "copy",
            };
            let size = info
                .and_then(|i| i.size_human.as_deref())
                .map(|s| format!(" ({s})"))
                .unwrap_or_default();
            if dry_run {
                format!("{prefix}{verb}: {} -> {target}", item.source)
            } else {
                format!("{} -> {target}{size}", item.source)
            }
        }
        None if dry_run => format!("{prefix}remove: {}", item.source),
        None => format!("Removed: {}", item.source),
    }
}

/// Help footer shared by cp and rm
pub const BUCKET_ROOT_HELP: &str = "Without -r/--recursive, an s3://bucket or s3://bucket/ \
path with no object key is rejected as a usage error (exit code 2) before any request is sent.";

/// Run a plan end to end and report the outcome
pub async fn run(
    plan: Result<Plan>,
    args: &TransferArgs,
    storage: &StorageConfig,
    formatter: &Formatter,
) -> ExitCode {
    match run_plan(plan, args, storage, formatter).await {
        Ok((operation, summary)) => {
            report(formatter, operation, args.dry_run, summary);
            ExitCode::Success
        }
        Err(e) => formatter.fail(&e),
    }
}

async fn run_plan(
    plan: Result<Plan>,
    args: &TransferArgs,
    storage: &StorageConfig,
    formatter: &Formatter,
) -> Result<(String, TransferSummary)> {
    let plan = plan?;
    let filter = args.filter_spec().compile()?;
    tracing::debug!(include = ?filter.include(), exclude = ?filter.exclude(), "Compiled filter");
    if let Some(root) = plan.remote_source() {
        tracing::debug!(root = %root, recursive = args.recursive, "Remote source");
    }

    if !args.recursive {
        plan.check_single()?;
        if !filter.is_empty() {
            formatter.warning("--include/--exclude only apply with --recursive; ignoring");
        }
    }

    let client = S3Client::new(storage).await?;
    let lister = FsLister::new();
    let operation = plan
        .mode()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "delete".to_string());

    let observer = CliObserver {
        formatter,
        spinner: ProgressBar::spinner(formatter.config(), "Resolving..."),
        dry_run: args.dry_run,
    };

    let result = Dispatcher::new(&client)
        .with_observer(&observer)
        .dry_run(args.dry_run)
        .run_plan(&plan, args.recursive, &filter, &lister)
        .await;
    observer.spinner.finish_and_clear();

    Ok((operation, result?))
}

fn report(formatter: &Formatter, operation: String, dry_run: bool, summary: TransferSummary) {
    let output = TransferOutput::new(operation, dry_run, summary);
    if formatter.is_json() {
        formatter.json(&output);
    } else if dry_run {
        formatter.println(&format!("{} item(s) would be processed.", output.items));
    } else {
        formatter.success(&format!(
            "{}: {} item(s), {}.",
            capitalize(&output.operation),
            output.items,
            output.size_human
        ));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use xfer_core::RemotePath;

    fn upload_item() -> TransferItem {
        TransferItem {
            source: Locator::Local(PathBuf::from("foo/bar/cats.zip")),
            target: Some(Locator::Remote(RemotePath::new("b", "cats/cats.zip"))),
            relative: "cats.zip".into(),
        }
    }

    #[test]
    fn test_item_line_upload() {
        let info = ObjectInfo::file("cats/cats.zip", 2048);
        assert_eq!(
            item_line(&upload_item(), Some(&info), false),
            "foo/bar/cats.zip -> s3://b/cats/cats.zip (2 KiB)"
        );
        assert_eq!(
            item_line(&upload_item(), None, true),
            "Would upload: foo/bar/cats.zip -> s3://b/cats/cats.zip"
        );
    }

    #[test]
    fn test_item_line_delete() {
        let item = TransferItem {
            source: Locator::Remote(RemotePath::raw("b", "cats/a.txt")),
            target: None,
            relative: "a.txt".into(),
        };
        assert_eq!(item_line(&item, None, false), "Removed: s3://b/cats/a.txt");
        assert_eq!(item_line(&item, None, true), "Would remove: s3://b/cats/a.txt");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("upload"), "Upload");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_transfer_output_json() {
        let output = TransferOutput::new(
            "download".to_string(),
            false,
            TransferSummary {
                items: 3,
                bytes: 3072,
            },
        );
        insta::assert_json_snapshot!(output, @r#"
        {
          "status": "success",
          "operation": "download",
          "dry_run": false,
          "items": 3,
          "bytes": 3072,
          "size_human": "3 KiB"
        }
        "#);
    }

    #[tokio::test]
    async fn test_invalid_pattern_fails_before_client() {
        let formatter = Formatter::new(crate::output::OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let args = TransferArgs {
            recursive: true,
            include: Some("{a,b".to_string()),
            ..Default::default()
        };
        let code = run(
            Plan::delete("s3://b/cats"),
            &args,
            &StorageConfig::default(),
            &formatter,
        )
        .await;
        assert_eq!(code, ExitCode::UsageError);
    }

    #[tokio::test]
    async fn test_bucket_root_without_recursive_is_usage_error() {
        let formatter = Formatter::new(crate::output::OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let code = run(
            Plan::delete("s3://b/"),
            &TransferArgs::default(),
            &StorageConfig::default(),
            &formatter,
        )
        .await;
        assert_eq!(code, ExitCode::UsageError);
    }

    #[tokio::test]
    async fn test_local_to_local_is_usage_error() {
        let formatter = Formatter::new(crate::output::OutputConfig::default());
        let code = run(
            Plan::copy("a.txt", "b.txt"),
            &TransferArgs::default(),
            &StorageConfig::default(),
            &formatter,
        )
        .await;
        assert_eq!(code, ExitCode::UsageError);
    }
}
