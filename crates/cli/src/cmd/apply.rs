//! Implementation of the `setupkit apply` command.
//!
//! Plans exactly like `setupkit plan`, then commits the queue: every copy runs
//! in queue order, failures are reported and counted, and the command fails
//! if any copy failed.

use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use setupkit_lib::fs::StdFilesystem;
use setupkit_lib::plan::prepare_all_copies;
use setupkit_lib::queue::{CommitAction, CommitNotice, FsCopyExecutor};

use super::{LoadedSession, SessionArgs, print_report};
use crate::output::{
  OutputFormat, format_bytes, format_duration, print_error, print_info, print_json, print_stat, print_success,
  symbols,
};

#[derive(Debug, Serialize)]
struct CopyFailure {
  file: String,
  destination: String,
  error: String,
}

pub fn cmd_apply(args: &SessionArgs, format: OutputFormat) -> Result<()> {
  let started = Instant::now();
  let LoadedSession {
    mut session,
    manifest_path,
    inf,
  } = args.load()?;

  let prepared = prepare_all_copies(&mut session, &StdFilesystem, &inf)
    .with_context(|| format!("Failed to plan {}", manifest_path.display()))?;
  let report = prepared.report;

  if !format.is_json() {
    print_info(&format!(
      "Copying {} file(s) into {}",
      prepared.queue.len(),
      session.destination_path()
    ));
  }

  let mut failures = Vec::new();
  let summary = prepared
    .queue
    .commit(&mut FsCopyExecutor::new(), |notice| {
      match notice {
        CommitNotice::DirectoryReady { .. } => {}
        CommitNotice::Copied {
          instruction,
          destination,
          ..
        } => {
          if !format.is_json() {
            println!("  {} {} {}", instruction.source_file_name, symbols::ARROW, destination);
          }
        }
        CommitNotice::CopyFailed { instruction, error } => {
          let destination = instruction
            .destination_path()
            .unwrap_or_else(|_| instruction.destination_directory.clone());
          if !format.is_json() {
            print_error(&format!("{}: {}", instruction.source_file_name, error));
          }
          failures.push(CopyFailure {
            file: instruction.source_file_name.clone(),
            destination,
            error: error.to_string(),
          });
        }
      }
      CommitAction::Continue
    })
    .context("Commit failed")?;
  let elapsed = started.elapsed();

  if format.is_json() {
    print_json(&serde_json::json!({
      "manifest": manifest_path,
      "report": report,
      "summary": summary,
      "failures": failures,
      "elapsed": humantime::format_duration(elapsed).to_string(),
    }))?;
  } else {
    print_report(&report);
    println!();
    print_stat("Copied", &summary.copied.to_string());
    print_stat("Failed", &summary.failed.to_string());
    print_stat("Written", &format_bytes(summary.bytes));
    print_stat("Elapsed", &format_duration(elapsed));
  }

  if summary.failed > 0 {
    bail!("{} of {} file(s) failed to copy", summary.failed, summary.copied + summary.failed);
  }
  if !format.is_json() {
    print_success("Apply complete!");
  }
  Ok(())
}
