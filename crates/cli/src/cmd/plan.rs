//! Implementation of the `setupkit plan` command.
//!
//! Resolves the setup manifest, its cabinets and the overlay into a copy
//! queue and prints it. Directories listed by the manifests are created; no
//! file is copied.

use anyhow::{Context, Result};

use setupkit_lib::fs::StdFilesystem;
use setupkit_lib::plan::prepare_all_copies;

use super::{LoadedSession, SessionArgs, describe, print_report};
use crate::output::{OutputFormat, print_info, print_json, print_success};

pub fn cmd_plan(args: &SessionArgs, format: OutputFormat) -> Result<()> {
  let LoadedSession {
    mut session,
    manifest_path,
    inf,
  } = args.load()?;

  let prepared = prepare_all_copies(&mut session, &StdFilesystem, &inf)
    .with_context(|| format!("Failed to plan {}", manifest_path.display()))?;

  if format.is_json() {
    print_json(&serde_json::json!({
      "manifest": manifest_path,
      "source_path": session.source_path(),
      "destination_path": session.destination_path(),
      "report": prepared.report,
      "directories": prepared.queue.directories(),
      "copies": prepared.queue.instructions(),
    }))?;
    return Ok(());
  }

  print_info(&format!("Planning {}", manifest_path.display()));
  for instruction in prepared.queue.instructions() {
    println!("  {}", describe(instruction));
  }
  print_report(&prepared.report);
  println!();
  print_success(&format!("{} file(s) queued", prepared.queue.len()));

  Ok(())
}
