//! Vendor overlay (`$OEM$`) indexing.
//!
//! ```text
//! <source root>\$OEM$\$$\...  ->  <destination root>\<install path>\...
//! <source root>\$OEM$\$1\...  ->  <destination root>\...
//! ```
//!
//! Overlay files are queued after every manifest, so they replace files the
//! manifests put at the same destination.

use std::io;

use tracing::{debug, info, warn};

use crate::consts::{OEM_INSTALL_SUBTREE, OEM_ROOT, OEM_VOLUME_SUBTREE, SEPARATOR};
use crate::fs::Filesystem;
use crate::queue::{CopyQueue, FileCopyInstruction};
use crate::session::SetupSession;

use super::paths::combine_paths;
use super::types::{OverlayReport, PlanError};

/// Index both overlay subtrees into `queue`.
///
/// A missing overlay root is not an error. Each subtree is indexed even if
/// the other one failed; the first failure is returned.
pub fn index_oem_folders<F: Filesystem + ?Sized>(
  session: &SetupSession,
  fs: &F,
  queue: &mut CopyQueue,
) -> Result<OverlayReport, PlanError> {
  let root = combine_paths(&[session.source_root_path(), OEM_ROOT])?;

  match fs.open_directory(&root) {
    Ok(_) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %root, "no overlay directory");
      return Ok(OverlayReport::default());
    }
    Err(source) => return Err(PlanError::EnumerationFailed { path: root, source }),
  }

  let mut report = OverlayReport {
    present: true,
    enqueued: 0,
  };
  let mut first_error = None;

  let subtrees = [
    (OEM_INSTALL_SUBTREE, session.destination_path()),
    (OEM_VOLUME_SUBTREE, session.destination_root_path()),
  ];
  for (subtree, destination) in subtrees {
    match index_oem_subfolder(session, fs, queue, subtree, destination) {
      Ok(count) => report.enqueued += count,
      Err(e) => {
        warn!(subtree, destination, error = %e, "failed to index overlay subtree");
        first_error.get_or_insert(e);
      }
    }
  }

  if let Some(e) = first_error {
    return Err(e);
  }
  info!(files = report.enqueued, "overlay indexed");
  Ok(report)
}

/// Queue every file under `$OEM$\<source_subpath>` for `destination`,
/// recursing into subdirectories. Returns the number of files queued.
///
/// The destination directory is created first. A missing source directory
/// queues nothing. Entries whose name contains `\` are skipped.
pub fn index_oem_subfolder<F: Filesystem + ?Sized>(
  session: &SetupSession,
  fs: &F,
  queue: &mut CopyQueue,
  source_subpath: &str,
  destination: &str,
) -> Result<usize, PlanError> {
  let source = combine_paths(&[session.source_root_path(), OEM_ROOT, source_subpath])?;

  fs.create_directory(destination)
    .map_err(|source| PlanError::CreateDirectoryFailed {
      path: destination.to_string(),
      source,
    })?;

  let listing = match fs.open_directory(&source) {
    Ok(listing) => listing,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %source, "overlay directory missing");
      return Ok(0);
    }
    Err(e) => {
      return Err(PlanError::EnumerationFailed {
        path: source,
        source: e,
      });
    }
  };

  let mut count = 0;
  for entry in listing {
    let entry = entry.map_err(|e| PlanError::EnumerationFailed {
      path: source.clone(),
      source: e,
    })?;
    if entry.name == "." || entry.name == ".." {
      continue;
    }
    // planned paths cannot carry a separator inside a name
    if entry.name.contains(SEPARATOR) {
      warn!(path = %source, name = %entry.name, "overlay entry name contains a path separator, skipping");
      continue;
    }

    if entry.is_dir {
      let sub_source = combine_paths(&[source_subpath, &entry.name])?;
      let sub_destination = combine_paths(&[destination, &entry.name])?;
      count += index_oem_subfolder(session, fs, queue, &sub_source, &sub_destination)?;
    } else {
      let instruction = FileCopyInstruction::new(source.as_str(), entry.name.as_str(), destination);
      queue
        .enqueue(instruction)
        .map_err(|e| PlanError::QueueRejectedEntry {
          file: entry.name.clone(),
          source: e,
        })?;
      count += 1;
    }
  }

  Ok(count)
}
