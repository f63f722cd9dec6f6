//! The copy queue.
//!
//! Planning appends [`FileCopyInstruction`]s in resolution order and the
//! queue is consumed once by [`CopyQueue::commit`]. Nothing is removed or
//! reordered in between, so a later instruction targeting the same path as an
//! earlier one overwrites it at commit time.

mod commit;
mod types;

use std::collections::HashSet;

use tracing::debug;

pub use commit::{CopyExecutor, FsCopyExecutor};
pub use types::{CommitAction, CommitError, CommitNotice, CommitSummary, FileCopyInstruction, QueueError};

/// Ordered copy instructions plus the directories they need.
#[derive(Debug, Default)]
pub struct CopyQueue {
  instructions: Vec<FileCopyInstruction>,
  directories: Vec<String>,
  seen: HashSet<String>,
}

impl CopyQueue {
  pub fn new() -> Self {
    Self::default()
  }

  /// Validate and append an instruction. Its destination directory is
  /// recorded for creation at commit time.
  pub fn enqueue(&mut self, instruction: FileCopyInstruction) -> Result<(), QueueError> {
    if instruction.source_file_name.is_empty() {
      return Err(QueueError::EmptySourceName);
    }
    if instruction.destination_directory.is_empty() {
      return Err(QueueError::EmptyDestination {
        file: instruction.source_file_name,
      });
    }
    instruction.source_path()?;
    instruction.container_path()?;
    instruction.destination_path()?;

    debug!(
      file = %instruction.source_file_name,
      container = instruction.source_container_name.as_deref().unwrap_or(""),
      destination = %instruction.destination_directory,
      "enqueued copy"
    );
    self.ensure_directory(&instruction.destination_directory);
    self.instructions.push(instruction);
    Ok(())
  }

  /// Record a directory to create at commit time. Duplicates are ignored
  /// and first-seen order is kept. Paths differing only in case are the same
  /// directory on Windows and distinct everywhere else.
  pub fn ensure_directory(&mut self, path: &str) {
    if self.seen.insert(directory_key(path)) {
      self.directories.push(path.to_string());
    }
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  pub fn instructions(&self) -> &[FileCopyInstruction] {
    &self.instructions
  }

  pub fn directories(&self) -> &[String] {
    &self.directories
  }

  /// Execute the queue: create directories, then copy in enqueue order.
  ///
  /// The queue is consumed. A failed copy is reported through `callback` and
  /// counted; the commit stops only when the callback returns
  /// [`CommitAction::Abort`] or a directory cannot be created.
  pub fn commit<E, F>(self, executor: &mut E, callback: F) -> Result<CommitSummary, CommitError>
  where
    E: CopyExecutor + ?Sized,
    F: FnMut(CommitNotice<'_>) -> CommitAction,
  {
    commit::commit_copies(self, executor, callback)
  }
}

#[cfg(windows)]
fn directory_key(path: &str) -> String {
  path.to_ascii_lowercase()
}

#[cfg(not(windows))]
fn directory_key(path: &str) -> String {
  path.to_string()
}
