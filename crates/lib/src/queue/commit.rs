//! Queue execution.

use std::fs;
use std::io;

use tracing::{debug, info, warn};

use crate::fs::{Filesystem, StdFilesystem};
use crate::plan::paths::native_path;

use super::CopyQueue;
use super::types::{CommitAction, CommitError, CommitNotice, CommitSummary, FileCopyInstruction};

/// The engine that performs directory creation and file copies.
pub trait CopyExecutor {
  fn ensure_directory(&mut self, path: &str) -> io::Result<()>;

  /// Copy one file, returning the number of bytes written.
  fn copy_file(&mut self, instruction: &FileCopyInstruction, destination: &str) -> io::Result<u64>;
}

/// Copies loose files on the host filesystem.
///
/// Cabinet members are reported as [`io::ErrorKind::Unsupported`].
#[derive(Debug, Default)]
pub struct FsCopyExecutor {
  fs: StdFilesystem,
}

impl FsCopyExecutor {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CopyExecutor for FsCopyExecutor {
  fn ensure_directory(&mut self, path: &str) -> io::Result<()> {
    self.fs.create_directory(path).map(|_| ())
  }

  fn copy_file(&mut self, instruction: &FileCopyInstruction, destination: &str) -> io::Result<u64> {
    if let Some(cabinet) = &instruction.source_container_name {
      return Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot extract '{}' from cabinet '{}'", instruction.member_name(), cabinet),
      ));
    }
    let source = instruction.source_path().map_err(io::Error::other)?;
    fs::copy(native_path(&source), native_path(destination))
  }
}

pub(super) fn commit_copies<E, F>(queue: CopyQueue, executor: &mut E, mut callback: F) -> Result<CommitSummary, CommitError>
where
  E: CopyExecutor + ?Sized,
  F: FnMut(CommitNotice<'_>) -> CommitAction,
{
  let CopyQueue {
    instructions,
    directories,
    ..
  } = queue;
  let mut summary = CommitSummary::default();

  info!(directories = directories.len(), files = instructions.len(), "committing copy queue");

  for path in &directories {
    executor
      .ensure_directory(path)
      .map_err(|source| CommitError::CreateDirectory {
        path: path.clone(),
        source,
      })?;
    summary.directories += 1;
    if callback(CommitNotice::DirectoryReady { path }) == CommitAction::Abort {
      return Err(CommitError::Aborted {
        completed: summary.directories,
      });
    }
  }

  for instruction in &instructions {
    let destination = match instruction.destination_path() {
      Ok(path) => path,
      Err(e) => {
        let error = io::Error::other(e);
        summary.failed += 1;
        warn!(file = %instruction.source_file_name, error = %error, "copy failed");
        if callback(CommitNotice::CopyFailed {
          instruction,
          error: &error,
        }) == CommitAction::Abort
        {
          return Err(aborted(&summary));
        }
        continue;
      }
    };

    let action = match executor.copy_file(instruction, &destination) {
      Ok(bytes) => {
        summary.copied += 1;
        summary.bytes += bytes;
        debug!(destination = %destination, bytes, "copied");
        callback(CommitNotice::Copied {
          instruction,
          destination: &destination,
          bytes,
        })
      }
      Err(error) => {
        summary.failed += 1;
        warn!(file = %instruction.source_file_name, destination = %destination, error = %error, "copy failed");
        callback(CommitNotice::CopyFailed {
          instruction,
          error: &error,
        })
      }
    };
    if action == CommitAction::Abort {
      return Err(aborted(&summary));
    }
  }

  info!(
    copied = summary.copied,
    failed = summary.failed,
    bytes = summary.bytes,
    "commit finished"
  );
  Ok(summary)
}

fn aborted(summary: &CommitSummary) -> CommitError {
  CommitError::Aborted {
    completed: summary.directories + summary.copied + summary.failed,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn planned(temp: &TempDir, rel: &str) -> String {
    let base = temp.path().to_string_lossy().into_owned();
    if rel.is_empty() { base } else { format!("{}\\{}", base, rel) }
  }

  #[derive(Default)]
  struct Recorder {
    directories: Vec<String>,
    copies: Vec<String>,
    fail_on: Option<String>,
  }

  impl CopyExecutor for Recorder {
    fn ensure_directory(&mut self, path: &str) -> io::Result<()> {
      self.directories.push(path.to_string());
      Ok(())
    }

    fn copy_file(&mut self, instruction: &FileCopyInstruction, destination: &str) -> io::Result<u64> {
      if self.fail_on.as_deref() == Some(instruction.source_file_name.as_str()) {
        return Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
      }
      self.copies.push(destination.to_string());
      Ok(1)
    }
  }

  fn queue_of(names: &[&str]) -> CopyQueue {
    let mut queue = CopyQueue::new();
    for name in names {
      queue.enqueue(FileCopyInstruction::new("\\cd", *name, "\\hd\\dir")).unwrap();
    }
    queue
  }

  #[test]
  fn directories_before_copies_in_order() {
    let mut recorder = Recorder::default();
    let mut events = Vec::new();

    let summary = queue_of(&["a", "b"])
      .commit(&mut recorder, |notice| {
        events.push(match notice {
          CommitNotice::DirectoryReady { path } => format!("dir {}", path),
          CommitNotice::Copied { destination, .. } => format!("copy {}", destination),
          CommitNotice::CopyFailed { instruction, .. } => format!("fail {}", instruction.source_file_name),
        });
        CommitAction::Continue
      })
      .unwrap();

    assert_eq!(events, ["dir \\hd\\dir", "copy \\hd\\dir\\a", "copy \\hd\\dir\\b"]);
    assert_eq!(summary.copied, 2);
    assert_eq!(summary.failed, 0);
  }

  #[test]
  fn failures_are_counted_and_commit_continues() {
    let mut recorder = Recorder {
      fail_on: Some("b".to_string()),
      ..Default::default()
    };

    let summary = queue_of(&["a", "b", "c"])
      .commit(&mut recorder, |_| CommitAction::Continue)
      .unwrap();

    assert_eq!(summary.copied, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(recorder.copies, ["\\hd\\dir\\a", "\\hd\\dir\\c"]);
  }

  #[test]
  fn callback_can_abort() {
    let mut recorder = Recorder::default();

    let result = queue_of(&["a", "b", "c"]).commit(&mut recorder, |notice| match notice {
      CommitNotice::Copied { .. } => CommitAction::Abort,
      _ => CommitAction::Continue,
    });

    assert!(matches!(result, Err(CommitError::Aborted { completed: 2 })));
    assert_eq!(recorder.copies.len(), 1);
  }

  #[test]
  fn fs_executor_later_copy_wins() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("primary")).unwrap();
    fs::create_dir_all(temp.path().join("overlay")).unwrap();
    fs::write(temp.path().join("primary/foo.dll"), "primary").unwrap();
    fs::write(temp.path().join("overlay/foo.dll"), "overlay").unwrap();

    let destination = planned(&temp, "dest");
    let mut queue = CopyQueue::new();
    queue
      .enqueue(FileCopyInstruction::new(planned(&temp, "primary"), "foo.dll", destination.clone()))
      .unwrap();
    queue
      .enqueue(FileCopyInstruction::new(planned(&temp, "overlay"), "foo.dll", destination))
      .unwrap();

    let summary = queue
      .commit(&mut FsCopyExecutor::new(), |_| CommitAction::Continue)
      .unwrap();

    assert_eq!(summary.copied, 2);
    assert_eq!(fs::read_to_string(temp.path().join("dest/foo.dll")).unwrap(), "overlay");
  }

  #[cfg(not(windows))]
  #[test]
  fn fs_executor_creates_directories_differing_in_case() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/a.txt"), "a").unwrap();
    fs::write(temp.path().join("src/b.txt"), "b").unwrap();

    let mut queue = CopyQueue::new();
    queue
      .enqueue(FileCopyInstruction::new(planned(&temp, "src"), "a.txt", planned(&temp, "out\\Sys")))
      .unwrap();
    queue
      .enqueue(FileCopyInstruction::new(planned(&temp, "src"), "b.txt", planned(&temp, "out\\sys")))
      .unwrap();

    let summary = queue
      .commit(&mut FsCopyExecutor::new(), |_| CommitAction::Continue)
      .unwrap();

    assert_eq!(summary.directories, 2);
    assert_eq!(summary.copied, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(fs::read_to_string(temp.path().join("out/sys/b.txt")).unwrap(), "b");
  }

  #[test]
  fn fs_executor_rejects_cabinet_members() {
    let temp = TempDir::new().unwrap();
    let mut queue = CopyQueue::new();
    queue
      .enqueue(
        FileCopyInstruction::new(planned(&temp, ""), "kernel32.dll", planned(&temp, "dest"))
          .with_container(Some("reactos.cab".to_string())),
      )
      .unwrap();

    let mut kinds = Vec::new();
    let summary = queue
      .commit(&mut FsCopyExecutor::new(), |notice| {
        if let CommitNotice::CopyFailed { error, .. } = notice {
          kinds.push(error.kind());
        }
        CommitAction::Continue
      })
      .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(kinds, [io::ErrorKind::Unsupported]);
  }
}
