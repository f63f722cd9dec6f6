//! Types for the copy queue and its commit.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::paths::{PathError, combine_paths};

/// One planned file copy.
///
/// Instructions are built by the resolvers and handed to the queue; the
/// queue never changes them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCopyInstruction {
  pub source_root_path: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_relative_path: Option<String>,
  pub source_file_name: String,
  /// Name of the member inside the container, when it differs from `source_file_name`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_override_name: Option<String>,
  /// Cabinet holding the file; `None` for loose files.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_container_name: Option<String>,
  pub destination_directory: String,
  /// Target name; `None` keeps the source name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination_file_name: Option<String>,
}

impl FileCopyInstruction {
  pub fn new(
    source_root_path: impl Into<String>,
    source_file_name: impl Into<String>,
    destination_directory: impl Into<String>,
  ) -> Self {
    Self {
      source_root_path: source_root_path.into(),
      source_relative_path: None,
      source_file_name: source_file_name.into(),
      source_override_name: None,
      source_container_name: None,
      destination_directory: destination_directory.into(),
      destination_file_name: None,
    }
  }

  pub fn with_relative_path(mut self, path: Option<String>) -> Self {
    self.source_relative_path = path;
    self
  }

  pub fn with_container(mut self, container: Option<String>) -> Self {
    self.source_container_name = container;
    self
  }

  pub fn with_override_name(mut self, name: Option<String>) -> Self {
    self.source_override_name = name;
    self
  }

  /// Empty names are treated as unset.
  pub fn with_destination_file_name(mut self, name: Option<String>) -> Self {
    self.destination_file_name = name.filter(|n| !n.is_empty());
    self
  }

  /// Directory the source file (or its container) lives in.
  pub fn source_directory(&self) -> Result<String, PathError> {
    combine_paths(&[
      &self.source_root_path,
      self.source_relative_path.as_deref().unwrap_or_default(),
    ])
  }

  /// Full path of the loose source file.
  pub fn source_path(&self) -> Result<String, PathError> {
    combine_paths(&[
      &self.source_root_path,
      self.source_relative_path.as_deref().unwrap_or_default(),
      &self.source_file_name,
    ])
  }

  /// Full path of the container, for cabinet members.
  pub fn container_path(&self) -> Result<Option<String>, PathError> {
    self
      .source_container_name
      .as_deref()
      .map(|cabinet| {
        combine_paths(&[
          &self.source_root_path,
          self.source_relative_path.as_deref().unwrap_or_default(),
          cabinet,
        ])
      })
      .transpose()
  }

  /// Name of the member to extract from the container.
  pub fn member_name(&self) -> &str {
    self.source_override_name.as_deref().unwrap_or(&self.source_file_name)
  }

  /// Name the file gets at the destination.
  pub fn destination_name(&self) -> &str {
    self.destination_file_name.as_deref().unwrap_or(&self.source_file_name)
  }

  /// Full destination path.
  pub fn destination_path(&self) -> Result<String, PathError> {
    combine_paths(&[&self.destination_directory, self.destination_name()])
  }
}

/// Reasons the queue refuses an instruction.
#[derive(Debug, Error)]
pub enum QueueError {
  #[error("source file name is empty")]
  EmptySourceName,

  #[error("destination directory is empty for '{file}'")]
  EmptyDestination { file: String },

  #[error(transparent)]
  Path(#[from] PathError),
}

/// Progress events delivered to the commit callback.
#[derive(Debug)]
pub enum CommitNotice<'a> {
  /// A destination directory exists (created or already present).
  DirectoryReady { path: &'a str },
  /// A file was copied.
  Copied {
    instruction: &'a FileCopyInstruction,
    destination: &'a str,
    bytes: u64,
  },
  /// A file could not be copied; the commit continues unless the callback aborts.
  CopyFailed {
    instruction: &'a FileCopyInstruction,
    error: &'a io::Error,
  },
}

/// Callback decision after each notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
  Continue,
  Abort,
}

/// Totals of a finished commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
  pub directories: usize,
  pub copied: usize,
  pub failed: usize,
  pub bytes: u64,
}

/// Errors that stop a commit.
#[derive(Debug, Error)]
pub enum CommitError {
  #[error("failed to create directory {path}: {source}")]
  CreateDirectory {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("commit aborted after {completed} operations")]
  Aborted { completed: usize },
}
