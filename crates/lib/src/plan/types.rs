//! Error, error-code and report types for copy planning.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::inf::InfError;
use crate::queue::QueueError;

use super::paths::PathError;

/// Caller-visible failure classes, recorded on the session when planning fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupErrorCode {
  /// A required section of the setup manifest is missing or corrupt.
  TxtSetupSection,
  /// A required section of a cabinet manifest is missing or corrupt.
  CabinetSection,
  /// The installation directory could not be created.
  CreateInstallDir,
  /// A directory listed by the manifest could not be created.
  CreateDir,
  /// The copy queue could not be built.
  CopyQueue,
  /// A cabinet manifest could not be opened or parsed.
  InvalidCabinetInf,
}

impl fmt::Display for SetupErrorCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Self::TxtSetupSection => "setup manifest section missing or corrupt",
      Self::CabinetSection => "cabinet manifest section missing or corrupt",
      Self::CreateInstallDir => "cannot create installation directory",
      Self::CreateDir => "cannot create directory",
      Self::CopyQueue => "cannot build copy queue",
      Self::InvalidCabinetInf => "invalid cabinet manifest",
    };
    f.write_str(text)
  }
}

/// Errors that can occur while planning copies.
#[derive(Debug, Error)]
pub enum PlanError {
  /// A required section is absent from every tier consulted.
  #[error("section [{section}] not found")]
  SectionNotFound { section: String },

  /// A file is not listed in any file-list section.
  #[error("file '{file}' is not listed in [{section}]")]
  RecordNotFound { file: String, section: String },

  /// A required field is absent on an otherwise valid record.
  #[error("record '{record}' in [{section}] has no field {field}")]
  FieldMissing {
    section: String,
    record: String,
    field: usize,
  },

  /// A directory or source-disk id resolves through neither table.
  #[error("id '{id}' not found in [{section}]")]
  DirectoryLookupFailed { id: String, section: String },

  /// A composed path exceeds the maximum length.
  #[error("path composition failed: {0}")]
  PathCompositionOverflow(#[from] PathError),

  /// The filesystem refused to create a directory.
  #[error("failed to create directory {path}: {source}")]
  CreateDirectoryFailed {
    path: String,
    #[source]
    source: io::Error,
  },

  /// An overlay directory could not be listed.
  #[error("failed to enumerate {path}: {source}")]
  EnumerationFailed {
    path: String,
    #[source]
    source: io::Error,
  },

  /// The copy queue refused an instruction.
  #[error("copy queue rejected '{file}': {source}")]
  QueueRejectedEntry {
    file: String,
    #[source]
    source: QueueError,
  },

  /// A cabinet manifest listed in `Cabinets` could not be loaded.
  #[error("failed to load cabinet manifest {path}: {source}")]
  CabinetManifest {
    path: String,
    #[source]
    source: InfError,
  },
}

/// Per-section counters.
///
/// `attempted` counts every record visited; `enqueued` the instructions
/// accepted by the queue; `skipped` the records dropped after a recoverable
/// failure. A found section where every record was skipped reports
/// `enqueued == 0 && attempted > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionStats {
  pub attempted: usize,
  pub enqueued: usize,
  pub skipped: usize,
}

impl SectionStats {
  /// True when the section had records but none made it into the queue.
  pub fn all_skipped(&self) -> bool {
    self.attempted > 0 && self.enqueued == 0
  }
}

/// Outcome of one section builder run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
  pub section: String,
  pub stats: SectionStats,
}

/// Counters for the directory creation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
  pub created: usize,
  pub existing: usize,
  pub skipped: usize,
}

/// Outcome of planning one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestReport {
  /// Cabinet the manifest describes, `None` for the setup manifest.
  pub cabinet: Option<String>,
  pub sections: Vec<SectionReport>,
  pub directories: DirectoryStats,
}

impl ManifestReport {
  pub fn enqueued(&self) -> usize {
    self.sections.iter().map(|s| s.stats.enqueued).sum()
  }
}

/// Outcome of indexing the vendor overlay tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverlayReport {
  /// Whether an overlay root exists under the source root.
  pub present: bool,
  pub enqueued: usize,
}

/// Outcome of a full planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
  pub manifests: Vec<ManifestReport>,
  pub overlay: OverlayReport,
}

impl PlanReport {
  pub fn enqueued(&self) -> usize {
    self.manifests.iter().map(ManifestReport::enqueued).sum::<usize>() + self.overlay.enqueued
  }
}
