//! Setup session state.
//!
//! The session carries the source and destination roots every resolver
//! composes against, the target architecture, and the error reporting
//! surface (`last_error` plus an optional hook).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::plan::paths::{PathError, combine_paths};
use crate::plan::types::SetupErrorCode;
use crate::platform::Arch;

/// Callback invoked whenever planning records a failure.
pub type ErrorHook = Box<dyn FnMut(SetupErrorCode, Option<&str>)>;

/// The four roots a session is built from.
///
/// Example (installing from a CD onto the first partition):
///
/// ```text
/// source_root_path       \Device\CdRom0
/// source_root_dir        \reactos
/// destination_root_path  \Device\Harddisk0\Partition1\
/// install_path           \ReactOS
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPaths {
  pub source_root_path: String,
  pub source_root_dir: String,
  pub destination_root_path: String,
  pub install_path: String,
}

/// Shared planning context.
pub struct SetupSession {
  paths: SessionPaths,
  source_path: String,
  destination_path: String,
  arch: Arch,
  computer_type: Option<String>,
  last_error: Option<SetupErrorCode>,
  error_hook: Option<ErrorHook>,
}

impl SetupSession {
  /// Build a session, composing the derived source and destination paths.
  pub fn new(paths: SessionPaths, arch: Arch) -> Result<Self, PathError> {
    let source_path = combine_paths(&[&paths.source_root_path, &paths.source_root_dir])?;
    let destination_path = combine_paths(&[&paths.destination_root_path, &paths.install_path])?;

    Ok(Self {
      paths,
      source_path,
      destination_path,
      arch,
      computer_type: None,
      last_error: None,
      error_hook: None,
    })
  }

  /// Select the computer type whose `Files.<id>` section is added to the plan.
  pub fn with_computer_type(mut self, id: impl Into<String>) -> Self {
    self.computer_type = Some(id.into());
    self
  }

  /// Install a hook called with the error code and failing section or path.
  pub fn with_error_hook(mut self, hook: impl FnMut(SetupErrorCode, Option<&str>) + 'static) -> Self {
    self.error_hook = Some(Box::new(hook));
    self
  }

  pub fn paths(&self) -> &SessionPaths {
    &self.paths
  }

  pub fn source_root_path(&self) -> &str {
    &self.paths.source_root_path
  }

  /// `source_root_path ⧺ source_root_dir`
  pub fn source_path(&self) -> &str {
    &self.source_path
  }

  pub fn destination_root_path(&self) -> &str {
    &self.paths.destination_root_path
  }

  pub fn install_path(&self) -> &str {
    &self.paths.install_path
  }

  /// `destination_root_path ⧺ install_path`
  pub fn destination_path(&self) -> &str {
    &self.destination_path
  }

  pub fn arch(&self) -> Arch {
    self.arch
  }

  pub fn computer_type(&self) -> Option<&str> {
    self.computer_type.as_deref()
  }

  /// Code of the most recent failure, if any.
  pub fn last_error(&self) -> Option<SetupErrorCode> {
    self.last_error
  }

  /// Record a failure and notify the hook.
  pub fn report(&mut self, code: SetupErrorCode, context: Option<&str>) {
    error!(code = ?code, context = context.unwrap_or(""), "{}", code);
    self.last_error = Some(code);
    if let Some(hook) = self.error_hook.as_mut() {
      hook(code, context);
    }
  }
}

impl fmt::Debug for SetupSession {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SetupSession")
      .field("paths", &self.paths)
      .field("source_path", &self.source_path)
      .field("destination_path", &self.destination_path)
      .field("arch", &self.arch)
      .field("computer_type", &self.computer_type)
      .field("last_error", &self.last_error)
      .field("error_hook", &self.error_hook.is_some())
      .finish()
  }
}

/// Errors loading a session file.
#[derive(Debug, Error)]
pub enum SessionConfigError {
  #[error("failed to read session file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse session file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// On-disk session description.
///
/// ```json
/// {
///   "manifest": "txtsetup.sif",
///   "source_root_path": "D:",
///   "source_root_dir": "\\reactos",
///   "destination_root_path": "C:\\",
///   "install_path": "\\ReactOS",
///   "arch": "x86",
///   "computer_type": "i386_pc"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub manifest: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_root_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_root_dir: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination_root_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub install_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub arch: Option<Arch>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub computer_type: Option<String>,
}

impl SessionConfig {
  /// Load a session description from a JSON file.
  pub fn load(path: &Path) -> Result<Self, SessionConfigError> {
    let content = fs::read_to_string(path).map_err(|source| SessionConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| SessionConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Fill unset fields from `other`.
  pub fn or(self, other: SessionConfig) -> SessionConfig {
    SessionConfig {
      manifest: self.manifest.or(other.manifest),
      source_root_path: self.source_root_path.or(other.source_root_path),
      source_root_dir: self.source_root_dir.or(other.source_root_dir),
      destination_root_path: self.destination_root_path.or(other.destination_root_path),
      install_path: self.install_path.or(other.install_path),
      arch: self.arch.or(other.arch),
      computer_type: self.computer_type.or(other.computer_type),
    }
  }

  /// The session roots, or the name of the first missing one.
  ///
  /// `source_root_dir` and `install_path` default to empty.
  pub fn paths(&self) -> Result<SessionPaths, &'static str> {
    Ok(SessionPaths {
      source_root_path: self.source_root_path.clone().ok_or("source_root_path")?,
      source_root_dir: self.source_root_dir.clone().unwrap_or_default(),
      destination_root_path: self.destination_root_path.clone().ok_or("destination_root_path")?,
      install_path: self.install_path.clone().unwrap_or_default(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::rc::Rc;
  use tempfile::TempDir;

  fn cd_paths() -> SessionPaths {
    SessionPaths {
      source_root_path: "\\Device\\CdRom0".to_string(),
      source_root_dir: "\\reactos".to_string(),
      destination_root_path: "\\Device\\Harddisk0\\Partition1\\".to_string(),
      install_path: "\\ReactOS".to_string(),
    }
  }

  #[test]
  fn derives_source_and_destination_paths() {
    let session = SetupSession::new(cd_paths(), Arch::X86).unwrap();
    assert_eq!(session.source_path(), "\\Device\\CdRom0\\reactos");
    assert_eq!(session.destination_path(), "\\Device\\Harddisk0\\Partition1\\ReactOS");
  }

  #[test]
  fn report_sets_last_error_and_calls_hook() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut session = SetupSession::new(cd_paths(), Arch::X86)
      .unwrap()
      .with_error_hook(move |code, context| sink.borrow_mut().push((code, context.map(str::to_string))));

    assert_eq!(session.last_error(), None);
    session.report(SetupErrorCode::CreateDir, Some("\\x"));

    assert_eq!(session.last_error(), Some(SetupErrorCode::CreateDir));
    assert_eq!(
      seen.borrow().as_slice(),
      &[(SetupErrorCode::CreateDir, Some("\\x".to_string()))]
    );
  }

  #[test]
  fn config_loads_and_merges() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("session.json");
    fs::write(
      &file,
      r#"{ "source_root_path": "D:", "destination_root_path": "C:\\", "install_path": "\\ReactOS", "arch": "amd64" }"#,
    )
    .unwrap();

    let from_file = SessionConfig::load(&file).unwrap();
    let overrides = SessionConfig {
      install_path: Some("\\Other".to_string()),
      ..Default::default()
    };
    let merged = overrides.or(from_file);

    assert_eq!(merged.arch, Some(Arch::Amd64));
    let paths = merged.paths().unwrap();
    assert_eq!(paths.install_path, "\\Other");
    assert_eq!(paths.source_root_dir, "");
  }

  #[test]
  fn config_reports_missing_root() {
    let config = SessionConfig {
      source_root_path: Some("D:".to_string()),
      ..Default::default()
    };
    assert_eq!(config.paths().unwrap_err(), "destination_root_path");
  }

  #[test]
  fn config_rejects_bad_json() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("session.json");
    fs::write(&file, "{ not json").unwrap();
    assert!(matches!(SessionConfig::load(&file), Err(SessionConfigError::Parse { .. })));
  }
}
