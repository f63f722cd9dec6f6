//! Path composition for planned operations.
//!
//! Planned paths keep the manifest's backslash convention and are bounded by
//! [`MAX_PATH`]. They are only mapped onto the host filesystem at the edges
//! (see [`native_path`]).

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::consts::{MAX_PATH, SEPARATOR};

/// Errors raised while composing a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
  #[error("composed path is {len} characters, limit is {max}: {path}")]
  TooLong { path: String, len: usize, max: usize },
}

/// How a directory fragment relates to the installation directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryKind {
  /// Empty or `\`: the installation directory itself.
  InstallPath,
  /// Starts with `\`: relative to the volume root, ignoring the install path.
  Absolute,
  /// Anything else: relative to the installation directory.
  Relative,
}

impl DirectoryKind {
  pub fn classify(fragment: &str) -> Self {
    if fragment.is_empty() || fragment == "\\" {
      Self::InstallPath
    } else if fragment.starts_with(SEPARATOR) {
      Self::Absolute
    } else {
      Self::Relative
    }
  }
}

/// A composed directory path and its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPath {
  pub path: String,
  pub kind: DirectoryKind,
}

/// Join path components with exactly one separator between them.
///
/// Empty components and components made only of separators contribute
/// nothing. A leading separator on the first component is kept; trailing
/// separators are dropped unless the result would otherwise be a bare drive
/// (`C:`) or nothing at all.
pub fn combine_paths(components: &[&str]) -> Result<String, PathError> {
  let mut out = String::new();

  for component in components.iter().filter(|c| !c.is_empty()) {
    if out.is_empty() {
      let trimmed = component.trim_end_matches(SEPARATOR);
      if trimmed.is_empty() {
        out.push(SEPARATOR);
      } else {
        out.push_str(trimmed);
        if trimmed.ends_with(':') {
          out.push(SEPARATOR);
        }
      }
      continue;
    }

    let piece = component.trim_matches(SEPARATOR);
    if piece.is_empty() {
      continue;
    }
    if !out.ends_with(SEPARATOR) {
      out.push(SEPARATOR);
    }
    out.push_str(piece);
  }

  let len = out.chars().count();
  if len >= MAX_PATH {
    return Err(PathError::TooLong {
      path: out,
      len,
      max: MAX_PATH - 1,
    });
  }
  Ok(out)
}

/// Compose a directory from a manifest fragment.
///
/// - empty or `\` → `root ⧺ base` (the installation directory)
/// - `\abs\dir` → `root ⧺ fragment`
/// - `rel\dir` → `root ⧺ base ⧺ fragment`
pub fn build_full_directory_path(root: &str, base: &str, fragment: &str) -> Result<ComposedPath, PathError> {
  let kind = DirectoryKind::classify(fragment);
  let path = match kind {
    DirectoryKind::InstallPath => combine_paths(&[root, base])?,
    DirectoryKind::Absolute => combine_paths(&[root, fragment])?,
    DirectoryKind::Relative => combine_paths(&[root, base, fragment])?,
  };
  Ok(ComposedPath { path, kind })
}

/// Path of the manifest that describes a cabinet: the cabinet path with its
/// extension replaced by `.inf`.
pub fn cabinet_manifest_path(cabinet_path: &str) -> String {
  let name_start = cabinet_path.rfind(SEPARATOR).map_or(0, |i| i + 1);
  match cabinet_path[name_start..].rfind('.') {
    Some(dot) => format!("{}.inf", &cabinet_path[..name_start + dot]),
    None => format!("{}.inf", cabinet_path),
  }
}

/// Map a planned path onto the host filesystem.
#[cfg(windows)]
pub fn native_path(path: &str) -> PathBuf {
  PathBuf::from(path)
}

/// Map a planned path onto the host filesystem.
#[cfg(not(windows))]
pub fn native_path(path: &str) -> PathBuf {
  PathBuf::from(path.replace(SEPARATOR, "/"))
}
