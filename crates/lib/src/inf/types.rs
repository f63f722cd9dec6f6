use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Position of one line inside a manifest section.
///
/// Cursors are plain values: advancing produces a new cursor and never
/// invalidates the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfContext {
  section: usize,
  line: usize,
}

impl InfContext {
  pub fn new(section: usize, line: usize) -> Self {
    Self { section, line }
  }

  pub fn section(&self) -> usize {
    self.section
  }

  pub fn line(&self) -> usize {
    self.line
  }
}

/// One parsed manifest line.
///
/// `key = a, b` has key `key` and values `[a, b]`; a line without `=`
/// has no key and its comma-separated items are all values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfLine {
  pub key: Option<String>,
  pub values: Vec<String>,
}

impl InfLine {
  /// Field `index` using manifest numbering: field 0 is the key (or the first
  /// item of a keyless line) and fields 1.. follow in order.
  pub fn field(&self, index: usize) -> Option<&str> {
    match &self.key {
      Some(key) if index == 0 => Some(key.as_str()),
      Some(_) => self.values.get(index - 1).map(String::as_str),
      None => self.values.get(index).map(String::as_str),
    }
  }

  /// Number of fields excluding field 0.
  pub fn field_count(&self) -> usize {
    match self.key {
      Some(_) => self.values.len(),
      None => self.values.len().saturating_sub(1),
    }
  }
}

/// A named section and its lines, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfSection {
  pub name: String,
  pub lines: Vec<InfLine>,
}

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum InfError {
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("manifest {path} is not valid {encoding}")]
  Encoding { path: PathBuf, encoding: &'static str },

  #[error("line {line}: section header is missing ']'")]
  UnterminatedSection { line: usize },

  #[error("line {line}: unterminated quoted string")]
  UnterminatedQuote { line: usize },

  #[error("line {line}: data appears before the first section header")]
  LineOutsideSection { line: usize },
}
