//! Manifest store.
//!
//! The planner only ever queries a manifest through [`InfSource`]: find the
//! first line of a section (optionally by key), step to the next line, and
//! read fields off a line. [`InfFile`] is the text-backed implementation.

mod parser;
mod types;

pub use parser::InfFile;
pub use types::{InfContext, InfError, InfLine, InfSection};

/// Read-only, section + key addressed line store.
pub trait InfSource {
  /// Whether `section` exists, even with no lines.
  fn has_section(&self, section: &str) -> bool;

  /// First line of `section`, or the first line whose field 0 equals `key`
  /// (ASCII case-insensitive) when a key is given.
  fn find_first_line(&self, section: &str, key: Option<&str>) -> Option<InfContext>;

  /// The line after `context` in the same section.
  fn find_next_line(&self, context: &InfContext) -> Option<InfContext>;

  /// Field `index` of the line at `context`; `None` when the line has fewer fields.
  fn field(&self, context: &InfContext, index: usize) -> Option<&str>;

  /// Key (if any) and first value of the line at `context`.
  fn key_and_value(&self, context: &InfContext) -> Option<(Option<&str>, &str)>;

  /// Field `index`, treating an empty string as absent.
  fn non_empty_field(&self, context: &InfContext, index: usize) -> Option<&str> {
    self.field(context, index).filter(|value| !value.is_empty())
  }
}

/// Every line of `section` in manifest order, starting from its first line.
///
/// Returns `None` when the section does not exist; an empty section yields
/// an empty iterator.
pub fn section_lines<'a, S: InfSource + ?Sized>(
  inf: &'a S,
  section: &str,
) -> Option<impl Iterator<Item = InfContext> + use<'a, S>> {
  if !inf.has_section(section) {
    return None;
  }
  let first = inf.find_first_line(section, None);
  Some(std::iter::successors(first, move |context| inf.find_next_line(context)))
}
