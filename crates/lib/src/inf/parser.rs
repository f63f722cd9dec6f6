//! INF text loader.
//!
//! Understands the subset of the INF syntax setup manifests rely on:
//! `[Section]` headers, `key = v1, v2` and keyless `v1, v2` lines, `;`
//! comments, double-quoted values with `""` escapes, and `%name%`
//! substitution from the `[Strings]` section. Section names and keys match
//! case-insensitively; repeated sections are concatenated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::consts::STRINGS_SECTION;

use super::InfSource;
use super::types::{InfContext, InfError, InfLine, InfSection};

/// An in-memory manifest.
#[derive(Debug, Clone, Default)]
pub struct InfFile {
  sections: Vec<InfSection>,
  index: HashMap<String, usize>,
}

impl InfFile {
  /// Read and parse a manifest file.
  pub fn open(path: &Path) -> Result<Self, InfError> {
    let bytes = fs::read(path).map_err(|source| InfError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let text = decode(&bytes, path)?;
    let inf = Self::parse(&text)?;
    debug!(path = %path.display(), sections = inf.sections.len(), "loaded manifest");
    Ok(inf)
  }

  /// Parse manifest text.
  pub fn parse(text: &str) -> Result<Self, InfError> {
    let mut inf = InfFile::default();
    let mut current: Option<usize> = None;

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    for (number, raw) in text.lines().enumerate() {
      let number = number + 1;
      let trimmed = raw.trim();
      if trimmed.is_empty() || trimmed.starts_with(';') {
        continue;
      }

      if let Some(rest) = trimmed.strip_prefix('[') {
        let end = rest.find(']').ok_or(InfError::UnterminatedSection { line: number })?;
        current = Some(inf.section_slot(rest[..end].trim()));
        continue;
      }

      let section = current.ok_or(InfError::LineOutsideSection { line: number })?;
      if let Some(line) = parse_line(trimmed, number)? {
        inf.sections[section].lines.push(line);
      }
    }

    inf.substitute_strings();
    Ok(inf)
  }

  /// Look up a section by name.
  pub fn section(&self, name: &str) -> Option<&InfSection> {
    self.index.get(&name.to_ascii_lowercase()).map(|&i| &self.sections[i])
  }

  /// All sections in first-seen order.
  pub fn sections(&self) -> &[InfSection] {
    &self.sections
  }

  fn section_slot(&mut self, name: &str) -> usize {
    let lower = name.to_ascii_lowercase();
    if let Some(&i) = self.index.get(&lower) {
      return i;
    }
    self.sections.push(InfSection {
      name: name.to_string(),
      lines: Vec::new(),
    });
    let i = self.sections.len() - 1;
    self.index.insert(lower, i);
    i
  }

  fn line(&self, context: &InfContext) -> Option<&InfLine> {
    self.sections.get(context.section())?.lines.get(context.line())
  }

  fn substitute_strings(&mut self) {
    let strings_index = self.index.get(&STRINGS_SECTION.to_ascii_lowercase()).copied();

    let strings: HashMap<String, String> = strings_index
      .map(|i| {
        self.sections[i]
          .lines
          .iter()
          .filter_map(|line| {
            let key = line.key.as_ref()?;
            Some((key.to_ascii_lowercase(), line.values.first().cloned().unwrap_or_default()))
          })
          .collect()
      })
      .unwrap_or_default();

    for (i, section) in self.sections.iter_mut().enumerate() {
      if Some(i) == strings_index {
        continue;
      }
      for line in &mut section.lines {
        if let Some(key) = &mut line.key {
          *key = expand(key, &strings);
        }
        for value in &mut line.values {
          *value = expand(value, &strings);
        }
      }
    }
  }
}

impl InfSource for InfFile {
  fn has_section(&self, section: &str) -> bool {
    self.index.contains_key(&section.to_ascii_lowercase())
  }

  fn find_first_line(&self, section: &str, key: Option<&str>) -> Option<InfContext> {
    let &section_index = self.index.get(&section.to_ascii_lowercase())?;
    let lines = &self.sections[section_index].lines;

    let position = match key {
      None => (!lines.is_empty()).then_some(0),
      Some(key) => lines
        .iter()
        .position(|line| line.field(0).is_some_and(|k| k.eq_ignore_ascii_case(key))),
    }?;

    Some(InfContext::new(section_index, position))
  }

  fn find_next_line(&self, context: &InfContext) -> Option<InfContext> {
    let next = InfContext::new(context.section(), context.line() + 1);
    self.line(&next).map(|_| next)
  }

  fn field(&self, context: &InfContext, index: usize) -> Option<&str> {
    self.line(context)?.field(index)
  }

  fn key_and_value(&self, context: &InfContext) -> Option<(Option<&str>, &str)> {
    let line = self.line(context)?;
    let value = line.values.first()?;
    Some((line.key.as_deref(), value.as_str()))
  }
}

/// Decode manifest bytes. UTF-16 files are recognised by their byte order
/// mark; anything else is read as UTF-8, with invalid bytes replaced.
fn decode(bytes: &[u8], path: &Path) -> Result<String, InfError> {
  let (body, little_endian, encoding) = match bytes {
    [0xFF, 0xFE, rest @ ..] => (rest, true, "UTF-16LE"),
    [0xFE, 0xFF, rest @ ..] => (rest, false, "UTF-16BE"),
    _ => {
      return Ok(match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
          warn!(
            path = %path.display(),
            offset = e.valid_up_to(),
            "manifest is not valid UTF-8, replacing invalid bytes"
          );
          String::from_utf8_lossy(bytes).into_owned()
        }
      });
    }
  };

  let invalid = || InfError::Encoding {
    path: path.to_path_buf(),
    encoding,
  };
  if body.len() % 2 != 0 {
    return Err(invalid());
  }
  let units = body.chunks_exact(2).map(|pair| {
    let pair = [pair[0], pair[1]];
    if little_endian {
      u16::from_le_bytes(pair)
    } else {
      u16::from_be_bytes(pair)
    }
  });
  char::decode_utf16(units)
    .collect::<Result<String, _>>()
    .map_err(|_| invalid())
}

/// Split one data line into key and values. Returns `None` for a line that
/// holds nothing but a comment.
fn parse_line(text: &str, number: usize) -> Result<Option<InfLine>, InfError> {
  let mut key: Option<String> = None;
  let mut values: Vec<String> = Vec::new();
  let mut field = FieldBuilder::default();
  let mut in_quotes = false;
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      if c == '"' {
        if chars.peek() == Some(&'"') {
          chars.next();
          field.push_significant('"');
        } else {
          in_quotes = false;
        }
      } else {
        field.push_significant(c);
      }
      continue;
    }

    match c {
      '"' => {
        in_quotes = true;
        field.mark_quoted();
      }
      ';' => break,
      '=' if key.is_none() && values.is_empty() => key = Some(field.finish()),
      ',' => values.push(field.finish()),
      c => field.push(c),
    }
  }

  if in_quotes {
    return Err(InfError::UnterminatedQuote { line: number });
  }

  let last = field.finish();
  if key.is_some() {
    // `key =` with nothing after it carries no values
    if !values.is_empty() || !last.is_empty() {
      values.push(last);
    }
  } else if !values.is_empty() || !last.is_empty() {
    values.push(last);
  } else {
    return Ok(None);
  }

  Ok(Some(InfLine { key, values }))
}

/// Accumulates one field, trimming unquoted surrounding whitespace.
#[derive(Default)]
struct FieldBuilder {
  text: String,
  significant_len: usize,
}

impl FieldBuilder {
  fn push(&mut self, c: char) {
    if c.is_whitespace() {
      if self.significant_len > 0 {
        self.text.push(c);
      }
    } else {
      self.push_significant(c);
    }
  }

  fn push_significant(&mut self, c: char) {
    self.text.push(c);
    self.significant_len = self.text.len();
  }

  fn mark_quoted(&mut self) {
    // an empty quoted string is still a value; keep anything already seen
    self.significant_len = self.text.len().max(self.significant_len);
  }

  fn finish(&mut self) -> String {
    self.text.truncate(self.significant_len);
    self.significant_len = 0;
    std::mem::take(&mut self.text)
  }
}

fn expand(value: &str, strings: &HashMap<String, String>) -> String {
  if !value.contains('%') {
    return value.to_string();
  }

  let mut out = String::with_capacity(value.len());
  let mut rest = value;
  while let Some(start) = rest.find('%') {
    out.push_str(&rest[..start]);
    let after = &rest[start + 1..];
    match after.find('%') {
      Some(0) => {
        out.push('%');
        rest = &after[1..];
      }
      Some(end) => {
        let name = &after[..end];
        match strings.get(&name.to_ascii_lowercase()) {
          Some(replacement) => out.push_str(replacement),
          None => {
            out.push('%');
            out.push_str(name);
            out.push('%');
          }
        }
        rest = &after[end + 1..];
      }
      None => {
        out.push('%');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}
