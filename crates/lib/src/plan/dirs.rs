//! Directory id lookup.

use tracing::debug;

use crate::consts::{DIRECTORIES_SECTION, WINNT_DIRECTORIES_SECTION};
use crate::inf::{InfContext, InfSource};

use super::types::PlanError;

/// Sections consulted for a directory id, in order.
pub const DIRECTORY_TABLES: [&str; 2] = [DIRECTORIES_SECTION, WINNT_DIRECTORIES_SECTION];

/// First line keyed `key` in the first of `sections` that has one.
pub fn find_in_tiers<S: InfSource + ?Sized>(inf: &S, sections: &[&str], key: &str) -> Option<(usize, InfContext)> {
  sections
    .iter()
    .enumerate()
    .find_map(|(tier, section)| inf.find_first_line(section, Some(key)).map(|context| (tier, context)))
}

/// Resolve a directory id to its path fragment.
///
/// `Directories` is searched first, then `WinntDirectories`. A matching line
/// without a value fails the lookup; the next table is not consulted.
pub fn lookup_directory_by_id<'a, S: InfSource + ?Sized>(inf: &'a S, dir_id: &str) -> Result<&'a str, PlanError> {
  let not_found = || PlanError::DirectoryLookupFailed {
    id: dir_id.to_string(),
    section: DIRECTORIES_SECTION.to_string(),
  };

  let (tier, context) = find_in_tiers(inf, &DIRECTORY_TABLES, dir_id).ok_or_else(not_found)?;
  let fragment = inf.field(&context, 1).ok_or_else(|| PlanError::FieldMissing {
    section: DIRECTORY_TABLES[tier].to_string(),
    record: dir_id.to_string(),
    field: 1,
  })?;

  debug!(id = dir_id, table = DIRECTORY_TABLES[tier], fragment, "resolved directory id");
  Ok(fragment)
}
