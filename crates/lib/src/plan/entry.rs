//! File record resolution.
//!
//! A `SourceDisksFiles` record names where a file comes from and where it
//! goes, through two levels of indirection:
//!
//! ```text
//! ntoskrnl.exe = 1,,,,,,,2,,,,,,
//!                |       |
//!                |       +-- field 8: target directory id -> [Directories]
//!                +---------- field 1: source disk id      -> [SourceDisksNames], field 4
//! ```

use tracing::debug;

use crate::consts::{SOURCE_DISKS_FILES_SECTION, SOURCE_DISKS_NAMES_SECTION, fields};
use crate::inf::{InfContext, InfSource};
use crate::platform::Arch;

use super::dirs::{find_in_tiers, lookup_directory_by_id};
use super::types::PlanError;

/// How the record to resolve is located.
#[derive(Debug, Clone, Copy)]
pub enum EntryLookup<'a> {
  /// A cursor already positioned on the record.
  Context(&'a InfContext),
  /// A file name to look up in `SourceDisksFiles.<arch>`, then `SourceDisksFiles`.
  FileName(&'a str),
}

/// Locations read off one file record. Paths are still relative to the
/// session roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
  /// Root path of the source disk, relative to the session source root.
  pub source_root_dir: String,
  /// Subdirectory under the source root; `None` when the file sits at the root.
  pub source_relative_path: Option<String>,
  /// Target directory fragment, relative to the session destination path.
  pub target_directory: String,
  /// Target file name; `None` keeps the source name.
  pub target_file_name: Option<String>,
}

/// Resolve the source and target locations of a file record.
pub fn resolve_file_entry<S: InfSource + ?Sized>(
  inf: &S,
  arch: Arch,
  lookup: EntryLookup<'_>,
) -> Result<ResolvedEntry, PlanError> {
  let file_sections = [arch.section(SOURCE_DISKS_FILES_SECTION), SOURCE_DISKS_FILES_SECTION.to_string()];

  let context = match lookup {
    EntryLookup::Context(context) => *context,
    EntryLookup::FileName(name) => {
      let tiers: Vec<&str> = file_sections.iter().map(String::as_str).collect();
      find_in_tiers(inf, &tiers, name)
        .map(|(_, context)| context)
        .ok_or_else(|| PlanError::RecordNotFound {
          file: name.to_string(),
          section: SOURCE_DISKS_FILES_SECTION.to_string(),
        })?
    }
  };

  let record = inf
    .field(&context, fields::SOURCE_FILE_NAME)
    .unwrap_or_default()
    .to_string();
  let missing = |field: usize| PlanError::FieldMissing {
    section: SOURCE_DISKS_FILES_SECTION.to_string(),
    record: record.clone(),
    field,
  };

  let source_root_id = inf.field(&context, fields::SOURCE_ROOT_ID).ok_or_else(|| missing(fields::SOURCE_ROOT_ID))?;
  let source_root_dir = lookup_source_disk(inf, arch, source_root_id)?;

  let source_relative_path = match inf.non_empty_field(&context, fields::SOURCE_RELATIVE_PATH) {
    Some(path) => Some(path.to_string()),
    None => inf
      .field(&context, fields::WINPE_DIR_ID)
      .and_then(|id| lookup_directory_by_id(inf, id).ok())
      .filter(|dir| !dir.is_empty())
      .map(str::to_string),
  };

  let target_dir_id = inf.field(&context, fields::TARGET_DIR_ID).ok_or_else(|| missing(fields::TARGET_DIR_ID))?;
  let target_directory = lookup_directory_by_id(inf, target_dir_id)?.to_string();

  let target_file_name = inf
    .non_empty_field(&context, fields::TARGET_FILE_NAME)
    .map(str::to_string);

  debug!(
    file = %record,
    source_root = %source_root_dir,
    source_relative = source_relative_path.as_deref().unwrap_or(""),
    target = %target_directory,
    target_name = target_file_name.as_deref().unwrap_or(""),
    "resolved file entry"
  );

  Ok(ResolvedEntry {
    source_root_dir,
    source_relative_path,
    target_directory,
    target_file_name,
  })
}

/// Root path of a source disk, from `SourceDisksNames.<arch>` then `SourceDisksNames`.
fn lookup_source_disk<S: InfSource + ?Sized>(inf: &S, arch: Arch, id: &str) -> Result<String, PlanError> {
  let platform = arch.section(SOURCE_DISKS_NAMES_SECTION);
  let tiers = [platform.as_str(), SOURCE_DISKS_NAMES_SECTION];

  let (tier, context) = find_in_tiers(inf, &tiers, id).ok_or_else(|| PlanError::DirectoryLookupFailed {
    id: id.to_string(),
    section: SOURCE_DISKS_NAMES_SECTION.to_string(),
  })?;

  inf
    .field(&context, fields::SOURCE_DISK_PATH)
    .map(str::to_string)
    .ok_or_else(|| PlanError::FieldMissing {
      section: tiers[tier].to_string(),
      record: id.to_string(),
      field: fields::SOURCE_DISK_PATH,
    })
}
