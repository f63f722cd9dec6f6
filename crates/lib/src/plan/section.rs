//! Section builders and per-manifest planning.

use tracing::{debug, info, warn};

use crate::consts::{
  CABINET_FILES_SECTION, COMPUTER_FILES_PREFIX, DIRECTORIES_SECTION, SOURCE_DISKS_FILES_SECTION, fields,
};
use crate::fs::{DirStatus, Filesystem};
use crate::inf::{InfSource, section_lines};
use crate::queue::{CopyQueue, FileCopyInstruction};
use crate::session::SetupSession;

use super::dirs::{DIRECTORY_TABLES, lookup_directory_by_id};
use super::entry::{EntryLookup, resolve_file_entry};
use super::paths::{DirectoryKind, build_full_directory_path, combine_paths};
use super::types::{DirectoryStats, ManifestReport, PlanError, SectionReport, SectionStats, SetupErrorCode};

/// Enqueue every file record of `section` from a setup manifest.
///
/// Any record that cannot be resolved aborts the section: instructions
/// enqueued before it stay in the queue. Records the queue refuses are
/// skipped.
pub fn add_section_to_copy_queue<S: InfSource + ?Sized>(
  session: &SetupSession,
  queue: &mut CopyQueue,
  inf: &S,
  section: &str,
) -> Result<SectionStats, PlanError> {
  let lines = section_lines(inf, section).ok_or_else(|| PlanError::SectionNotFound {
    section: section.to_string(),
  })?;
  let mut stats = SectionStats::default();

  for context in lines {
    stats.attempted += 1;

    let file_name = inf
      .field(&context, fields::SOURCE_FILE_NAME)
      .ok_or_else(|| PlanError::FieldMissing {
        section: section.to_string(),
        record: format!("line {}", context.line() + 1),
        field: fields::SOURCE_FILE_NAME,
      })?;
    let entry = resolve_file_entry(inf, session.arch(), EntryLookup::Context(&context))?;

    let source_root = combine_paths(&[session.source_root_path(), &entry.source_root_dir])?;
    let destination = combine_paths(&[session.destination_path(), &entry.target_directory])?;

    let instruction = FileCopyInstruction::new(source_root, file_name, destination)
      .with_relative_path(entry.source_relative_path)
      .with_destination_file_name(entry.target_file_name);

    match queue.enqueue(instruction) {
      Ok(()) => stats.enqueued += 1,
      Err(e) => {
        warn!(section, file = file_name, error = %e, "copy queue rejected file, skipping");
        stats.skipped += 1;
      }
    }
  }

  debug!(
    section,
    attempted = stats.attempted,
    enqueued = stats.enqueued,
    "section queued"
  );
  Ok(stats)
}

/// Enqueue every `name = targetDirId[, targetName]` record of a cabinet
/// manifest section, with `cabinet` as the container.
///
/// Records that cannot be resolved are logged and skipped; only a missing
/// section fails.
pub fn add_section_to_copy_queue_cab<S: InfSource + ?Sized>(
  session: &SetupSession,
  queue: &mut CopyQueue,
  inf: &S,
  section: &str,
  cabinet: &str,
) -> Result<SectionStats, PlanError> {
  let lines = section_lines(inf, section).ok_or_else(|| PlanError::SectionNotFound {
    section: section.to_string(),
  })?;
  let mut stats = SectionStats::default();

  for context in lines {
    stats.attempted += 1;

    let Some((Some(file_name), dir_id)) = inf.key_and_value(&context) else {
      warn!(section, cabinet, line = context.line() + 1, "record has no file name or target directory, skipping");
      stats.skipped += 1;
      continue;
    };

    let target_dir = match lookup_directory_by_id(inf, dir_id) {
      Ok(dir) => dir,
      Err(e) => {
        warn!(section, cabinet, file = file_name, error = %e, "cannot resolve target directory, skipping");
        stats.skipped += 1;
        continue;
      }
    };

    let destination = match combine_paths(&[session.destination_path(), target_dir]) {
      Ok(path) => path,
      Err(e) => {
        warn!(section, cabinet, file = file_name, error = %e, "cannot compose destination, skipping");
        stats.skipped += 1;
        continue;
      }
    };

    let target_name = inf
      .non_empty_field(&context, fields::CABINET_TARGET_FILE_NAME)
      .map(str::to_string);
    let instruction = FileCopyInstruction::new(session.source_path(), file_name, destination)
      .with_container(Some(cabinet.to_string()))
      .with_destination_file_name(target_name);

    match queue.enqueue(instruction) {
      Ok(()) => stats.enqueued += 1,
      Err(e) => {
        warn!(section, cabinet, file = file_name, error = %e, "copy queue rejected file, skipping");
        stats.skipped += 1;
      }
    }
  }

  if stats.all_skipped() {
    warn!(section, cabinet, attempted = stats.attempted, "no record of the section could be queued");
  }
  Ok(stats)
}

/// Create every directory listed in `Directories` (or `WinntDirectories`).
///
/// Entries that resolve to the installation directory are left alone, it is
/// created before this pass. Overlong paths are skipped; any creation
/// failure other than "already exists" is fatal.
pub fn create_directories<S, F>(session: &SetupSession, fs: &F, inf: &S) -> Result<DirectoryStats, PlanError>
where
  S: InfSource + ?Sized,
  F: Filesystem + ?Sized,
{
  let (table, lines) = DIRECTORY_TABLES
    .iter()
    .find_map(|table| section_lines(inf, table).map(|lines| (*table, lines)))
    .ok_or_else(|| PlanError::SectionNotFound {
      section: DIRECTORIES_SECTION.to_string(),
    })?;
  let mut stats = DirectoryStats::default();

  for context in lines {
    let Some((_, fragment)) = inf.key_and_value(&context) else {
      warn!(table, line = context.line() + 1, "directory entry has no value, skipping");
      stats.skipped += 1;
      continue;
    };

    let composed = build_full_directory_path(session.destination_root_path(), session.install_path(), fragment);
    let composed = match composed {
      Ok(composed) => composed,
      Err(e) => {
        warn!(table, fragment, error = %e, "cannot build directory path, skipping");
        stats.skipped += 1;
        continue;
      }
    };
    if composed.kind == DirectoryKind::InstallPath {
      continue;
    }

    match fs.create_directory(&composed.path) {
      Ok(DirStatus::Created) => {
        debug!(path = %composed.path, "created directory");
        stats.created += 1;
      }
      Ok(DirStatus::AlreadyExists) => stats.existing += 1,
      Err(source) => {
        return Err(PlanError::CreateDirectoryFailed {
          path: composed.path,
          source,
        });
      }
    }
  }

  Ok(stats)
}

/// Plan one manifest: its file sections, the installation directory and the
/// directory pass.
///
/// With `cabinet` unset the manifest is the setup manifest and its
/// `SourceDisksFiles` sections (plus `Files.<computer type>`) are queued;
/// otherwise it describes `cabinet` and its `SourceFiles` section is queued.
/// Failures are recorded on the session before being returned.
pub fn prepare_manifest_copies<S, F>(
  session: &mut SetupSession,
  queue: &mut CopyQueue,
  fs: &F,
  inf: &S,
  cabinet: Option<&str>,
) -> Result<ManifestReport, PlanError>
where
  S: InfSource + ?Sized,
  F: Filesystem + ?Sized,
{
  let mut report = ManifestReport {
    cabinet: cabinet.map(str::to_string),
    ..Default::default()
  };

  match cabinet {
    None => {
      let platform = session.arch().section(SOURCE_DISKS_FILES_SECTION);
      if inf.has_section(&platform) {
        match add_section_to_copy_queue(session, queue, inf, &platform) {
          Ok(stats) => report.sections.push(SectionReport {
            section: platform,
            stats,
          }),
          Err(e) => warn!(section = %platform, error = %e, "platform file section failed, continuing"),
        }
      } else {
        debug!(section = %platform, "no platform file section");
      }

      let stats = add_section_to_copy_queue(session, queue, inf, SOURCE_DISKS_FILES_SECTION).inspect_err(|_| {
        session.report(SetupErrorCode::TxtSetupSection, Some(SOURCE_DISKS_FILES_SECTION));
      })?;
      report.sections.push(SectionReport {
        section: SOURCE_DISKS_FILES_SECTION.to_string(),
        stats,
      });

      if let Some(computer) = session.computer_type() {
        let section = format!("{}{}", COMPUTER_FILES_PREFIX, computer);
        match add_section_to_copy_queue(session, queue, inf, &section) {
          Ok(stats) => report.sections.push(SectionReport { section, stats }),
          Err(e) => {
            session.report(SetupErrorCode::TxtSetupSection, Some(section.as_str()));
            return Err(e);
          }
        }
      }
    }
    Some(cabinet) => {
      let stats =
        add_section_to_copy_queue_cab(session, queue, inf, CABINET_FILES_SECTION, cabinet).inspect_err(|_| {
          session.report(SetupErrorCode::CabinetSection, Some(CABINET_FILES_SECTION));
        })?;
      report.sections.push(SectionReport {
        section: CABINET_FILES_SECTION.to_string(),
        stats,
      });
    }
  }

  let install_dir = session.destination_path().to_string();
  if let Err(source) = fs.create_directory(&install_dir) {
    session.report(SetupErrorCode::CreateInstallDir, Some(install_dir.as_str()));
    return Err(PlanError::CreateDirectoryFailed {
      path: install_dir,
      source,
    });
  }

  report.directories = match create_directories(session, fs, inf) {
    Ok(stats) => stats,
    Err(e) => {
      match &e {
        PlanError::CreateDirectoryFailed { path, .. } => session.report(SetupErrorCode::CreateDir, Some(path.as_str())),
        _ => {
          let code = if cabinet.is_some() {
            SetupErrorCode::CabinetSection
          } else {
            SetupErrorCode::TxtSetupSection
          };
          session.report(code, Some(DIRECTORIES_SECTION));
        }
      }
      return Err(e);
    }
  };

  info!(
    cabinet = cabinet.unwrap_or(""),
    files = report.enqueued(),
    directories = report.directories.created,
    "manifest processed"
  );
  Ok(report)
}
