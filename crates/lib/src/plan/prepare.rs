//! Whole-installation planning.

use tracing::{debug, info, warn};

use crate::consts::CABINETS_SECTION;
use crate::fs::Filesystem;
use crate::inf::{InfFile, InfSource, section_lines};
use crate::queue::CopyQueue;
use crate::session::SetupSession;

use super::oem::index_oem_folders;
use super::paths::{cabinet_manifest_path, combine_paths, native_path};
use super::section::prepare_manifest_copies;
use super::types::{PlanError, PlanReport, SetupErrorCode};

/// A planned installation, ready to commit.
#[derive(Debug)]
pub struct PreparedCopies {
  pub queue: CopyQueue,
  pub report: PlanReport,
}

/// Plan the setup manifest, every cabinet it lists, then the overlay tree.
pub fn prepare_all_copies<S, F>(session: &mut SetupSession, fs: &F, setup_inf: &S) -> Result<PreparedCopies, PlanError>
where
  S: InfSource + ?Sized,
  F: Filesystem + ?Sized,
{
  let mut queue = CopyQueue::new();
  let mut report = PlanReport::default();

  report
    .manifests
    .push(prepare_manifest_copies(session, &mut queue, fs, setup_inf, None)?);

  match section_lines(setup_inf, CABINETS_SECTION) {
    Some(cabinets) => {
      for context in cabinets {
        let Some((_, cabinet)) = setup_inf.key_and_value(&context) else {
          warn!(line = context.line() + 1, "cabinet entry has no name, skipping");
          continue;
        };

        let cabinet_path = combine_paths(&[session.source_path(), cabinet]).inspect_err(|_| {
          session.report(SetupErrorCode::InvalidCabinetInf, Some(cabinet));
        })?;
        let manifest_path = cabinet_manifest_path(&cabinet_path);
        let cabinet_inf = match InfFile::open(&native_path(&manifest_path)) {
          Ok(inf) => inf,
          Err(source) => {
            session.report(SetupErrorCode::InvalidCabinetInf, Some(manifest_path.as_str()));
            return Err(PlanError::CabinetManifest {
              path: manifest_path,
              source,
            });
          }
        };
        info!(cabinet, manifest = %manifest_path, "opened cabinet manifest");

        report
          .manifests
          .push(prepare_manifest_copies(session, &mut queue, fs, &cabinet_inf, Some(cabinet))?);
      }
    }
    None => debug!("no cabinets listed"),
  }

  report.overlay = index_oem_folders(session, fs, &mut queue).inspect_err(|_| {
    session.report(SetupErrorCode::CopyQueue, None);
  })?;

  info!(
    manifests = report.manifests.len(),
    files = queue.len(),
    directories = queue.directories().len(),
    "copy plan ready"
  );
  Ok(PreparedCopies { queue, report })
}
