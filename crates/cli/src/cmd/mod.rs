mod apply;
mod plan;

pub use apply::cmd_apply;
pub use plan::cmd_plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use tracing::debug;

use setupkit_lib::inf::InfFile;
use setupkit_lib::plan::PlanReport;
use setupkit_lib::platform::{Arch, arch};
use setupkit_lib::queue::FileCopyInstruction;
use setupkit_lib::session::{SessionConfig, SetupSession};

use crate::output::{print_stat, print_warning, symbols};

/// Session options shared by `plan` and `apply`. Flags override the session file.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
  /// Session description (JSON)
  #[arg(long)]
  pub session: Option<PathBuf>,

  /// Setup manifest (txtsetup.sif)
  #[arg(long)]
  pub inf: Option<PathBuf>,

  /// Root of the installation source, e.g. `D:`
  #[arg(long)]
  pub source_root: Option<String>,

  /// Directory of the installation files under the source root, e.g. `\reactos`
  #[arg(long)]
  pub source_dir: Option<String>,

  /// Root of the target volume, e.g. `C:\`
  #[arg(long)]
  pub dest_root: Option<String>,

  /// Installation directory under the target volume, e.g. `\ReactOS`
  #[arg(long)]
  pub install_path: Option<String>,

  /// Target architecture (defaults to the host)
  #[arg(long)]
  pub arch: Option<Arch>,

  /// Computer type whose `Files.<id>` section is also copied
  #[arg(long)]
  pub computer: Option<String>,
}

/// A session ready for planning, with its setup manifest loaded.
pub struct LoadedSession {
  pub session: SetupSession,
  pub manifest_path: PathBuf,
  pub inf: InfFile,
}

impl SessionArgs {
  fn overrides(&self) -> SessionConfig {
    SessionConfig {
      manifest: self.inf.clone(),
      source_root_path: self.source_root.clone(),
      source_root_dir: self.source_dir.clone(),
      destination_root_path: self.dest_root.clone(),
      install_path: self.install_path.clone(),
      arch: self.arch,
      computer_type: self.computer.clone(),
    }
  }

  pub fn load(&self) -> Result<LoadedSession> {
    let mut file = match &self.session {
      Some(path) => {
        SessionConfig::load(path).with_context(|| format!("Failed to load session: {}", path.display()))?
      }
      None => SessionConfig::default(),
    };
    // manifest paths in a session file are relative to the file
    if let Some(session_path) = &self.session {
      file.manifest = file.manifest.take().map(|manifest| relative_to(session_path, &manifest));
    }

    let config = self.overrides().or(file);
    let manifest_path = config
      .manifest
      .clone()
      .context("No setup manifest given (use --inf or set \"manifest\" in the session file)")?;
    let manifest_path = dunce::canonicalize(&manifest_path).unwrap_or(manifest_path);
    let paths = config
      .paths()
      .map_err(|field| anyhow!("Session is missing {} (see --help)", field))?;

    let mut session = SetupSession::new(paths, config.arch.unwrap_or_else(arch)).context("Invalid session paths")?;
    if let Some(computer) = config.computer_type {
      session = session.with_computer_type(computer);
    }

    let inf = InfFile::open(&manifest_path)
      .with_context(|| format!("Failed to load setup manifest: {}", manifest_path.display()))?;
    debug!(
      manifest = %manifest_path.display(),
      source = session.source_path(),
      destination = session.destination_path(),
      arch = %session.arch(),
      "session loaded"
    );

    Ok(LoadedSession {
      session,
      manifest_path,
      inf,
    })
  }
}

fn relative_to(session_path: &Path, manifest: &Path) -> PathBuf {
  match session_path.parent() {
    Some(dir) if manifest.is_relative() => dir.join(manifest),
    _ => manifest.to_path_buf(),
  }
}

/// One-line `source → destination` rendering of an instruction.
pub fn describe(instruction: &FileCopyInstruction) -> String {
  let source = match instruction.container_path() {
    Ok(Some(cabinet)) => format!("{}:{}", cabinet, instruction.member_name()),
    _ => instruction
      .source_path()
      .unwrap_or_else(|_| instruction.source_file_name.clone()),
  };
  let destination = instruction
    .destination_path()
    .unwrap_or_else(|_| instruction.destination_directory.clone());
  format!("{} {} {}", source, symbols::ARROW, destination)
}

/// Per-manifest section statistics.
pub fn print_report(report: &PlanReport) {
  for manifest in &report.manifests {
    println!();
    match &manifest.cabinet {
      Some(cabinet) => println!("Cabinet {}:", cabinet),
      None => println!("Setup manifest:"),
    }
    for section in &manifest.sections {
      let stats = section.stats;
      let mut line = format!("{} queued", stats.enqueued);
      if stats.skipped > 0 {
        line.push_str(&format!(", {} skipped", stats.skipped));
      }
      print_stat(&section.section, &line);
      if stats.all_skipped() {
        print_warning(&format!("No file of [{}] could be queued", section.section));
      }
    }
    print_stat("Directories created", &manifest.directories.created.to_string());
  }

  println!();
  if report.overlay.present {
    print_stat("Overlay files", &report.overlay.enqueued.to_string());
  } else {
    print_stat("Overlay", "none");
  }
}
