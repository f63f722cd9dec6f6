//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Setup manifest shipped on the test medium.
pub const SETUP_INF: &str = r#"
[SourceDisksNames]
1 = "Test CD",,,\reactos

[Directories]
1 = \
2 = system32
3 = system32\drivers

[SourceDisksFiles]
ntoskrnl.exe = 1,,,,,,,2,,,,
hal.dll = 1,,,,,,,2,,,halacpi.dll
disk.sys = 1,,,,,,,3,,,,
"#;

/// Isolated test environment.
///
/// The temp directory holds a source medium under `cd/` and an empty target
/// volume under `hd/`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Medium with [`SETUP_INF`] and one source file per record.
  pub fn with_medium() -> Self {
    let env = Self::empty();
    env.write_file("cd/reactos/txtsetup.sif", SETUP_INF);
    env.write_file("cd/reactos/ntoskrnl.exe", "kernel");
    env.write_file("cd/reactos/hal.dll", "hal");
    env.write_file("cd/reactos/disk.sys", "disk");
    env
  }

  /// Create an empty test environment.
  ///
  /// Use this when you need to manually set up the medium.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("hd")).unwrap();
    Self { temp }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Read a file relative to the temp directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.temp.path().join(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root().join("cd").join("reactos").join("txtsetup.sif")
  }

  /// Source medium root.
  pub fn source_root(&self) -> String {
    self.root().join("cd").to_string_lossy().into_owned()
  }

  /// Target volume root.
  pub fn dest_root(&self) -> String {
    self.root().join("hd").to_string_lossy().into_owned()
  }

  /// Installed file, relative to the installation directory.
  pub fn installed(&self, relative_path: &str) -> PathBuf {
    self.root().join("hd").join("ReactOS").join(relative_path)
  }

  /// Write a session file next to the manifest, referencing it by a relative path.
  pub fn write_session(&self) -> PathBuf {
    let session = serde_json::json!({
      "manifest": "txtsetup.sif",
      "source_root_path": self.source_root(),
      "source_root_dir": "\\reactos",
      "destination_root_path": self.dest_root(),
      "install_path": "\\ReactOS",
      "arch": "x86",
    });
    let path = self.root().join("cd").join("reactos").join("session.json");
    std::fs::write(&path, serde_json::to_string_pretty(&session).unwrap()).unwrap();
    path
  }

  /// Get a Command for the setupkit binary with the session passed as flags.
  pub fn setupkit_cmd(&self, subcommand: &str) -> Command {
    let mut cmd = Self::bare_cmd();
    cmd
      .arg(subcommand)
      .arg("--inf")
      .arg(self.manifest_path())
      .arg("--source-root")
      .arg(self.source_root())
      .arg("--source-dir")
      .arg("\\reactos")
      .arg("--dest-root")
      .arg(self.dest_root())
      .arg("--install-path")
      .arg("\\ReactOS")
      .arg("--arch")
      .arg("x86");
    cmd
  }

  /// Get a Command for the setupkit binary with no arguments.
  pub fn bare_cmd() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("setupkit");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
