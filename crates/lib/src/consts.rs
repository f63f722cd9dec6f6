//! Well-known names shared across the planner.

/// Maximum length of a composed path, in characters, including the terminator slot.
pub const MAX_PATH: usize = 260;

/// Path separator used by manifests and planned paths.
pub const SEPARATOR: char = '\\';

/// Primary directory table.
pub const DIRECTORIES_SECTION: &str = "Directories";

/// Windows-compatible fallback directory table.
pub const WINNT_DIRECTORIES_SECTION: &str = "WinntDirectories";

pub const SOURCE_DISKS_FILES_SECTION: &str = "SourceDisksFiles";
pub const SOURCE_DISKS_NAMES_SECTION: &str = "SourceDisksNames";
pub const CABINETS_SECTION: &str = "Cabinets";
pub const CABINET_FILES_SECTION: &str = "SourceFiles";
pub const STRINGS_SECTION: &str = "Strings";

/// Prefix of the per-computer-type file section (`Files.<id>`).
pub const COMPUTER_FILES_PREFIX: &str = "Files.";

/// Vendor overlay root, directly under the source root.
pub const OEM_ROOT: &str = "$OEM$";
/// Overlay subtree merged into the installation directory.
pub const OEM_INSTALL_SUBTREE: &str = "$$";
/// Overlay subtree merged into the root of the target volume.
pub const OEM_VOLUME_SUBTREE: &str = "$1";

/// Field indices of a `SourceDisksFiles` record.
pub mod fields {
  pub const SOURCE_FILE_NAME: usize = 0;
  pub const SOURCE_ROOT_ID: usize = 1;
  pub const SOURCE_RELATIVE_PATH: usize = 2;
  pub const TARGET_DIR_ID: usize = 8;
  pub const TARGET_FILE_NAME: usize = 11;
  pub const WINPE_DIR_ID: usize = 13;

  /// Root path field of a `SourceDisksNames` record.
  pub const SOURCE_DISK_PATH: usize = 4;

  /// Optional target file name of a cabinet `SourceFiles` record.
  pub const CABINET_TARGET_FILE_NAME: usize = 2;
}
