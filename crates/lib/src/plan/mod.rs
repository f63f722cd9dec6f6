//! Copy planning.
//!
//! Turns setup manifests and the vendor overlay tree into an ordered
//! [`CopyQueue`](crate::queue::CopyQueue), creating directories on the way.
//! Planning order is: setup manifest file sections, installation and
//! manifest directories, each cabinet manifest in `Cabinets` order, then the
//! overlay.

pub mod dirs;
pub mod entry;
pub mod oem;
pub mod paths;
pub mod prepare;
pub mod section;
pub mod types;

pub use dirs::lookup_directory_by_id;
pub use entry::{EntryLookup, ResolvedEntry, resolve_file_entry};
pub use oem::{index_oem_folders, index_oem_subfolder};
pub use paths::{ComposedPath, DirectoryKind, PathError, build_full_directory_path, combine_paths};
pub use prepare::{PreparedCopies, prepare_all_copies};
pub use section::{add_section_to_copy_queue, add_section_to_copy_queue_cab, create_directories, prepare_manifest_copies};
pub use types::{
  DirectoryStats, ManifestReport, OverlayReport, PlanError, PlanReport, SectionReport, SectionStats, SetupErrorCode,
};
