//! Filesystem primitives used while planning.
//!
//! Planning creates directories eagerly and lists the overlay tree; both go
//! through [`Filesystem`] so the planner never touches `std::fs` directly.

use std::fs;
use std::io;

use crate::plan::paths::native_path;

/// Result of a directory creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
  Created,
  AlreadyExists,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
  pub name: String,
  pub is_dir: bool,
}

pub trait Filesystem {
  /// Open listing; the underlying handle is released when it is dropped.
  type Listing: Iterator<Item = io::Result<DirEntryInfo>>;

  /// Create `path` and any missing parents. An existing directory is not an error.
  fn create_directory(&self, path: &str) -> io::Result<DirStatus>;

  /// Open `path` for listing. A missing directory is reported as [`io::ErrorKind::NotFound`].
  fn open_directory(&self, path: &str) -> io::Result<Self::Listing>;
}

/// [`Filesystem`] backed by the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
  type Listing = StdListing;

  fn create_directory(&self, path: &str) -> io::Result<DirStatus> {
    let native = native_path(path);
    match fs::create_dir(&native) {
      Ok(()) => Ok(DirStatus::Created),
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
        if native.is_dir() {
          Ok(DirStatus::AlreadyExists)
        } else {
          Err(e)
        }
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        fs::create_dir_all(&native)?;
        Ok(DirStatus::Created)
      }
      Err(e) => Err(e),
    }
  }

  fn open_directory(&self, path: &str) -> io::Result<StdListing> {
    let native = native_path(path);
    if !native.is_dir() && native.exists() {
      return Err(io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("not a directory: {}", native.display()),
      ));
    }
    Ok(StdListing {
      inner: fs::read_dir(native)?,
    })
  }
}

/// Streaming listing over [`fs::ReadDir`].
#[derive(Debug)]
pub struct StdListing {
  inner: fs::ReadDir,
}

impl Iterator for StdListing {
  type Item = io::Result<DirEntryInfo>;

  fn next(&mut self) -> Option<Self::Item> {
    let entry = match self.inner.next()? {
      Ok(entry) => entry,
      Err(e) => return Some(Err(e)),
    };
    let is_dir = match entry.file_type() {
      Ok(file_type) => file_type.is_dir(),
      Err(e) => return Some(Err(e)),
    };
    Some(Ok(DirEntryInfo {
      name: entry.file_name().to_string_lossy().into_owned(),
      is_dir,
    }))
  }
}
