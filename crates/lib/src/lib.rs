//! setupkit-lib: installation planning for INF-driven OS setup.
//!
//! This crate turns setup manifests into an ordered file copy plan:
//! - `inf`: the manifest store and its INF text loader
//! - `plan`: directory and file record resolution, section builders, overlay indexing
//! - `queue`: the copy queue and its one-shot commit
//! - `session`: the roots and error reporting shared by every planning step

pub mod consts;
pub mod fs;
pub mod inf;
pub mod plan;
pub mod platform;
pub mod queue;
pub mod session;
