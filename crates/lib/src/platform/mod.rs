//! Host platform detection.
//!
//! Only the architecture matters to planning: it selects the
//! platform-specific manifest sections consulted before the generic ones.

pub mod arch;

pub use arch::{Arch, arch};
