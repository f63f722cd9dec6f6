use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target architectures that carry platform-specific manifest sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86,
  Amd64,
  Arm,
  Arm64,
}

impl Arch {
  /// Detect the host CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86" => Some(Self::X86),
      "x86_64" => Some(Self::Amd64),
      "arm" => Some(Self::Arm),
      "aarch64" => Some(Self::Arm64),
      _ => None,
    }
  }

  /// Returns the suffix used by platform-specific sections (`SourceDisksFiles.<suffix>`)
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::Amd64 => "amd64",
      Self::Arm => "arm",
      Self::Arm64 => "arm64",
    }
  }

  /// Name of the platform-specific variant of `section`
  pub fn section(&self, section: &str) -> String {
    format!("{}.{}", section, self.as_str())
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "x86" | "i386" => Ok(Self::X86),
      "amd64" | "x86_64" => Ok(Self::Amd64),
      "arm" => Ok(Self::Arm),
      "arm64" | "aarch64" => Ok(Self::Arm64),
      other => Err(format!("unsupported architecture: {}", other)),
    }
  }
}

/// Returns the host architecture, falling back to x86 when it has no manifest suffix
pub fn arch() -> Arch {
  Arch::current().unwrap_or(Arch::X86)
}
