//! Architecture identifiers and sub-build directory resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Environment variable naming the target architecture.
pub const ARCH_ENV: &str = "ARCH";

/// The architecture used when nothing selects one.
pub const DEFAULT_ARCH: &str = "arm";

/// Directory under the project root that holds per-architecture sub-builds.
pub const ARCH_SUBDIR: &str = "arch";

/// A validated architecture token.
///
/// Tokens are restricted to ASCII alphanumerics, `-`, and `_` so that an
/// `ArchId` can never name a path outside the `arch/` tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchId(String);

impl ArchId {
    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sub-build directory for this architecture: `<root>/arch/<id>/`.
    pub fn sub_build_dir(&self, root: &Path) -> PathBuf {
        root.join(ARCH_SUBDIR).join(&self.0)
    }

    /// Read an architecture from the `ARCH` environment variable, if set.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(ARCH_ENV) {
            Ok(token) => Ok(Some(token.parse()?)),
            Err(_) => Ok(None),
        }
    }
}

impl Default for ArchId {
    fn default() -> Self {
        ArchId(DEFAULT_ARCH.to_string())
    }
}

impl FromStr for ArchId {
    type Err = DispatchError;

    fn from_str(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(DispatchError::InvalidArch {
                token: token.to_string(),
                reason: "empty token".to_string(),
            });
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(DispatchError::InvalidArch {
                token: token.to_string(),
                reason: format!("character '{bad}' is not allowed"),
            });
        }
        Ok(ArchId(token.to_string()))
    }
}

impl TryFrom<String> for ArchId {
    type Error = DispatchError;

    fn try_from(token: String) -> Result<Self> {
        token.parse()
    }
}

impl From<ArchId> for String {
    fn from(arch: ArchId) -> String {
        arch.0
    }
}

impl fmt::Display for ArchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_arm() {
        assert_eq!(ArchId::default().as_str(), "arm");
    }

    #[test]
    fn parse_accepts_plain_tokens() {
        assert!("arm".parse::<ArchId>().is_ok());
        assert!("x86_64".parse::<ArchId>().is_ok());
        assert!("riscv64-gc".parse::<ArchId>().is_ok());
    }

    #[test]
    fn parse_rejects_empty() {
        assert!("".parse::<ArchId>().is_err());
    }

    #[test]
    fn parse_rejects_path_separators() {
        assert!("arm/vexpress".parse::<ArchId>().is_err());
        assert!("../kernel".parse::<ArchId>().is_err());
        assert!("arm ".parse::<ArchId>().is_err());
    }

    #[test]
    fn sub_build_dir_layout() {
        let arch: ArchId = "i686".parse().unwrap();
        assert_eq!(
            arch.sub_build_dir(Path::new("/src/os")),
            PathBuf::from("/src/os/arch/i686")
        );
    }

    #[test]
    fn try_from_string_validates() {
        assert!(ArchId::try_from("aarch64".to_string()).is_ok());
        assert!(ArchId::try_from("arch/../etc".to_string()).is_err());
    }

    #[test]
    fn display_matches_token() {
        let arch: ArchId = "mips".parse().unwrap();
        assert_eq!(arch.to_string(), "mips");
    }
}
