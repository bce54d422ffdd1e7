//! Toolchain location configuration propagated to sub-builds.
//!
//! Three paths travel with every dispatch: the Rust toolchain root, the LLVM
//! installation root, and the cross-compiler binary prefix. Each can be
//! overridden independently; anything left unset falls back to a built-in
//! default. The resolved record is immutable and rebuilt from scratch on
//! every invocation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable for the Rust toolchain root.
pub const RUST_ROOT_ENV: &str = "RUST_ROOT";
/// Environment variable for the LLVM installation root.
pub const LLVM_ROOT_ENV: &str = "LLVM_ROOT";
/// Environment variable for the cross-compiler binary prefix.
pub const GCC_PREFIX_ENV: &str = "GCC_PREFIX";

const DEFAULT_RUST_ROOT: &str = "/usr/local";
const DEFAULT_LLVM_ROOT: &str = "/usr";
const DEFAULT_GCC_PREFIX: &str = "/usr/bin/arm-none-eabi-";

/// Fully resolved toolchain locations for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Rust toolchain installation root.
    pub rust_root: PathBuf,
    /// LLVM installation root.
    pub llvm_root: PathBuf,
    /// Cross-compiler binary prefix (e.g. `/usr/bin/arm-none-eabi-`).
    pub gcc_prefix: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        ToolchainConfig {
            rust_root: PathBuf::from(DEFAULT_RUST_ROOT),
            llvm_root: PathBuf::from(DEFAULT_LLVM_ROOT),
            gcc_prefix: PathBuf::from(DEFAULT_GCC_PREFIX),
        }
    }
}

impl ToolchainConfig {
    /// Merge a set of overrides over the built-in defaults, field by field.
    pub fn resolve(overrides: ToolchainOverrides) -> Self {
        let defaults = Self::default();
        ToolchainConfig {
            rust_root: overrides.rust_root.unwrap_or(defaults.rust_root),
            llvm_root: overrides.llvm_root.unwrap_or(defaults.llvm_root),
            gcc_prefix: overrides.gcc_prefix.unwrap_or(defaults.gcc_prefix),
        }
    }

    /// The environment entries a sub-build receives for this configuration.
    pub fn env_vars(&self) -> [(&'static str, &Path); 3] {
        [
            (RUST_ROOT_ENV, self.rust_root.as_path()),
            (LLVM_ROOT_ENV, self.llvm_root.as_path()),
            (GCC_PREFIX_ENV, self.gcc_prefix.as_path()),
        ]
    }
}

/// Partial toolchain configuration used for layering.
///
/// Layers compose with [`ToolchainOverrides::or`], the left side winning per
/// field; the final partial record is merged over the defaults with
/// [`ToolchainConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainOverrides {
    /// Rust toolchain root override.
    #[serde(default)]
    pub rust_root: Option<PathBuf>,
    /// LLVM root override.
    #[serde(default)]
    pub llvm_root: Option<PathBuf>,
    /// Cross-compiler prefix override.
    #[serde(default)]
    pub gcc_prefix: Option<PathBuf>,
}

impl ToolchainOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        ToolchainOverrides {
            rust_root: std::env::var_os(RUST_ROOT_ENV).map(PathBuf::from),
            llvm_root: std::env::var_os(LLVM_ROOT_ENV).map(PathBuf::from),
            gcc_prefix: std::env::var_os(GCC_PREFIX_ENV).map(PathBuf::from),
        }
    }

    /// Compose two override sets; fields set in `self` win.
    pub fn or(self, other: ToolchainOverrides) -> Self {
        ToolchainOverrides {
            rust_root: self.rust_root.or(other.rust_root),
            llvm_root: self.llvm_root.or(other.llvm_root),
            gcc_prefix: self.gcc_prefix.or(other.gcc_prefix),
        }
    }
}
