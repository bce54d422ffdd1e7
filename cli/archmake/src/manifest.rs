//! `archmake.toml` manifest parsing and configuration resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use archmake_dispatch::{ArchId, ToolchainConfig, ToolchainOverrides};

/// The top-level manifest structure for an archmake project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchmakeManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Build defaults.
    #[serde(default)]
    pub build: Option<BuildConfig>,
    /// Toolchain path defaults for this project.
    #[serde(default)]
    pub toolchain: Option<ToolchainOverrides>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    /// Project version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Build defaults section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Default target architecture.
    #[serde(default)]
    pub arch: Option<ArchId>,
}

impl ArchmakeManifest {
    /// Search upward from `start_dir` for an `archmake.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("archmake.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: ArchmakeManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing archmake.toml")
    }

    /// The project's default architecture, if one is configured.
    pub fn default_arch(&self) -> Option<&ArchId> {
        self.build.as_ref().and_then(|b| b.arch.as_ref())
    }

    /// The project's toolchain overrides.
    pub fn toolchain_overrides(&self) -> ToolchainOverrides {
        self.toolchain.clone().unwrap_or_default()
    }

    /// Generate the default template for `archmake init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[build]
arch = "arm"

[toolchain]
rust-root = "/usr/local"
llvm-root = "/usr"
gcc-prefix = "/usr/bin/arm-none-eabi-"
"#
        )
    }
}

/// Resolve the active architecture.
///
/// Precedence per invocation: `--arch` flag, then the `ARCH` environment
/// variable, then the manifest default, then the built-in default.
pub fn resolve_arch(
    flag: Option<&str>,
    manifest: Option<&ArchmakeManifest>,
) -> Result<ArchId> {
    if let Some(token) = flag {
        return Ok(token.parse()?);
    }
    if let Some(arch) = ArchId::from_env()? {
        return Ok(arch);
    }
    if let Some(arch) = manifest.and_then(|m| m.default_arch()) {
        return Ok(arch.clone());
    }
    Ok(ArchId::default())
}

/// Resolve the toolchain configuration for one invocation.
///
/// Per field: CLI flag, then process environment, then manifest, then the
/// built-in default.
pub fn resolve_toolchain(
    flags: ToolchainOverrides,
    manifest: Option<&ArchmakeManifest>,
) -> ToolchainConfig {
    let manifest_overrides = manifest
        .map(|m| m.toolchain_overrides())
        .unwrap_or_default();
    ToolchainConfig::resolve(
        flags
            .or(ToolchainOverrides::from_env())
            .or(manifest_overrides),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::Mutex;

    // Tests touching ARCH/RUST_ROOT/LLVM_ROOT/GCC_PREFIX mutate process-wide
    // state and must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with the dispatch environment variables pinned as given,
    /// restoring the previous values afterwards.
    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<(&str, Option<OsString>)> = vars
            .iter()
            .map(|(key, _)| (*key, std::env::var_os(key)))
            .collect();
        for (key, value) in vars {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        f();
        for (key, value) in saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[project]
name = "my-kernel"
version = "1.0.0"
description = "A toy kernel"

[build]
arch = "arm"

[toolchain]
rust-root = "/opt/rust"
llvm-root = "/opt/llvm"
gcc-prefix = "/opt/cross/bin/arm-none-eabi-"
"#;
        let manifest = ArchmakeManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.name, "my-kernel");
        assert_eq!(manifest.project.version, "1.0.0");
        assert_eq!(manifest.default_arch().unwrap().as_str(), "arm");
        let overrides = manifest.toolchain_overrides();
        assert_eq!(overrides.rust_root, Some(PathBuf::from("/opt/rust")));
        assert_eq!(overrides.llvm_root, Some(PathBuf::from("/opt/llvm")));
        assert_eq!(
            overrides.gcc_prefix,
            Some(PathBuf::from("/opt/cross/bin/arm-none-eabi-"))
        );
    }

    #[test]
    fn parse_minimal_manifest() {
        let toml_str = r#"
[project]
name = "minimal"
"#;
        let manifest = ArchmakeManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.name, "minimal");
        assert_eq!(manifest.project.version, "0.1.0");
        assert!(manifest.default_arch().is_none());
        assert_eq!(manifest.toolchain_overrides(), ToolchainOverrides::default());
    }

    #[test]
    fn reject_invalid_toml() {
        let bad = "this is not valid toml [[[";
        assert!(ArchmakeManifest::from_str(bad).is_err());
    }

    #[test]
    fn reject_invalid_arch_token() {
        let toml_str = r#"
[project]
name = "bad-arch"

[build]
arch = "arm/vexpress"
"#;
        assert!(ArchmakeManifest::from_str(toml_str).is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let template = ArchmakeManifest::template("test-project");
        let manifest = ArchmakeManifest::from_str(&template).unwrap();
        assert_eq!(manifest.project.name, "test-project");
        assert_eq!(manifest.default_arch().unwrap().as_str(), "arm");
        assert_eq!(
            manifest.toolchain_overrides().rust_root,
            Some(PathBuf::from("/usr/local"))
        );
    }

    #[test]
    fn resolve_arch_flag_beats_manifest() {
        let manifest = ArchmakeManifest::from_str(
            r#"
[project]
name = "test"
[build]
arch = "arm"
"#,
        )
        .unwrap();
        let arch = resolve_arch(Some("x86_64"), Some(&manifest)).unwrap();
        assert_eq!(arch.as_str(), "x86_64");
    }

    #[test]
    fn resolve_arch_manifest_default() {
        let manifest = ArchmakeManifest::from_str(
            r#"
[project]
name = "test"
[build]
arch = "mips"
"#,
        )
        .unwrap();
        with_env(&[("ARCH", None)], || {
            let arch = resolve_arch(None, Some(&manifest)).unwrap();
            assert_eq!(arch.as_str(), "mips");
        });
    }

    #[test]
    fn resolve_arch_env_beats_manifest_loses_to_flag() {
        let manifest = ArchmakeManifest::from_str(
            r#"
[project]
name = "test"
[build]
arch = "arm"
"#,
        )
        .unwrap();
        with_env(&[("ARCH", Some("mips"))], || {
            let arch = resolve_arch(None, Some(&manifest)).unwrap();
            assert_eq!(arch.as_str(), "mips");

            let arch = resolve_arch(Some("i686"), Some(&manifest)).unwrap();
            assert_eq!(arch.as_str(), "i686");
        });
    }

    #[test]
    fn resolve_arch_rejects_bad_env_token() {
        with_env(&[("ARCH", Some("arm/vexpress"))], || {
            assert!(resolve_arch(None, None).is_err());
        });
    }

    #[test]
    fn resolve_arch_fallback() {
        with_env(&[("ARCH", None)], || {
            let arch = resolve_arch(None, None).unwrap();
            assert_eq!(arch.as_str(), "arm");
        });
    }

    #[test]
    fn resolve_arch_rejects_bad_flag() {
        assert!(resolve_arch(Some("../escape"), None).is_err());
    }

    #[test]
    fn resolve_toolchain_flag_beats_manifest() {
        let manifest = ArchmakeManifest::from_str(
            r#"
[project]
name = "test"
[toolchain]
rust-root = "/from/manifest"
llvm-root = "/manifest/llvm"
"#,
        )
        .unwrap();
        with_env(
            &[("RUST_ROOT", None), ("LLVM_ROOT", None), ("GCC_PREFIX", None)],
            || {
                let flags = ToolchainOverrides {
                    rust_root: Some(PathBuf::from("/from/flag")),
                    ..Default::default()
                };
                let config = resolve_toolchain(flags, Some(&manifest));
                assert_eq!(config.rust_root, PathBuf::from("/from/flag"));
                assert_eq!(config.llvm_root, PathBuf::from("/manifest/llvm"));
                // Field untouched by any layer keeps the built-in default.
                assert_eq!(config.gcc_prefix, PathBuf::from("/usr/bin/arm-none-eabi-"));
            },
        );
    }

    #[test]
    fn resolve_toolchain_env_beats_manifest_loses_to_flag() {
        let manifest = ArchmakeManifest::from_str(
            r#"
[project]
name = "test"
[toolchain]
rust-root = "/from/manifest"
llvm-root = "/manifest/llvm"
"#,
        )
        .unwrap();
        with_env(
            &[
                ("RUST_ROOT", Some("/from/env")),
                ("LLVM_ROOT", None),
                ("GCC_PREFIX", None),
            ],
            || {
                // Environment beats the manifest for the field it sets.
                let config = resolve_toolchain(ToolchainOverrides::default(), Some(&manifest));
                assert_eq!(config.rust_root, PathBuf::from("/from/env"));
                // The manifest still covers fields the environment leaves unset.
                assert_eq!(config.llvm_root, PathBuf::from("/manifest/llvm"));
                assert_eq!(config.gcc_prefix, PathBuf::from("/usr/bin/arm-none-eabi-"));

                // A flag beats the environment, field by field.
                let flags = ToolchainOverrides {
                    rust_root: Some(PathBuf::from("/from/flag")),
                    ..Default::default()
                };
                let config = resolve_toolchain(flags, Some(&manifest));
                assert_eq!(config.rust_root, PathBuf::from("/from/flag"));
                assert_eq!(config.llvm_root, PathBuf::from("/manifest/llvm"));
            },
        );
    }

    #[test]
    fn find_and_load_in_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("archmake.toml");
        std::fs::write(&manifest_path, "[project]\nname = \"here\"\n").unwrap();

        let result = ArchmakeManifest::find_and_load(dir.path()).unwrap();
        assert!(result.is_some());
        let (manifest, found_dir) = result.unwrap();
        assert_eq!(manifest.project.name, "here");
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("archmake.toml");
        std::fs::write(&manifest_path, "[project]\nname = \"parent\"\n").unwrap();

        let nested = dir.path().join("arch").join("arm").join("drivers");
        std::fs::create_dir_all(&nested).unwrap();

        let result = ArchmakeManifest::find_and_load(&nested).unwrap();
        assert!(result.is_some());
        let (manifest, found_dir) = result.unwrap();
        assert_eq!(manifest.project.name, "parent");
        assert_eq!(found_dir, dir.path());
    }
}
