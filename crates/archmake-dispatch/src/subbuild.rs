//! Sub-build invocation and the dispatcher itself.
//!
//! The dispatcher is a pure architecture-selecting proxy: it checks that the
//! requested architecture has a sub-build directory, then hands the target
//! string to the sub-build collaborator unchanged. The collaborator is a
//! trait so the production `make` runner and test doubles share one seam.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::arch::{ArchId, ARCH_ENV};
use crate::error::{DispatchError, Result};
use crate::toolchain::ToolchainConfig;

/// Environment variable overriding the sub-build program (default `make`).
pub const MAKE_ENV: &str = "MAKE";

const DEFAULT_MAKE: &str = "make";

/// The sub-build program a dispatch will spawn: `$MAKE`, else `make`.
pub fn make_program() -> String {
    std::env::var(MAKE_ENV).unwrap_or_else(|_| DEFAULT_MAKE.to_string())
}

/// An invocable per-architecture build procedure.
///
/// Implementations accept any target name; the dispatcher holds no enumerated
/// target list and forwards every name verbatim.
pub trait SubBuild {
    /// Run one target to completion, returning its propagated status.
    fn invoke(&self, target: &str) -> Result<()>;
}

/// The production sub-build: `make -C <dir> <target>` with an explicit
/// environment map.
pub struct MakeSubBuild {
    program: String,
    dir: PathBuf,
    env: Vec<(&'static str, OsString)>,
}

impl MakeSubBuild {
    /// Build a runner for one sub-build directory.
    ///
    /// The environment map carries the three toolchain paths plus `ARCH`;
    /// nothing is exported into the dispatcher's own environment.
    pub fn new(
        program: impl Into<String>,
        dir: impl Into<PathBuf>,
        arch: &ArchId,
        toolchain: &ToolchainConfig,
    ) -> Self {
        let mut env: Vec<(&'static str, OsString)> = toolchain
            .env_vars()
            .iter()
            .map(|(key, path)| (*key, path.as_os_str().to_os_string()))
            .collect();
        env.push((ARCH_ENV, OsString::from(arch.as_str())));
        MakeSubBuild {
            program: program.into(),
            dir: dir.into(),
            env,
        }
    }
}

impl SubBuild for MakeSubBuild {
    fn invoke(&self, target: &str) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(&self.dir).arg(target);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        let status = cmd.status().map_err(|source| DispatchError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(DispatchError::SubBuild {
                target: target.to_string(),
                code,
            }),
            None => Err(DispatchError::Terminated {
                target: target.to_string(),
            }),
        }
    }
}

/// One dispatch context: project root, architecture, resolved toolchain.
///
/// Stateless across invocations; every run constructs its own `Dispatcher`.
pub struct Dispatcher {
    root: PathBuf,
    arch: ArchId,
    toolchain: ToolchainConfig,
    program: String,
}

impl Dispatcher {
    /// Create a dispatcher for `root`, honoring `$MAKE` for the sub-build
    /// program.
    pub fn new(root: impl Into<PathBuf>, arch: ArchId, toolchain: ToolchainConfig) -> Self {
        Dispatcher {
            root: root.into(),
            arch,
            toolchain,
            program: make_program(),
        }
    }

    /// Replace the sub-build program.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The selected architecture.
    pub fn arch(&self) -> &ArchId {
        &self.arch
    }

    /// The resolved toolchain configuration.
    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    /// The sub-build directory this dispatcher delegates to.
    pub fn sub_build_dir(&self) -> PathBuf {
        self.arch.sub_build_dir(&self.root)
    }

    /// Forward one target to the architecture's sub-build.
    pub fn dispatch(&self, target: &str) -> Result<()> {
        let dir = self.ensure_sub_build()?;
        let sub = MakeSubBuild::new(&self.program, dir, &self.arch, &self.toolchain);
        sub.invoke(target)
    }

    /// Forward one target to an explicit sub-build collaborator.
    pub fn dispatch_with(&self, sub: &dyn SubBuild, target: &str) -> Result<()> {
        self.ensure_sub_build()?;
        sub.invoke(target)
    }

    /// Fail with `ArchNotFound` before any invocation if the sub-build
    /// directory is missing.
    fn ensure_sub_build(&self) -> Result<PathBuf> {
        let dir = self.sub_build_dir();
        if !dir.is_dir() {
            return Err(DispatchError::ArchNotFound {
                arch: self.arch.clone(),
                path: dir,
            });
        }
        Ok(dir)
    }
}

/// List the architectures that have a sub-build directory under `root`.
pub fn available_archs(root: &Path) -> std::io::Result<Vec<ArchId>> {
    let arch_dir = root.join(crate::arch::ARCH_SUBDIR);
    let mut archs = Vec::new();
    if !arch_dir.is_dir() {
        return Ok(archs);
    }
    for entry in std::fs::read_dir(&arch_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        // Directories whose names are not valid tokens are not dispatchable.
        if let Some(name) = entry.file_name().to_str() {
            if let Ok(arch) = name.parse::<ArchId>() {
                archs.push(arch);
            }
        }
    }
    archs.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    Ok(archs)
}
