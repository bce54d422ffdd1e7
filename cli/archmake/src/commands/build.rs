//! `archmake build` — dispatch targets to the architecture sub-build.

use std::path::Path;

use anyhow::Result;

use archmake_dispatch::{Dispatcher, ToolchainOverrides};

use crate::manifest::{resolve_arch, resolve_toolchain, ArchmakeManifest};

/// The target dispatched when none is named.
pub const DEFAULT_TARGET: &str = "all";

/// Dispatch the requested targets, in order, stopping at the first failure.
///
/// An empty target list dispatches [`DEFAULT_TARGET`]. Target names are
/// forwarded to the sub-build verbatim; the dispatcher interprets none of
/// them.
pub fn run(
    project_dir: &Path,
    manifest: Option<&ArchmakeManifest>,
    arch_flag: Option<&str>,
    flags: ToolchainOverrides,
    targets: &[String],
) -> Result<()> {
    run_with_program(project_dir, manifest, arch_flag, flags, targets, None)
}

pub(crate) fn run_with_program(
    project_dir: &Path,
    manifest: Option<&ArchmakeManifest>,
    arch_flag: Option<&str>,
    flags: ToolchainOverrides,
    targets: &[String],
    program: Option<&str>,
) -> Result<()> {
    let arch = resolve_arch(arch_flag, manifest)?;
    let toolchain = resolve_toolchain(flags, manifest);

    let mut dispatcher = Dispatcher::new(project_dir, arch, toolchain);
    if let Some(program) = program {
        dispatcher = dispatcher.with_program(program);
    }

    if targets.is_empty() {
        dispatcher.dispatch(DEFAULT_TARGET)?;
        return Ok(());
    }
    for target in targets {
        dispatcher.dispatch(target)?;
    }
    Ok(())
}
