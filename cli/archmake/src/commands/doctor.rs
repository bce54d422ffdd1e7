//! `archmake doctor` — toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use archmake_dispatch::{Dispatcher, ToolchainOverrides};

use crate::manifest::{resolve_arch, resolve_toolchain, ArchmakeManifest};

/// Print toolchain diagnostic information.
pub fn run(project_dir: &Path, arch_flag: Option<&str>, flags: ToolchainOverrides) -> Result<()> {
    println!("=== Archmake Doctor ===");
    println!();

    // Version info
    println!("Archmake version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    // Project status
    println!("--- Project Status ---");
    let manifest = match ArchmakeManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  archmake.toml: found at {}", dir.display());
            println!("  Project:  {}", manifest.project.name);
            println!("  Version:  {}", manifest.project.version);
            if let Some(arch) = manifest.default_arch() {
                println!("  Default arch: {arch}");
            }
            Some(manifest)
        }
        Ok(None) => {
            println!("  archmake.toml: not found");
            None
        }
        Err(e) => {
            println!("  archmake.toml: error — {e}");
            None
        }
    };
    println!();

    // Resolved dispatch configuration
    let arch = resolve_arch(arch_flag, manifest.as_ref())?;
    let toolchain = resolve_toolchain(flags, manifest.as_ref());
    let dispatcher = Dispatcher::new(project_dir, arch, toolchain);

    println!("--- Architecture: {} ---", dispatcher.arch());
    let sub_build = dispatcher.sub_build_dir();
    if sub_build.is_dir() {
        println!("  Sub-build: {}", sub_build.display());
        let makefile = sub_build.join("Makefile");
        println!(
            "  Makefile:  {}",
            if makefile.is_file() { "present" } else { "missing" }
        );
    } else {
        println!("  Sub-build: {} (not found)", sub_build.display());
    }
    println!();

    // System tools. Probe the program a dispatch would actually spawn,
    // honoring $MAKE.
    println!("--- System Tools ---");
    let make = archmake_dispatch::make_program();
    print_tool_status(&make, &["--version"]);
    let cross_gcc = format!("{}gcc", dispatcher.toolchain().gcc_prefix.display());
    print_tool_status(&cross_gcc, &["--version"]);
    println!();

    // Toolchain paths. GCC_PREFIX is a prefix, not a directory; its health is
    // covered by the cross-compiler probe above.
    println!("--- Toolchain Paths ---");
    let config = dispatcher.toolchain();
    for (key, path) in [
        ("RUST_ROOT", &config.rust_root),
        ("LLVM_ROOT", &config.llvm_root),
    ] {
        println!(
            "  {key}: {} ({})",
            path.display(),
            if path.is_dir() { "exists" } else { "missing" }
        );
    }
    println!("  GCC_PREFIX: {}", config.gcc_prefix.display());

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}
