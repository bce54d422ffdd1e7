//! Archmake CLI — root build dispatcher for per-architecture sub-builds.
//!
//! `archmake <target>` resolves an architecture, resolves the toolchain
//! configuration, and forwards the target verbatim to the sub-build in
//! `arch/<arch>/`. Unrecognized subcommand names are targets; the dispatcher
//! owns no target vocabulary of its own.

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process;

use archmake_dispatch::{DispatchError, ToolchainOverrides};
use clap::{Parser, Subcommand};

use manifest::ArchmakeManifest;

#[derive(Parser)]
#[command(
    name = "archmake",
    version,
    about = "Architecture-dispatching build driver"
)]
struct Cli {
    /// Target architecture (default: ARCH env, then archmake.toml, then "arm")
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Rust toolchain root (default: RUST_ROOT env, then archmake.toml)
    #[arg(long, global = true, value_name = "PATH")]
    rust_root: Option<PathBuf>,

    /// LLVM installation root (default: LLVM_ROOT env, then archmake.toml)
    #[arg(long, global = true, value_name = "PATH")]
    llvm_root: Option<PathBuf>,

    /// Cross-compiler binary prefix (default: GCC_PREFIX env, then archmake.toml)
    #[arg(long, global = true, value_name = "PATH")]
    gcc_prefix: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new archmake project
    Init {
        /// Project name
        name: String,
    },
    /// Dispatch targets to the architecture sub-build
    Build {
        /// Target names forwarded verbatim (default: "all")
        targets: Vec<String>,
    },
    /// Architecture sub-build inspection
    Arch {
        #[command(subcommand)]
        action: ArchAction,
    },
    /// Print the resolved dispatch configuration without dispatching
    Env {
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Check toolchain and project status
    Doctor,
    /// Any other name is forwarded verbatim as a sub-build target
    #[command(external_subcommand)]
    Target(Vec<String>),
}

#[derive(Subcommand)]
enum ArchAction {
    /// List architectures that have a sub-build directory
    List,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<DispatchError>() {
            // A failed sub-build has already reported itself; propagate its
            // status without further commentary.
            Some(DispatchError::SubBuild { .. }) => {}
            _ => eprintln!("error: {e:#}"),
        }
        let code = e
            .downcast_ref::<DispatchError>()
            .map(DispatchError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = load_manifest_optional(&cwd)?;
    let project_dir = project_dir.unwrap_or(cwd);

    let flags = ToolchainOverrides {
        rust_root: cli.rust_root,
        llvm_root: cli.llvm_root,
        gcc_prefix: cli.gcc_prefix,
    };
    let arch_flag = cli.arch.as_deref();

    match cli.command {
        Some(Commands::Init { name }) => commands::init::run(&name),

        Some(Commands::Build { targets }) => {
            commands::build::run(&project_dir, manifest.as_ref(), arch_flag, flags, &targets)
        }

        Some(Commands::Arch { action }) => match action {
            ArchAction::List => commands::arch::list(&project_dir),
        },

        Some(Commands::Env { format }) => commands::env::run(
            &project_dir,
            manifest.as_ref(),
            arch_flag,
            flags,
            format.as_deref(),
        ),

        Some(Commands::Doctor) => commands::doctor::run(&project_dir, arch_flag, flags),

        // Pass-through: every word is a target, dispatched in order.
        Some(Commands::Target(targets)) => {
            commands::build::run(&project_dir, manifest.as_ref(), arch_flag, flags, &targets)
        }

        // Bare `archmake` dispatches the default target.
        None => commands::build::run(&project_dir, manifest.as_ref(), arch_flag, flags, &[]),
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(
    cwd: &std::path::Path,
) -> anyhow::Result<(Option<ArchmakeManifest>, Option<PathBuf>)> {
    match ArchmakeManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
