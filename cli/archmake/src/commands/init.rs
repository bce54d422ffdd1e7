//! `archmake init` — project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use archmake_dispatch::arch::DEFAULT_ARCH;

use crate::manifest::ArchmakeManifest;

/// Create a new archmake project at the given path.
///
/// `name` is the project name. The directory `name` is created relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    let sub_build = project_dir.join("arch").join(DEFAULT_ARCH);
    fs::create_dir_all(&sub_build)
        .with_context(|| format!("creating {}", sub_build.display()))?;

    let manifest_content = ArchmakeManifest::template(name);
    fs::write(project_dir.join("archmake.toml"), &manifest_content)
        .context("writing archmake.toml")?;

    fs::write(sub_build.join("Makefile"), sub_build_makefile())
        .context("writing sub-build Makefile")?;

    fs::write(project_dir.join(".gitignore"), "*.o\n*.bin\n*.elf\n")
        .context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/archmake.toml");
    println!("  {name}/arch/{DEFAULT_ARCH}/Makefile");
    println!("  {name}/.gitignore");

    Ok(())
}

/// Stub Makefile for the default architecture's sub-build.
fn sub_build_makefile() -> String {
    format!(
        "# Sub-build for the {DEFAULT_ARCH} architecture. Invoked as\n\
         #   make -C arch/{DEFAULT_ARCH} <target>\n\
         # with ARCH, RUST_ROOT, LLVM_ROOT, and GCC_PREFIX in the environment.\n\
         \n\
         all:\n\
         \t@echo \"arch/$(ARCH): nothing to build yet\"\n\
         \n\
         clean:\n\
         \t@rm -f *.o *.bin *.elf\n\
         \n\
         .PHONY: all clean\n"
    )
}
