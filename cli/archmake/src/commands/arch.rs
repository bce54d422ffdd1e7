//! `archmake arch` — architecture sub-build listing.

use std::path::Path;

use anyhow::Result;

use archmake_dispatch::subbuild::available_archs;

/// List the architectures that have a sub-build directory.
pub fn list(project_dir: &Path) -> Result<()> {
    let archs = available_archs(project_dir)?;
    let arch_dir = project_dir.join("arch");

    if archs.is_empty() {
        println!("No sub-builds found under {}", arch_dir.display());
        println!("Run 'archmake init <name>' to scaffold a project.");
        return Ok(());
    }

    println!("Sub-builds under {}:", arch_dir.display());
    println!();
    for arch in &archs {
        println!("  {arch}");
    }
    println!();
    println!("Use 'archmake --arch <name> <target>' to dispatch.");
    Ok(())
}
