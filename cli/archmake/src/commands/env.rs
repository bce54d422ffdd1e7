//! `archmake env` — print the resolved dispatch configuration.

use std::path::Path;

use anyhow::{bail, Result};

use archmake_dispatch::{Dispatcher, ToolchainOverrides};

use crate::manifest::{resolve_arch, resolve_toolchain, ArchmakeManifest};

/// Print the configuration one dispatch would use, without dispatching.
///
/// The default text form is shell-assignable `KEY=VALUE` lines; `--format
/// json` emits a machine-readable object.
pub fn run(
    project_dir: &Path,
    manifest: Option<&ArchmakeManifest>,
    arch_flag: Option<&str>,
    flags: ToolchainOverrides,
    format: Option<&str>,
) -> Result<()> {
    let arch = resolve_arch(arch_flag, manifest)?;
    let toolchain = resolve_toolchain(flags, manifest);
    let dispatcher = Dispatcher::new(project_dir, arch, toolchain);

    match format.unwrap_or("text") {
        "text" => {
            println!("ARCH={}", dispatcher.arch());
            for (key, path) in dispatcher.toolchain().env_vars() {
                println!("{key}={}", path.display());
            }
        }
        "json" => {
            let value = serde_json::json!({
                "arch": dispatcher.arch().as_str(),
                "sub-build-dir": dispatcher.sub_build_dir(),
                "toolchain": dispatcher.toolchain(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        other => bail!("unknown format: '{other}'. Choose: text, json"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_format_runs() {
        let dir = tempfile::tempdir().unwrap();
        run(
            dir.path(),
            None,
            Some("arm"),
            ToolchainOverrides::default(),
            None,
        )
        .unwrap();
    }

    #[test]
    fn json_format_runs() {
        let dir = tempfile::tempdir().unwrap();
        run(
            dir.path(),
            None,
            Some("arm"),
            ToolchainOverrides::default(),
            Some("json"),
        )
        .unwrap();
    }

    #[test]
    fn unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(
            dir.path(),
            None,
            None,
            ToolchainOverrides::default(),
            Some("yaml"),
        )
        .is_err());
    }
}
