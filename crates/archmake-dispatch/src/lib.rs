//! Architecture dispatch core for the archmake build driver.
//!
//! The model is a single-shot, stateless transformation: an [`ArchId`] selects
//! a sub-build directory under `arch/`, a [`ToolchainConfig`] is resolved from
//! overrides layered over built-in defaults, and a [`Dispatcher`] forwards one
//! target string at a time to the architecture's sub-build with the toolchain
//! paths in its environment. The dispatcher owns no target vocabulary and no
//! state across invocations; everything target-specific lives in the sub-build.

pub mod arch;
pub mod error;
pub mod subbuild;
pub mod toolchain;

pub use arch::ArchId;
pub use error::{DispatchError, Result};
pub use subbuild::{make_program, Dispatcher, MakeSubBuild, SubBuild};
pub use toolchain::{ToolchainConfig, ToolchainOverrides};
