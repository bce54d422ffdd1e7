//! CLI command implementations.

pub mod arch;
pub mod build;
pub mod doctor;
pub mod env;
pub mod init;
