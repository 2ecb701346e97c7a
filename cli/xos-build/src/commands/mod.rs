//! CLI command implementations.

pub mod arch;
pub mod build_scripts;
pub mod doctor;
pub mod merge_libs;
