//! Static archive merging for the xOS build.
//!
//! The build graph produces one archive per library component; the linker
//! wants a single archive per library. [`LibMerger`] produces it: a plain
//! copy when there is only one input, otherwise an MRI script run through
//! the target archiver (`ar -M`).

pub mod directive;
pub mod error;
pub mod merge;
pub mod runner;

pub use directive::{DirectiveFile, MriCommand, MriDirective};
pub use error::MergeError;
pub use merge::{merge, LibMerger, MergeOutcome};
pub use runner::{SystemRunner, ToolInvocation, ToolOutput, ToolRunner};
