//! Rewrites absolute references in build-project descriptors (`*.*proj`)
//! into paths relative to each descriptor, and records what changed.
//!
//! A run is strictly sequential: [`discovery`] finds descriptors, the
//! [`transform`]s rewrite `HintPath` values and `ProjectReference` entries,
//! and [`report`] writes the change history.

pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod paths;
pub mod report;
pub mod run;
pub mod transform;

pub use config::Config;
pub use error::{RelinkError, Result};
pub use report::{FileOutcome, RunSummary};
pub use run::{Quiet, RunObserver, RunOptions, run};
pub use transform::RewriteOptions;

/// Absolute prefix whose hint paths are rewritten.
pub const ABSOLUTE_PREFIX: &str = r"C:\ndensan\framework\";
