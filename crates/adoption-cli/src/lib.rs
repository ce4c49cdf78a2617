//! Pieces shared by the three scraper binaries: common flags and logging.

pub mod args;
pub mod logging;

/// `--version` string: crate version plus the git build hash.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")");
