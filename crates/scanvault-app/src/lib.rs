#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Wiring for the `scanvault` binary: command line, bootstrap and exit codes.

pub mod bootstrap;
pub mod cli;
pub mod error;

pub use bootstrap::{run_app, run_archive};
pub use cli::Cli;
pub use error::{AppError, AppResult};
