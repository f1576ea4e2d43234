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

//! Run configuration for the scan archiver.
//!
//! Layout: `defaults.rs` (constants and environment names), `model.rs` (typed
//! configuration), `validate.rs` (raw settings to validated configuration).

pub mod defaults;
pub mod error;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{ArchiverConfig, Credentials, RawSettings, RetrySettings};
pub use validate::build_config;
