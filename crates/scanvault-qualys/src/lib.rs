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

//! HTTP adapters for the Qualys scan listing and report download endpoints.

pub mod client;
pub mod error;
pub mod wire;

pub use client::QualysClient;
pub use error::{QualysError, QualysResult};
