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

//! Binary entrypoint for the daily scan archive run.

use std::process::ExitCode;

use scanvault_app::run_app;

/// Runs one archive pass and maps the result to a process exit code.
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            ExitCode::from(err.exit_code())
        }
    }
}
