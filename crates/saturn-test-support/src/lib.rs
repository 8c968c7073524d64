#![forbid(unsafe_code)]
#![deny(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (configuration pointed at a mock server, sample payloads).

pub mod fixtures;

pub use fixtures::{TEST_APP_ID, config_for, sample_entities, sample_profile};
