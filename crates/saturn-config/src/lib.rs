#![forbid(unsafe_code)]
#![warn(
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

//! Runtime configuration for the Saturn remote service client.
//!
//! Layout: `model.rs` (typed configuration and the endpoint catalogue),
//! `validate.rs` (URL/header checks), `loader.rs` (JSON document + environment
//! overrides), `defaults.rs` (built-in values).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::{DOCKSTORE_PORT, ENV_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use model::{AppIdentity, ClientConfig, Endpoint, HttpSettings, ServiceEndpoints};
