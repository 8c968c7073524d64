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

//! Client layer for the Saturn backend services.
//!
//! Every outbound request goes through one [`Dispatcher`], which honours the
//! process-wide [`MockSwitch`] and the caller's cancellation [`Signal`].
//! Facades in [`facades`] build requests for each backend; [`Ajax`] bundles
//! them for a single view. A cancelled request resolves to `Ok(None)`.

pub mod attributes;
pub mod clock;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod facades;
pub mod mock;
pub mod request;
pub mod roles;
pub mod session;
pub mod signal;
pub mod token_cache;
pub mod transport;

pub use attributes::{attribute_removal_ops, attribute_update_ops, merge_json};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ClientContext, ClientContextBuilder};
pub use dispatch::Dispatcher;
pub use error::{AjaxError, AjaxResult, TransportError};
pub use facades::Ajax;
pub use mock::{MALFORMED_BODY, MockMode, MockSwitch};
pub use request::{APP_ID_HEADER, api_prefix, encode_segment, join_url, sends_app_id};
pub use roles::{RoleChange, for_each_role, reconcile_roles};
pub use session::{Auth, Session};
pub use signal::{Signal, ViewScope};
pub use token_cache::{TOKEN_TTL, TokenCache};
pub use transport::{AjaxRequest, AjaxResponse, HttpTransport, Transport};
