//! Command handlers grouped by backend service.

pub(crate) mod groups;
pub(crate) mod notebooks;
pub(crate) mod user;
pub(crate) mod workspaces;
