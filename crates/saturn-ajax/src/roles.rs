//! Role-set reconciliation shared by groups and billing projects.

use std::future::Future;

use futures_util::future::join_all;
use tracing::debug;

use crate::error::AjaxResult;

/// Roles granted and revoked by a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange<R> {
    /// Roles in the new list but not the old one.
    pub added: Vec<R>,
    /// Roles in the old list but not the new one.
    pub removed: Vec<R>,
}

impl<R> RoleChange<R> {
    /// Whether nothing was changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<R> Default for RoleChange<R> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Run `call` for every role concurrently and wait for all of them to settle.
///
/// A failing call never aborts its siblings. Resolves to `Ok(None)` if any
/// call was cancelled and none failed.
///
/// # Errors
///
/// Returns the first failure in role order.
pub async fn for_each_role<R, F, Fut, T>(roles: &[R], call: F) -> AjaxResult<Vec<T>>
where
    R: Copy,
    F: Fn(R) -> Fut,
    Fut: Future<Output = AjaxResult<T>>,
{
    let settled = join_all(roles.iter().map(|&role| call(role))).await;
    let mut values = Vec::with_capacity(settled.len());
    let mut cancelled = false;
    for result in settled {
        match result? {
            Some(value) => values.push(value),
            None => cancelled = true,
        }
    }
    Ok((!cancelled).then_some(values))
}

/// Move a member from `old` roles to `new` roles.
///
/// Identical lists (same roles, same order) issue no calls. Otherwise every
/// missing role is added concurrently, and only once all additions have
/// settled are the surplus roles removed, also concurrently.
///
/// # Errors
///
/// Returns the first failure; removals are not attempted if an addition failed.
pub async fn reconcile_roles<R, A, AFut, D, DFut, T>(
    old: &[R],
    new: &[R],
    add: A,
    remove: D,
) -> AjaxResult<RoleChange<R>>
where
    R: Copy + PartialEq + std::fmt::Debug,
    A: Fn(R) -> AFut,
    AFut: Future<Output = AjaxResult<T>>,
    D: Fn(R) -> DFut,
    DFut: Future<Output = AjaxResult<T>>,
{
    if old == new {
        return Ok(Some(RoleChange::default()));
    }
    let added: Vec<R> = new.iter().filter(|role| !old.contains(role)).copied().collect();
    let removed: Vec<R> = old.iter().filter(|role| !new.contains(role)).copied().collect();
    debug!(?added, ?removed, "reconciling roles");

    if for_each_role(&added, add).await?.is_none() {
        return Ok(None);
    }
    if for_each_role(&removed, remove).await?.is_none() {
        return Ok(None);
    }
    Ok(Some(RoleChange { added, removed }))
}
