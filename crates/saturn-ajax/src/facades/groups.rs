//! Access groups managed by the identity service.

use reqwest::Method;
use saturn_api_models::{GroupMember, GroupRole};
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::AjaxResult;
use crate::roles::{RoleChange, for_each_role, reconcile_roles};
use crate::transport::AjaxResponse;

const GROUPS_ROOT: &str = "api/groups/v1";

/// Group listing and lookup.
pub struct Groups {
    bound: Bound,
}

impl Groups {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Groups the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Sam, Method::GET, GROUPS_ROOT)
            .fetch_json()
            .await
    }

    /// Operations on one group.
    #[must_use]
    pub fn group(&self, name: &str) -> Group<'_> {
        Group {
            bound: &self.bound,
            root: format!("{GROUPS_ROOT}/{name}"),
        }
    }
}

/// One group.
pub struct Group<'a> {
    bound: &'a Bound,
    root: String,
}

impl Group<'_> {
    async fn add_role(&self, role: GroupRole, email: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Sam, Method::PUT, &format!("{}/{role}/{email}", self.root))
            .fetch_ok()
            .await
    }

    async fn remove_role(&self, role: GroupRole, email: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Sam, Method::DELETE, &format!("{}/{role}/{email}", self.root))
            .fetch_ok()
            .await
    }

    async fn list_role(&self, role: GroupRole) -> AjaxResult<Vec<String>> {
        self.bound
            .call(Endpoint::Sam, Method::GET, &format!("{}/{role}", self.root))
            .fetch_json()
            .await
    }

    /// Create the group.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn create(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Sam, Method::POST, &self.root)
            .fetch_ok()
            .await
    }

    /// Delete the group.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Sam, Method::DELETE, &self.root)
            .fetch_ok()
            .await
    }

    /// Emails holding the admin role.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_admins(&self) -> AjaxResult<Vec<String>> {
        self.list_role(GroupRole::Admin).await
    }

    /// Emails holding the member role.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_members(&self) -> AjaxResult<Vec<String>> {
        self.list_role(GroupRole::Member).await
    }

    /// Every user with their roles; admins come first.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_users(&self) -> AjaxResult<Vec<GroupMember>> {
        let (admins, members) = tokio::try_join!(self.list_admins(), self.list_members())?;
        let (Some(admins), Some(members)) = (admins, members) else {
            return Ok(None);
        };
        Ok(Some(merge_memberships(admins, members)))
    }

    /// Grant every role in `roles` to `email`.
    ///
    /// # Errors
    ///
    /// Returns the first failed grant.
    pub async fn add_user(&self, roles: &[GroupRole], email: &str) -> AjaxResult<Vec<AjaxResponse>> {
        for_each_role(roles, |role| self.add_role(role, email)).await
    }

    /// Revoke every role in `roles` from `email`.
    ///
    /// # Errors
    ///
    /// Returns the first failed revocation.
    pub async fn remove_user(&self, roles: &[GroupRole], email: &str) -> AjaxResult<Vec<AjaxResponse>> {
        for_each_role(roles, |role| self.remove_role(role, email)).await
    }

    /// Move `email` from `old` roles to `new` roles; grants settle before revocations.
    ///
    /// # Errors
    ///
    /// Returns the first failed grant or revocation.
    pub async fn change_user_roles(
        &self,
        email: &str,
        old: &[GroupRole],
        new: &[GroupRole],
    ) -> AjaxResult<RoleChange<GroupRole>> {
        reconcile_roles(
            old,
            new,
            |role| self.add_role(role, email),
            |role| self.remove_role(role, email),
        )
        .await
    }
}

fn merge_memberships(admins: Vec<String>, members: Vec<String>) -> Vec<GroupMember> {
    let mut users: Vec<GroupMember> = Vec::with_capacity(admins.len() + members.len());
    for (emails, role) in [(admins, GroupRole::Admin), (members, GroupRole::Member)] {
        for email in emails {
            match users.iter_mut().find(|user| user.email == email) {
                Some(user) => user.roles.push(role),
                None => users.push(GroupMember {
                    email,
                    roles: vec![role],
                }),
            }
        }
    }
    users
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memberships_merge_per_email() {
        let users = merge_memberships(
            vec!["ada@example.org".into()],
            vec!["ada@example.org".into(), "bo@example.org".into()],
        );
        assert_eq!(
            users,
            vec![
                GroupMember {
                    email: "ada@example.org".into(),
                    roles: vec![GroupRole::Admin, GroupRole::Member],
                },
                GroupMember {
                    email: "bo@example.org".into(),
                    roles: vec![GroupRole::Member],
                },
            ]
        );
    }
}
