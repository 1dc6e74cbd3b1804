//! Access policies
//!
//! A policy is declared per protected operation and read by the guard at
//! call time; it is never mutated at runtime. Policies are registered
//! explicitly in an operation table and resolved by direct lookup.

use crate::roles::{Permission, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-operation declaration of required roles and/or permissions
///
/// Required roles are a disjunction (the caller must hold at least one);
/// required permissions are a conjunction (the caller must hold all).
/// The two gates are independent; a policy may declare either, both, or
/// neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl AccessPolicy {
    /// A policy with no requirements; the guard allows unconditionally
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Require at least one of the given roles
    pub fn any_role(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            permissions: Vec::new(),
        }
    }

    /// Require all of the given permissions
    pub fn all_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            roles: Vec::new(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Add a role requirement to an existing policy
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Add a permission requirement to an existing policy
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}

/// Operation identifier → access policy registry
///
/// The surrounding request-handling layer attaches policies here when it
/// registers its operations; the guard resolves them by direct lookup
/// rather than runtime introspection.
#[derive(Debug, Clone, Default)]
pub struct OperationPolicies {
    policies: HashMap<String, AccessPolicy>,
}

impl OperationPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the policy for an operation, replacing any previous entry
    pub fn register(&mut self, operation: &str, policy: AccessPolicy) {
        self.policies.insert(operation.to_string(), policy);
    }

    /// Resolve the policy for an operation
    ///
    /// Operations without a registered policy are unrestricted.
    pub fn policy_for(&self, operation: &str) -> AccessPolicy {
        self.policies.get(operation).cloned().unwrap_or_default()
    }

    /// The platform's campaign-facing operations and their requirements
    pub fn platform_defaults() -> Self {
        use Permission::*;

        let mut table = Self::new();
        table.register("viewCampaigns", AccessPolicy::all_permissions([ViewCampaigns]));
        table.register("createCampaign", AccessPolicy::all_permissions([CreateCampaign]));
        table.register(
            "approveCampaign",
            AccessPolicy::any_role([Role::Moderator, Role::Admin])
                .with_permission(ApproveCampaign),
        );
        table.register(
            "rejectCampaign",
            AccessPolicy::any_role([Role::Moderator, Role::Admin]).with_permission(RejectCampaign),
        );
        table.register(
            "moderateComments",
            AccessPolicy::all_permissions([ModerateComments]),
        );
        table.register(
            "manageUsers",
            AccessPolicy::all_permissions([ManageUsers, ManageRoles]),
        );
        table.register(
            "updatePlatformSettings",
            AccessPolicy::any_role([Role::Admin]).with_permission(ManagePlatformSettings),
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_policy_is_unrestricted() {
        assert!(AccessPolicy::unrestricted().is_unrestricted());
        assert!(!AccessPolicy::any_role([Role::Admin]).is_unrestricted());
        assert!(!AccessPolicy::all_permissions([Permission::ManageUsers]).is_unrestricted());
    }

    #[test]
    fn unregistered_operation_is_unrestricted() {
        let table = OperationPolicies::platform_defaults();
        assert!(table.policy_for("healthCheck").is_unrestricted());
    }

    #[test]
    fn registered_operation_resolves_its_policy() {
        let table = OperationPolicies::platform_defaults();
        let policy = table.policy_for("approveCampaign");
        assert_eq!(policy.roles, vec![Role::Moderator, Role::Admin]);
        assert_eq!(policy.permissions, vec![Permission::ApproveCampaign]);
    }

    #[test]
    fn registration_replaces_previous_policy() {
        let mut table = OperationPolicies::new();
        table.register("op", AccessPolicy::any_role([Role::Admin]));
        table.register("op", AccessPolicy::unrestricted());
        assert!(table.policy_for("op").is_unrestricted());
    }
}
