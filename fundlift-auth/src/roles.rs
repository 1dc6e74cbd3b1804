//! Roles and permissions
//!
//! The role-to-permission table is hand-authored policy data and the single
//! source of truth for authorization decisions; changing it requires a
//! deliberate review.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// User roles in the system
/// - Supporter: contributor/investor - can view, contribute, comment
/// - Creator: campaign owner - can create and manage own campaigns
/// - Moderator: content manager - can approve/reject campaigns, moderate content
/// - Admin: system administrator - full access to platform management
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Supporter,
    Creator,
    Moderator,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Supporter => write!(f, "supporter"),
            Role::Creator => write!(f, "creator"),
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supporter" => Ok(Role::Supporter),
            "creator" => Ok(Role::Creator),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Specific permissions that can be granted to roles
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewCampaigns,
    CreateCampaign,
    UpdateOwnCampaign,
    DeleteOwnCampaign,
    UpdateAnyCampaign,
    DeleteAnyCampaign,
    ApproveCampaign,
    RejectCampaign,
    ContributeToCampaign,
    ReadComments,
    WriteComment,
    ModerateComments,
    ManageUsers,
    ManageRoles,
    ManagePlatformSettings,
    ManageNotifications,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::ViewCampaigns => write!(f, "view_campaigns"),
            Permission::CreateCampaign => write!(f, "create_campaign"),
            Permission::UpdateOwnCampaign => write!(f, "update_own_campaign"),
            Permission::DeleteOwnCampaign => write!(f, "delete_own_campaign"),
            Permission::UpdateAnyCampaign => write!(f, "update_any_campaign"),
            Permission::DeleteAnyCampaign => write!(f, "delete_any_campaign"),
            Permission::ApproveCampaign => write!(f, "approve_campaign"),
            Permission::RejectCampaign => write!(f, "reject_campaign"),
            Permission::ContributeToCampaign => write!(f, "contribute_to_campaign"),
            Permission::ReadComments => write!(f, "read_comments"),
            Permission::WriteComment => write!(f, "write_comment"),
            Permission::ModerateComments => write!(f, "moderate_comments"),
            Permission::ManageUsers => write!(f, "manage_users"),
            Permission::ManageRoles => write!(f, "manage_roles"),
            Permission::ManagePlatformSettings => write!(f, "manage_platform_settings"),
            Permission::ManageNotifications => write!(f, "manage_notifications"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view_campaigns" => Ok(Permission::ViewCampaigns),
            "create_campaign" => Ok(Permission::CreateCampaign),
            "update_own_campaign" => Ok(Permission::UpdateOwnCampaign),
            "delete_own_campaign" => Ok(Permission::DeleteOwnCampaign),
            "update_any_campaign" => Ok(Permission::UpdateAnyCampaign),
            "delete_any_campaign" => Ok(Permission::DeleteAnyCampaign),
            "approve_campaign" => Ok(Permission::ApproveCampaign),
            "reject_campaign" => Ok(Permission::RejectCampaign),
            "contribute_to_campaign" => Ok(Permission::ContributeToCampaign),
            "read_comments" => Ok(Permission::ReadComments),
            "write_comment" => Ok(Permission::WriteComment),
            "moderate_comments" => Ok(Permission::ModerateComments),
            "manage_users" => Ok(Permission::ManageUsers),
            "manage_roles" => Ok(Permission::ManageRoles),
            "manage_platform_settings" => Ok(Permission::ManagePlatformSettings),
            "manage_notifications" => Ok(Permission::ManageNotifications),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

/// Role-to-permission mapping
///
/// Constructed once at process start and passed by reference to consumers;
/// lookups for a role with no entry return the empty set rather than failing
/// (an unknown role grants nothing).
#[derive(Debug, Clone)]
pub struct RolePermissionTable {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl RolePermissionTable {
    /// Build a table from explicit grants
    pub fn new(grants: HashMap<Role, HashSet<Permission>>) -> Self {
        Self { grants }
    }

    /// The platform's hand-authored role grants
    pub fn platform_defaults() -> Self {
        use Permission::*;

        let mut grants: HashMap<Role, HashSet<Permission>> = HashMap::new();

        grants.insert(
            Role::Supporter,
            [
                ViewCampaigns,
                ContributeToCampaign,
                ReadComments,
                WriteComment,
                ManageNotifications,
            ]
            .into_iter()
            .collect(),
        );

        grants.insert(
            Role::Creator,
            [
                ViewCampaigns,
                CreateCampaign,
                UpdateOwnCampaign,
                DeleteOwnCampaign,
                ReadComments,
                WriteComment,
                ManageNotifications,
            ]
            .into_iter()
            .collect(),
        );

        grants.insert(
            Role::Moderator,
            [
                ViewCampaigns,
                ApproveCampaign,
                RejectCampaign,
                ReadComments,
                WriteComment,
                ModerateComments,
                ManageUsers,
                ManageRoles,
                ManagePlatformSettings,
            ]
            .into_iter()
            .collect(),
        );

        grants.insert(
            Role::Admin,
            [
                ViewCampaigns,
                CreateCampaign,
                UpdateOwnCampaign,
                DeleteOwnCampaign,
                UpdateAnyCampaign,
                DeleteAnyCampaign,
                ApproveCampaign,
                RejectCampaign,
                ContributeToCampaign,
                ReadComments,
                WriteComment,
                ModerateComments,
                ManageUsers,
                ManageRoles,
                ManagePlatformSettings,
                ManageNotifications,
            ]
            .into_iter()
            .collect(),
        );

        Self { grants }
    }

    /// Get all permissions for a role
    ///
    /// Total over the role domain: an unknown role yields the empty set.
    pub fn permissions_of(&self, role: Role) -> HashSet<Permission> {
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    /// Check if a role has a specific permission
    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .map(|set| set.contains(&permission))
            .unwrap_or(false)
    }

    /// Validate the table at startup
    ///
    /// Every role must carry a non-empty grant set; a role mapped to nothing
    /// is a misauthored table, not a deliberate lockout.
    pub fn validate(&self) -> fundlift_core::PlatformResult<()> {
        for role in [Role::Supporter, Role::Creator, Role::Moderator, Role::Admin] {
            if self.grants.get(&role).map(|s| s.is_empty()).unwrap_or(true) {
                return Err(fundlift_core::PlatformError::config(
                    &format!("role permission table has no grants for role '{}'", role),
                    "roles",
                ));
            }
        }
        Ok(())
    }
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        Self::platform_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_permissions() {
        let table = RolePermissionTable::platform_defaults();
        for role in [Role::Supporter, Role::Creator, Role::Moderator, Role::Admin] {
            assert!(
                !table.permissions_of(role).is_empty(),
                "role {} has no permissions",
                role
            );
        }
        assert!(table.validate().is_ok());
    }

    #[test]
    fn lookups_are_deterministic() {
        let table = RolePermissionTable::platform_defaults();
        assert_eq!(
            table.permissions_of(Role::Moderator),
            table.permissions_of(Role::Moderator)
        );
    }

    #[test]
    fn supporter_cannot_moderate() {
        let table = RolePermissionTable::platform_defaults();
        assert!(table.has_permission(Role::Supporter, Permission::ContributeToCampaign));
        assert!(!table.has_permission(Role::Supporter, Permission::ModerateComments));
        assert!(!table.has_permission(Role::Supporter, Permission::ManageUsers));
    }

    #[test]
    fn moderator_grants_match_policy() {
        let table = RolePermissionTable::platform_defaults();
        assert!(table.has_permission(Role::Moderator, Permission::ApproveCampaign));
        assert!(table.has_permission(Role::Moderator, Permission::ManageUsers));
        assert!(!table.has_permission(Role::Moderator, Permission::ContributeToCampaign));
    }

    #[test]
    fn admin_holds_every_permission() {
        let table = RolePermissionTable::platform_defaults();
        assert_eq!(table.permissions_of(Role::Admin).len(), 16);
    }

    #[test]
    fn unknown_role_grants_nothing() {
        // A table missing a role must fail closed on lookup but be caught by
        // validation at startup
        let table = RolePermissionTable::new(HashMap::new());
        assert!(table.permissions_of(Role::Admin).is_empty());
        assert!(!table.has_permission(Role::Admin, Permission::ViewCampaigns));
        assert!(table.validate().is_err());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Supporter, Role::Creator, Role::Moderator, Role::Admin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("overlord".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Role::Supporter).unwrap(),
            "\"SUPPORTER\""
        );
        assert_eq!(
            serde_json::to_string(&Permission::ManageUsers).unwrap(),
            "\"MANAGE_USERS\""
        );
    }
}
