//! Access guard
//!
//! Evaluated once per protected operation invocation. The guard owns no
//! mutable state and mutates neither the request nor the policy.

use crate::context::RequestContext;
use crate::policy::AccessPolicy;
use crate::roles::RolePermissionTable;
use fundlift_core::{ErrorContext, PlatformError, PlatformResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Gate that checks a declared policy against the authenticated caller
#[derive(Debug, Clone)]
pub struct AccessGuard {
    table: Arc<RolePermissionTable>,
}

impl AccessGuard {
    pub fn new(table: Arc<RolePermissionTable>) -> Self {
        Self { table }
    }

    /// Evaluate `policy` for the caller carried by `ctx`
    ///
    /// Returns `Ok(())` to allow. Rejections are `AuthorizationMissing` when
    /// no authenticated principal is present, or `Authorization` carrying
    /// the required roles (role gate) or exactly the missing permissions
    /// (permission gate).
    pub fn check(&self, policy: &AccessPolicy, ctx: &RequestContext) -> PlatformResult<()> {
        // No requirements declared: allow unconditionally
        if policy.is_unrestricted() {
            return Ok(());
        }

        let principal = match ctx.principal() {
            Some(principal) => principal,
            None => {
                warn!("rejected request without authenticated principal");
                return Err(PlatformError::authorization_missing("guard"));
            }
        };

        // Role gate: the caller must hold at least one of the declared roles
        if !policy.roles.is_empty() && !policy.roles.contains(&principal.role) {
            warn!(
                user_id = %principal.user_id,
                role = %principal.role,
                "role requirement not met"
            );
            return Err(PlatformError::Authorization {
                required_roles: policy.roles.iter().map(|r| r.to_string()).collect(),
                missing_permissions: Vec::new(),
                context: ErrorContext::new("guard").with_operation("role_check"),
            });
        }

        // Permission gate: the caller's role must hold every declared
        // permission; report exactly the missing subset
        if !policy.permissions.is_empty() {
            let missing: Vec<_> = policy
                .permissions
                .iter()
                .filter(|p| !self.table.has_permission(principal.role, **p))
                .copied()
                .collect();

            if !missing.is_empty() {
                warn!(
                    user_id = %principal.user_id,
                    role = %principal.role,
                    missing = ?missing.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                    "permission requirement not met"
                );
                return Err(PlatformError::Authorization {
                    required_roles: Vec::new(),
                    missing_permissions: missing.iter().map(|p| p.to_string()).collect(),
                    context: ErrorContext::new("guard").with_operation("permission_check"),
                });
            }
        }

        debug!(user_id = %principal.user_id, role = %principal.role, "access granted");
        Ok(())
    }
}
