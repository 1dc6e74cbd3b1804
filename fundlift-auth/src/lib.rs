//! Authentication and Access-Control Module
//!
//! The security core of the platform: credential hashing, identity token
//! issuance/verification, and role/permission based authorization. The
//! service boundary (`AuthGateway`) exposes the credential and token
//! operations so that other processes can call them without holding the
//! hashing parameters or the signing secret.

pub mod context;
pub mod credential;
pub mod gateway;
pub mod guard;
pub mod policy;
pub mod roles;
pub mod token;

pub use context::{AuthenticatedRequest, GraphQueryContext, Principal, RequestContext};
pub use credential::CredentialHasher;
pub use gateway::{AuthGateway, LocalAuthGateway};
pub use guard::AccessGuard;
pub use policy::{AccessPolicy, OperationPolicies};
pub use roles::{Permission, Role, RolePermissionTable};
pub use token::{TokenClaims, TokenIssuer};
