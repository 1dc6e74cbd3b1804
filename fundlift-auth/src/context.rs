//! Request context normalization
//!
//! Protected operations are reached through two context shapes: plain
//! request/response and graph-query. `RequestContext::principal` is the one
//! place that branches on the shape; everything downstream of it is
//! context-agnostic.

use crate::roles::Role;
use serde::{Deserialize, Serialize};

/// The authenticated caller, as established by the upstream authentication
/// layer (token verification happens before the guard runs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// A normalized request as delivered by the request-handling layer
///
/// `principal` is `None` when authentication did not run or did not succeed
/// upstream.
#[derive(Debug, Clone, Default)]
pub struct AuthenticatedRequest {
    pub principal: Option<Principal>,
}

impl AuthenticatedRequest {
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

/// Graph-query execution context
///
/// Graph resolvers do not see the request directly; it rides inside the
/// query context, and may be absent entirely for introspection-style
/// queries.
#[derive(Debug, Clone, Default)]
pub struct GraphQueryContext {
    pub request: Option<AuthenticatedRequest>,
    /// Name of the resolved operation, when the executor provides it
    pub operation_name: Option<String>,
}

/// The two context shapes a protected operation can be invoked under
#[derive(Debug, Clone)]
pub enum RequestContext {
    Http(AuthenticatedRequest),
    Graph(GraphQueryContext),
}

impl RequestContext {
    pub fn http(request: AuthenticatedRequest) -> Self {
        RequestContext::Http(request)
    }

    pub fn graph(context: GraphQueryContext) -> Self {
        RequestContext::Graph(context)
    }

    /// Normalize both shapes to the current authenticated principal
    ///
    /// This is the only context-shape branch in the authorization path.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            RequestContext::Http(request) => request.principal.as_ref(),
            RequestContext::Graph(context) => context
                .request
                .as_ref()
                .and_then(|request| request.principal.as_ref()),
        }
    }
}
