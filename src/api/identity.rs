//! Caller Identity Module
//!
//! The per-request identity the cache consumes from the host's auth
//! layer. It is used only to namespace cache keys and to gate the admin
//! surface; the cache never interprets permissions beyond that.

use axum::{extract::Request, middleware::Next, response::Response};

// == Role ==
/// Coarse role taken from the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    Admin,
    Employee,
}

impl Role {
    /// Whether the role may use the cache administration endpoints.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Unknown role strings fall back to the least-privileged role.
    pub fn parse(s: &str) -> Role {
        match s {
            "super_admin" => Role::SuperAdmin,
            "admin" => Role::Admin,
            _ => Role::Employee,
        }
    }
}

// == Caller Identity ==
/// Identity of the authenticated caller, attached to the request as an
/// extension by the host's auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub role: Role,
    /// Tenant/company the caller belongs to, when scoped
    pub company_id: Option<String>,
}

impl CallerIdentity {
    /// The identity fragment embedded in cache keys, so per-user-scoped
    /// data is never cross-served to a different caller.
    pub fn cache_scope(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

/// Marker used in cache keys for unauthenticated requests.
pub const ANONYMOUS_SCOPE: &str = "anonymous";

// == Identity Layer ==
/// Header-based stand-in for the host application's real authentication:
/// reads `x-user-id`, `x-user-role` and `x-company-id` and attaches a
/// [`CallerIdentity`] extension. A host embedding this crate replaces
/// this layer with its own token validation and inserts the same
/// extension.
pub async fn identity_layer(mut req: Request, next: Next) -> Response {
    // Scoped so the borrow of `req` ends before the await; otherwise the
    // returned future is not `Send` and fails `from_fn`'s bounds.
    {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        if let Some(user_id) = header("x-user-id") {
            let role = header("x-user-role")
                .map(|r| Role::parse(&r))
                .unwrap_or(Role::Employee);
            let company_id = header("x-company-id");

            req.extensions_mut().insert(CallerIdentity {
                user_id,
                role,
                company_id,
            });
        }
    }

    next.run(req).await
}
