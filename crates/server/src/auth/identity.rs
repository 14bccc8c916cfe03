use parley_core::Username;

/// Server-side caller identity extracted from authentication.
///
/// Inserted into request extensions by the auth middleware so handlers
/// can attribute actions to the authenticated user.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// The authenticated username.
    pub username: Username,
    /// Authentication method (currently always `"jwt"`).
    pub auth_method: String,
}
