//! Per-route gating declaration.

use axum::http::Method;

/// What a route requires before application logic may run.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Methods the route accepts. Anything else is rejected before any
    /// resource is acquired.
    pub allowed_methods: Vec<Method>,
    /// Whether a transactional resource is opened for the invocation.
    pub needs_transaction: bool,
    /// Whether the login gate applies.
    pub required_login: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            allowed_methods: vec![Method::GET, Method::POST, Method::HEAD],
            needs_transaction: false,
            required_login: false,
        }
    }
}

impl RouteConfig {
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }
}
