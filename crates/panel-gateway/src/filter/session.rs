//! Session guard filter.
//!
//! Admits a request only when its `Cookie` header carries a session token
//! the configured [`SessionTokens`] scheme accepts. Anything else is
//! rejected with `401` before a handler runs, so an unauthenticated request
//! never reaches an upstream. The login endpoints are the only exemptions.

use async_trait::async_trait;
use chrono::Utc;
use panel_kernel::gateway::{FilterAction, FilterOrder, GatewayContext, GatewayFilter};
use panel_kernel::session::{SESSION_COOKIE, SessionTokens};
use std::sync::Arc;
use tracing::warn;

use crate::session::extract_cookie;

/// Paths reachable without a session.
pub const PUBLIC_PATHS: [&str; 3] = ["/auth/login", "/auth/logout", "/auth/session"];

pub struct SessionFilter {
    tokens: Arc<dyn SessionTokens>,
    public_paths: Vec<String>,
}

impl SessionFilter {
    pub fn new(tokens: Arc<dyn SessionTokens>) -> Self {
        Self {
            tokens,
            public_paths: PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }
}

#[async_trait]
impl GatewayFilter for SessionFilter {
    fn name(&self) -> &str {
        "session-guard"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::AUTH
    }

    async fn on_request(&self, ctx: &mut GatewayContext) -> FilterAction {
        if self.is_public(&ctx.request.path) {
            return FilterAction::Continue;
        }

        let token = ctx
            .request
            .header("cookie")
            .and_then(|h| extract_cookie(h, SESSION_COOKIE));

        let Some(token) = token else {
            warn!(request_id = %ctx.request.id, path = %ctx.request.path, "rejected request: no session cookie");
            return FilterAction::Reject(401, "Unauthorized".to_string());
        };

        match self.tokens.verify(token, Utc::now()) {
            Ok(_) => {
                ctx.authenticated = true;
                FilterAction::Continue
            }
            Err(e) => {
                warn!(request_id = %ctx.request.id, path = %ctx.request.path, reason = %e, "rejected request: invalid session");
                FilterAction::Reject(401, "Unauthorized".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MarkerSessionTokens, SignedSessionTokens};
    use panel_kernel::gateway::{GatewayRequest, HttpMethod};

    fn ctx(path: &str, cookie: Option<&str>) -> GatewayContext {
        let mut req = GatewayRequest::new("req-1", path, HttpMethod::Get);
        if let Some(c) = cookie {
            req = req.with_header("Cookie", c);
        }
        GatewayContext::new(req)
    }

    #[tokio::test]
    async fn valid_session_passes() {
        let tokens = Arc::new(SignedSessionTokens::new(b"k").unwrap());
        let token = tokens.issue(Utc::now());
        let filter = SessionFilter::new(tokens);

        let mut c = ctx("/variables", Some(&format!("auth_token={}", token.value)));
        assert_eq!(filter.on_request(&mut c).await, FilterAction::Continue);
        assert!(c.authenticated);
    }

    #[tokio::test]
    async fn missing_cookie_returns_401() {
        let filter = SessionFilter::new(Arc::new(MarkerSessionTokens));
        let mut c = ctx("/health", None);
        assert_eq!(
            filter.on_request(&mut c).await,
            FilterAction::Reject(401, "Unauthorized".into())
        );
        assert!(!c.authenticated);
    }

    #[tokio::test]
    async fn forged_marker_is_refused_by_signed_scheme() {
        let filter = SessionFilter::new(Arc::new(SignedSessionTokens::new(b"k").unwrap()));
        let mut c = ctx("/variables", Some("auth_token=authenticated"));
        assert!(matches!(filter.on_request(&mut c).await, FilterAction::Reject(401, _)));
    }

    #[tokio::test]
    async fn login_path_is_exempt() {
        let filter = SessionFilter::new(Arc::new(MarkerSessionTokens));
        let mut c = ctx("/auth/login", None);
        assert_eq!(filter.on_request(&mut c).await, FilterAction::Continue);
        assert!(!c.authenticated);
    }
}
