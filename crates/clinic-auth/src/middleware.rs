//! Authentication Middleware for Axum
//!
//! Request gate in two layers:
//! - [`AuthLayer`] requires `Authorization: Bearer <token>`, validates the
//!   token and inserts an [`AuthContext`] into request extensions
//! - [`RoleLayer`] admits only callers whose role is in a [`RoleSet`]
//!
//! Both short-circuit with a JSON error body. Token failures are logged with
//! their precise reason but always render the same client message.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use chrono::Utc;
use clinic_types::RoleSet;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::error::{AuthError, ErrorResponse};
use crate::jwt::JwtService;
use crate::types::AuthContext;

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtService>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: self.jwt.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtService>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let jwt = self.jwt.clone();
        // Take the service that was driven to readiness, leave a fresh clone
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authenticate_request(req.headers(), &jwt) {
                Ok(context) => {
                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert(context);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(e) => {
                    metrics::counter!("clinic_auth_rejections_total", "reason" => e.reason())
                        .increment(1);
                    if e.is_token_error() {
                        warn!(
                            reason = e.reason(),
                            path = %req.uri().path(),
                            "Rejected access token"
                        );
                    } else {
                        debug!(
                            reason = e.reason(),
                            path = %req.uri().path(),
                            "Rejected unauthenticated request"
                        );
                    }
                    Ok(auth_error_response(&e))
                }
            }
        })
    }
}

/// Authenticate a request from its headers
fn authenticate_request(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthContext, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = jwt.validate(token, Utc::now())?;
    Ok(AuthContext::from(claims))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Exactly one space after the scheme, a non-empty token and no further
/// whitespace.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;
    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedAuthorization)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

/// Role-restriction layer. Must run inside [`AuthLayer`].
#[derive(Clone, Copy)]
pub struct RoleLayer {
    allowed: RoleSet,
}

impl RoleLayer {
    pub fn new(allowed: impl Into<RoleSet>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleGuard<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleGuard {
            inner,
            allowed: self.allowed,
        }
    }
}

/// Role-restriction service
#[derive(Clone)]
pub struct RoleGuard<S> {
    inner: S,
    allowed: RoleSet,
}

impl<S> Service<Request> for RoleGuard<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let allowed = self.allowed;
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authorize(req.extensions().get::<AuthContext>(), allowed) {
                Ok(()) => inner.call(req).await,
                Err(e) => {
                    metrics::counter!("clinic_auth_rejections_total", "reason" => e.reason())
                        .increment(1);
                    Ok(auth_error_response(&e))
                }
            }
        })
    }
}

/// Check the caller's role against an allowed set
pub fn authorize(context: Option<&AuthContext>, allowed: RoleSet) -> Result<(), AuthError> {
    let context = context.ok_or(AuthError::MissingAuthorization)?;
    if allowed.contains(context.role) {
        Ok(())
    } else {
        warn!(
            username = %context.username,
            role = %context.role,
            allowed = %allowed,
            "Role not permitted on this route"
        );
        Err(AuthError::Forbidden)
    }
}

/// Create error response for authentication errors
pub fn auth_error_response(error: &AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(error);

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

// =============================================================================
// Axum Extractors
// =============================================================================

/// Extractor for the authenticated caller. Returns 401 if the auth layer
/// did not run for this route.
pub struct RequireAuth(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| auth_error_response(&AuthError::MissingAuthorization))
    }
}
