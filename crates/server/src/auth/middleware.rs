use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use super::identity::CallerIdentity;
use super::jwt::JwtVerifier;

/// Tower layer that authenticates owner-facing routes.
#[derive(Clone)]
pub struct AuthLayer {
    verifier: Option<Arc<JwtVerifier>>,
}

impl AuthLayer {
    pub fn new(verifier: Option<Arc<JwtVerifier>>) -> Self {
        Self { verifier }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            verifier: self.verifier.clone(),
        }
    }
}

/// Tower service that authenticates requests.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    verifier: Option<Arc<JwtVerifier>>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let verifier = self.verifier.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(verifier) = verifier else {
                // Auth disabled: inject anonymous identity.
                req.extensions_mut().insert(CallerIdentity::anonymous());
                return inner.call(req).await;
            };

            if let Some(auth_header) = req.headers().get("authorization")
                && let Ok(header_str) = auth_header.to_str()
                && let Some(token) = header_str.strip_prefix("Bearer ")
            {
                return match verifier.verify(token.trim()) {
                    Ok(identity) => {
                        req.extensions_mut().insert(identity);
                        inner.call(req).await
                    }
                    Err(e) => Ok(unauthorized(&e)),
                };
            }

            Ok(unauthorized("missing authentication credentials"))
        })
    }
}

fn unauthorized(message: &str) -> Response {
    let body = serde_json::json!({ "error": message });
    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
