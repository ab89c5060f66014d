//! Edge routing middleware.
//! Applies the `EdgeRouter` decision before anything reaches a handler.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::RequestIdExt;
use crate::http::response::{append_cookies, redirect};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::{Decision, Outcome, RouteRequest};

pub async fn edge_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let decision = {
        let runtime = state.runtime.load();
        if !runtime.router.in_scope(request.uri().path()) {
            None
        } else {
            Some(runtime.router.route(&RouteRequest::from_http(request.uri(), request.headers())))
        }
    };

    // Out of scope: static assets, API calls, ...
    let Some(decision) = decision else {
        return next.run(request).await;
    };

    tracing::debug!(
        request_id = %request.headers().request_id(),
        path = %request.uri().path(),
        decision = decision.kind.as_str(),
        locale = %decision.locale,
        role = ?decision.role,
        "Edge decision"
    );
    metrics::record_decision(decision.kind);

    if let Outcome::Redirect { location } = &decision.outcome {
        return redirect(location, &decision.cookies);
    }

    // Handlers downstream read the decision from the extensions.
    let cookies = decision.cookies.clone();
    request.extensions_mut().insert::<Decision>(decision);
    let mut response = next.run(request).await;
    append_cookies(&mut response, &cookies);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::routing::{DecisionKind, Role};
    use axum::{
        http::{header, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::from_config(&GatewayConfig::default()).unwrap();
        Router::new()
            .route(
                "/vi/portal/admin",
                get(|Extension(decision): Extension<Decision>| async move {
                    assert_eq!(decision.role, Some(Role::Admin));
                    decision.kind.as_str()
                }),
            )
            .layer(middleware::from_fn_with_state(state.clone(), edge_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_pass_through_exposes_decision_and_cookies() {
        let request = Request::builder()
            .uri("/vi/portal/admin")
            .header(header::COOKIE, "role=ADMIN")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::SET_COOKIE],
            "locale=vi; Path=/; Max-Age=31536000; SameSite=Lax"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], DecisionKind::Authorized.as_str().as_bytes());
    }

    #[tokio::test]
    async fn test_redirect_never_reaches_handler() {
        let request = Request::builder()
            .uri("/vi/portal/admin")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/vi/auth/login?returnTo=%2Fvi%2Fportal%2Fadmin"
        );
    }
}
