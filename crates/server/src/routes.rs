use std::future::Future;
use std::sync::Arc;

use axum::body::{to_bytes, Bytes};
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::types::{ErrorBody, Health};
use service::about_us::{AboutUsRepository, AboutUsService};
use service::services::{ServiceRepository, ServiceService};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{warn, Level};

use crate::controllers::{AboutUsController, ServiceController};
use crate::errors::ApiError;
use crate::router::{Dispatch, Handler, PathRouter, RouteError, RouteParams};

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Bind a shared controller into a route handler.
fn bind<C, F, Fut>(controller: &Arc<C>, f: F) -> impl Handler
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>, RouteParams, Bytes) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let controller = Arc::clone(controller);
    move |params: RouteParams, body: Bytes| f(Arc::clone(&controller), params, body)
}

/// The `/api/v1` route table. Literal routes come before `{id}` routes.
pub fn build_api_router<SR, AR>(
    services: Arc<ServiceService<SR>>,
    about_us: Arc<AboutUsService<AR>>,
) -> Result<PathRouter, RouteError>
where
    SR: ServiceRepository + 'static,
    AR: AboutUsRepository + 'static,
{
    let sc = Arc::new(ServiceController::new(services));
    let ac = Arc::new(AboutUsController::new(about_us));

    let mut router = PathRouter::new();
    router.group("/api/v1", |r| {
        r.get("/services", bind(&sc, |c, _, _| async move { c.index().await.into_response() }))?
            .get("/services/{id}", bind(&sc, |c, p, _| async move { c.show(p).await.into_response() }))?
            .post("/services", bind(&sc, |c, _, b| async move { c.store(b).await.into_response() }))?
            .put("/services/{id}", bind(&sc, |c, p, b| async move { c.update(p, b).await.into_response() }))?
            .delete("/services/{id}", bind(&sc, |c, p, _| async move { c.destroy(p).await.into_response() }))?;

        r.get("/about-us", bind(&ac, |c, _, _| async move { c.index().await.into_response() }))?
            .get("/about-us/type/{type}", bind(&ac, |c, p, _| async move { c.by_type(p).await.into_response() }))?
            .get("/about-us/{id}", bind(&ac, |c, p, _| async move { c.show(p).await.into_response() }))?
            .post("/about-us", bind(&ac, |c, _, b| async move { c.store(b).await.into_response() }))?
            .put("/about-us/{id}", bind(&ac, |c, p, b| async move { c.update(p, b).await.into_response() }))?
            .delete("/about-us/{id}", bind(&ac, |c, p, _| async move { c.destroy(p).await.into_response() }))?;
        Ok(())
    })?;
    Ok(router)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Hand every request not served by axum itself to the path router.
async fn dispatch_request(api: Arc<PathRouter>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    if parts.method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(ErrorBody::new("Request body too large"))).into_response();
        }
    };
    let path = parts.uri.path();
    match api.dispatch(&parts.method, path, body).await {
        Dispatch::Matched(resp) => resp,
        Dispatch::Unmatched => {
            warn!(method = %parts.method, path, "Route not found");
            (StatusCode::NOT_FOUND, Json(ErrorBody::new("Route not found"))).into_response()
        }
    }
}

/// A panicking handler still answers with the generic 500 body.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// Full application: health check, path router fallback, CORS and request tracing.
/// Other methods on `/health` go through the same fallback as unknown routes.
pub fn build_router(api: PathRouter) -> Router {
    let api = Arc::new(api);
    let health_api = Arc::clone(&api);
    Router::new()
        .route(
            "/health",
            get(health).fallback(move |req: Request| dispatch_request(Arc::clone(&health_api), req)),
        )
        .fallback(move |req: Request| dispatch_request(Arc::clone(&api), req))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
