//! Route table and handlers.

use crate::error::QueryError;
use crate::query::{PropertyQuery, Resolver};
use crate::store::PropertySource;
use crate::types::StoredProperty;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Body of every 500 response. Storage details stay in the log.
const INTERNAL_ERROR_MESSAGE: &str = "Unable to fetch configuration";

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            QueryError::NotFound { key } => (StatusCode::NOT_FOUND, key).into_response(),
            QueryError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
            }
        }
    }
}

/// Resolve `query` off the async runtime, since store reads block.
async fn lookup<S>(resolver: Arc<Resolver<S>>, query: PropertyQuery) -> Response
where
    S: PropertySource + Send + Sync + 'static,
{
    let result = tokio::task::spawn_blocking(move || resolver.resolve(&query)).await;
    match result {
        Ok(Ok(rows)) => Json::<Vec<StoredProperty>>(rows).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            error!(error = %e, "Lookup task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
        }
    }
}

async fn fetch_application<S>(
    State(resolver): State<Arc<Resolver<S>>>,
    Path(application): Path<String>,
) -> Response
where
    S: PropertySource + Send + Sync + 'static,
{
    lookup(resolver, PropertyQuery::Application { application }).await
}

async fn fetch_application_profile<S>(
    State(resolver): State<Arc<Resolver<S>>>,
    Path((application, profile)): Path<(String, String)>,
) -> Response
where
    S: PropertySource + Send + Sync + 'static,
{
    lookup(
        resolver,
        PropertyQuery::ApplicationProfile {
            application,
            profile,
        },
    )
    .await
}

async fn fetch_application_profile_key<S>(
    State(resolver): State<Arc<Resolver<S>>>,
    Path((application, profile, key)): Path<(String, String, String)>,
) -> Response
where
    S: PropertySource + Send + Sync + 'static,
{
    lookup(
        resolver,
        PropertyQuery::ApplicationProfileKey {
            application,
            profile,
            key,
        },
    )
    .await
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router over a shared resolver.
pub fn build_router<S>(resolver: Arc<Resolver<S>>) -> Router
where
    S: PropertySource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/config/{application}", get(fetch_application::<S>))
        .route(
            "/config/{application}/{profile}",
            get(fetch_application_profile::<S>),
        )
        .route(
            "/config/{application}/{profile}/{key}",
            get(fetch_application_profile_key::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(resolver)
}
