use std::net::SocketAddr;

use axum::{
    middleware::{from_fn_with_state, map_response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    auth, boards,
    middleware::{require_auth, set_json_content_type},
    puzzles,
    state::AppState,
    users,
};

pub fn build_app(state: AppState) -> Router {
    let public = Router::new()
        .merge(auth::routes())
        .merge(users::public_routes())
        .route("/health", get(|| async { Json("ok") }));

    let protected = Router::new()
        .merge(users::protected_routes())
        .merge(puzzles::routes())
        .merge(boards::routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let timeout = state.config.request_timeout();

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(set_json_content_type))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
