//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/teste", get(api::teste))
        .route(
            "/desconto_realizado/{fornecedor}/{varejista}",
            get(api::desconto_realizado),
        )
        .route(
            "/desconto_calculado/{fornecedor}/{varejista}",
            get(api::desconto_calculado),
        )
        .route("/tabelaDeVariaveis", get(api::tabela_de_variaveis))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
