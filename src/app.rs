use std::sync::Arc;

use axum::Router;
use tower_http::{normalize_path::NormalizePath, trace::TraceLayer};

use crate::{config::Settings, routes, sql::DB};

pub type SharedState = Arc<ServerState>;

pub struct ServerState {
	pub db: DB,
	pub settings: Settings,
}

pub fn new_shared_state(db: DB, settings: Settings) -> SharedState {
	Arc::new(ServerState { db, settings })
}

pub fn router(state: SharedState) -> Router {
	routes::router()
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// The router behind trailing-slash normalization, so `/books/` and `/books` both resolve.
pub fn service(state: SharedState) -> NormalizePath<Router> {
	NormalizePath::trim_trailing_slash(router(state))
}
