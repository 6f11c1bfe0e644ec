use axum::{
	Router,
	routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::App;
use crate::handler;

pub fn init(app: App) -> Router {
	Router::new()
		.route("/api/auth/login", post(handler::auth::post_login))
		.route("/api/auth/session", get(handler::auth::get_session))
		.route("/api/auth/logout", post(handler::auth::post_logout))
		.route("/api/repo/browse", get(handler::repo::get_browse))
		.route("/api/repo/view", get(handler::repo::get_view))
		.route("/api/repo/search", get(handler::repo::get_search))
		.route("/api/audit", get(handler::audit::get_audit))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
