// ============================
// clawcontrol-backend-lib/src/router.rs
// ============================
//! HTTP route tree.
use crate::handlers::{auth, fleet, library, orgs, sessions};
use crate::middleware::rate_limit;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth endpoints sit behind the per-ip rate limiter; everything
    // else is already gated by session + membership checks.
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).patch(auth::update_me))
        .route("/recovery/request", post(auth::request_recovery))
        .route("/recovery/reset", post(auth::reset_password))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/auth", auth_routes)
        .route("/api/orgs", get(orgs::list_my_orgs))
        .route("/api/orgs/{org_id}", get(orgs::get_org))
        .route(
            "/api/orgs/{org_id}/members",
            get(orgs::list_members).post(orgs::add_member),
        )
        .route(
            "/api/members/{id}",
            patch(orgs::update_member).delete(orgs::remove_member),
        )
        .route("/api/orgs/{org_id}/audit", get(orgs::list_audit))
        .route("/api/orgs/{org_id}/overview", get(orgs::overview))
        .route(
            "/api/orgs/{org_id}/instances",
            get(fleet::list_instances).post(fleet::create_instance),
        )
        .route(
            "/api/instances/{id}",
            get(fleet::get_instance)
                .patch(fleet::update_instance)
                .delete(fleet::delete_instance),
        )
        .route(
            "/api/orgs/{org_id}/agents",
            get(fleet::list_agents).post(fleet::create_agent),
        )
        .route(
            "/api/agents/{id}",
            get(fleet::get_agent)
                .patch(fleet::update_agent)
                .delete(fleet::delete_agent),
        )
        .route(
            "/api/orgs/{org_id}/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session)
                .patch(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route(
            "/api/sessions/{id}/messages",
            get(sessions::list_messages).post(sessions::post_message),
        )
        .route(
            "/api/orgs/{org_id}/skills",
            get(library::list_skills).post(library::create_skill),
        )
        .route(
            "/api/skills/{id}",
            patch(library::update_skill).delete(library::delete_skill),
        )
        .route(
            "/api/orgs/{org_id}/channels",
            get(library::list_channels).post(library::create_channel),
        )
        .route(
            "/api/channels/{id}",
            patch(library::update_channel).delete(library::delete_channel),
        )
        .route(
            "/api/orgs/{org_id}/blueprints",
            get(library::list_blueprints).post(library::create_blueprint),
        )
        .route(
            "/api/blueprints/{id}",
            patch(library::update_blueprint).delete(library::delete_blueprint),
        )
        .route(
            "/api/orgs/{org_id}/swarms",
            get(library::list_swarms).post(library::create_swarm),
        )
        .route(
            "/api/swarms/{id}",
            patch(library::update_swarm).delete(library::delete_swarm),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
