use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/test", get(handlers::health::db_check))
        // auth
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/reset-password", post(handlers::auth::reset_password))
        .route("/api/auth/verify-email", post(handlers::auth::verify_email))
        .route("/api/auth/change-password", post(handlers::auth::change_password))
        // email
        .route("/api/send-welcome-email", post(handlers::email::send_welcome_email))
        .route("/api/send-password-reset", post(handlers::email::send_password_reset))
        .route(
            "/api/send-verification-email",
            post(handlers::email::send_verification_email),
        )
        // accounts
        .route(
            "/api/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/api/users/:id/settings",
            get(handlers::users::get_settings).put(handlers::users::update_settings),
        )
        // instructors
        .route("/api/instructors", get(handlers::instructors::list_instructors))
        .route("/api/instructors/:id", get(handlers::instructors::get_instructor))
        .route(
            "/api/instructors/:id/profile",
            put(handlers::instructors::update_profile),
        )
        .route(
            "/api/instructors/:id/availability",
            get(handlers::instructors::get_availability)
                .put(handlers::instructors::update_availability),
        )
        .route("/api/instructors/:id/slots", get(handlers::instructors::get_slots))
        .route(
            "/api/instructors/:id/schedule",
            get(handlers::instructors::get_schedule),
        )
        .route(
            "/api/instructors/:id/dashboard",
            get(handlers::instructors::get_dashboard),
        )
        .route(
            "/api/instructors/:id/clients",
            get(handlers::instructors::list_clients),
        )
        .route(
            "/api/instructors/:id/clients/:client_id",
            put(handlers::instructors::set_client_status),
        )
        .route("/api/instructor-fees", post(handlers::billing::upsert_fees))
        // clients
        .route(
            "/api/create-client-profile",
            post(handlers::clients::create_client_profile),
        )
        .route(
            "/api/clients/:id/profile",
            get(handlers::clients::get_client_profile),
        )
        // sessions
        .route("/api/sessions", post(handlers::sessions::create_session))
        .route("/api/sessions/:id", get(handlers::sessions::list_sessions))
        .route(
            "/api/sessions/:id/status",
            put(handlers::sessions::update_session_status),
        )
        // content
        .route(
            "/api/videos",
            get(handlers::videos::list_videos).post(handlers::videos::create_video),
        )
        .route("/api/videos/:id", delete(handlers::videos::delete_video))
        .route(
            "/api/workout-plans",
            get(handlers::workouts::list_plans).post(handlers::workouts::create_plan),
        )
        .route(
            "/api/workout-plans/:id",
            get(handlers::workouts::get_plan)
                .put(handlers::workouts::update_plan)
                .delete(handlers::workouts::delete_plan),
        )
        .route(
            "/api/workout-plans/:id/reviews",
            post(handlers::workouts::add_review),
        )
        .route(
            "/api/workout-guides",
            get(handlers::guides::list_guides).post(handlers::guides::create_guide),
        )
        .route(
            "/api/workout-guides/:id",
            delete(handlers::guides::delete_guide),
        )
        .route(
            "/api/workout-guides/:id/download",
            post(handlers::guides::download_guide),
        )
        // community
        .route(
            "/api/forum/posts",
            get(handlers::forum::list_posts).post(handlers::forum::create_post),
        )
        .route("/api/forum/posts/:id/like", post(handlers::forum::like_post))
        // progress
        .route("/api/progress", post(handlers::progress::create_progress))
        .route("/api/progress/:id", get(handlers::progress::list_progress))
        // billing
        .route("/api/subscription-plans", get(handlers::billing::list_plans))
        .route("/api/subscribe", post(handlers::billing::subscribe))
        .route(
            "/api/subscriptions/:id",
            get(handlers::billing::list_subscriptions),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
