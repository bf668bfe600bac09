pub mod attachments;
pub mod error;
pub mod messages;
pub mod state;
pub mod validate;

use axum::{Router, extract::DefaultBodyLimit, routing::{get, post}};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All HTTP routes. `body_limit` caps a whole request, so it must leave room
/// for several maximum-size attachments plus form overhead.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/send-email", post(messages::send_email))
        .route("/api/messages", get(messages::list_messages))
        .route(
            "/api/messages/{id}",
            get(messages::get_message).delete(messages::delete_message),
        )
        .route("/api/attachments/{id}/download", get(attachments::download_attachment))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
