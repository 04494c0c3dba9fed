pub mod activities;
pub mod submissions;

use axum::routing::{get, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Activity registry
        .route(
            "/api/v1/activities",
            get(activities::list).post(activities::create),
        )
        .route(
            "/api/v1/activities/{id}",
            get(activities::get)
                .put(activities::update)
                .delete(activities::delete),
        )
        // Evidence submission + review panel
        .route(
            "/api/v1/activities/{id}/submissions",
            get(activities::list_submissions).post(submissions::submit),
        )
        .route("/api/v1/submissions", get(submissions::list_all))
        .route("/api/v1/submissions/mine", get(submissions::list_mine))
        .route("/api/v1/submissions/{id}/review", put(submissions::review))
}
