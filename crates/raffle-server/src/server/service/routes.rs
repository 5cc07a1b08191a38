use crate::server::service::handler::{
    create_catalog_draw, create_draw, delete_draw, draw_one, health, method_not_allowed,
    not_found, replace_draw, sample_catalog,
};
use crate::server::service::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};

/// Builds the HTTP surface.
///
/// | Method   | Path                 | Data                |
/// |----------|----------------------|---------------------|
/// | `POST`   | `/draws`             | `{ id }`            |
/// | `POST`   | `/draws/catalog`     | `{ id }`            |
/// | `POST`   | `/draws/{id}/draw`   | `{ name }`          |
/// | `PUT`    | `/draws/{id}`        | `{}`                |
/// | `DELETE` | `/draws/{id}`        | `{ deleted }`       |
/// | `GET`    | `/catalog/sample`    | `{ entries }`       |
/// | `GET`    | `/health`            | `{}`                |
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/draws", post(create_draw))
        .route("/draws/catalog", post(create_catalog_draw))
        .route("/draws/{id}", put(replace_draw).delete(delete_draw))
        .route("/draws/{id}/draw", post(draw_one))
        .route("/catalog/sample", get(sample_catalog))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}
