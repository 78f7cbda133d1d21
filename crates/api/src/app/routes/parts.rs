use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use stockroom_core::PartId;
use stockroom_parts::Movement;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route("/summary", get(get_summary))
        .route("/move", post(move_part))
        .route("/:id", put(update_part).delete(delete_part))
}

pub async fn list_parts(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().list().await {
        Ok(parts) => {
            let body: Vec<serde_json::Value> = parts.into_iter().map(dto::part_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_part(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePartRequest>,
) -> axum::response::Response {
    let new_part = match body.into_new_part() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().create(new_part).await {
        Ok(part) => {
            tracing::info!(part_id = %part.id, "part created");
            (StatusCode::CREATED, Json(dto::part_to_json(part))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePartRequest>,
) -> axum::response::Response {
    let id: PartId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid part id"),
    };

    match services.store().update(&id, body.into_patch()).await {
        Ok(part) => (StatusCode::OK, Json(dto::part_to_json(part))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid part id"),
    };

    match services.store().delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "part not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn move_part(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MovePartRequest>,
) -> axum::response::Response {
    // Preconditions are checked before any storage access.
    let direction = match errors::parse_direction(&body.direction) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let part_id: PartId = match body.part_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid part id"),
    };
    let movement = match Movement::new(part_id, body.quantity, direction) {
        Ok(m) => m.with_note(body.note),
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Some(note) = &movement.note {
        // Movement history is not persisted; the note still lands in the log.
        tracing::info!(part_id = %movement.part_id, note = %note, "movement note");
    }

    match services.store().apply_movement(movement).await {
        Ok(part) => (StatusCode::OK, Json(dto::part_to_json(part))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_summary(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().summary().await {
        Ok(summary) => (StatusCode::OK, Json(dto::summary_to_json(summary))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
