use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use cakeday_types::api::{Claims, CongratulationRequest};

use crate::auth::AppStateInner;
use crate::error::ApiError;
use crate::forms;

/// POST /birthdays/{id}/congratulations — leave a congratulation on a
/// birthday. Both outcomes redirect back to the detail route; a blank
/// submission is dropped without persisting anything.
pub async fn add_congratulation(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CongratulationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    match forms::clean_congratulation(&req.text) {
        Some(text) => {
            let db = state.clone();
            let author_id = claims.sub.to_string();
            tokio::task::spawn_blocking(move || {
                db.db.insert_congratulation(&text, &author_id, row.id)
            })
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;
        }
        None => {
            debug!("Dropping blank congratulation for birthday {}", id);
        }
    }

    Ok(Redirect::to(&format!("/birthdays/{}", id)))
}
