use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use cakeday_db::models::{BirthdayRow, CongratulationRow};
use cakeday_types::api::{
    BirthdayDetailResponse, BirthdayListResponse, BirthdayRequest, BirthdayResponse, Claims,
    CongratulationResponse,
};

use crate::auth::AppStateInner;
use crate::countdown::calculate_birthday_countdown;
use crate::error::ApiError;
use crate::forms;

pub const PER_PAGE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Only the author of a record may mutate it. Evaluated against the freshly
/// loaded row on every request, never cached.
pub fn ensure_author(row_author_id: &str, claims: &Claims) -> Result<(), ApiError> {
    if row_author_id == claims.sub.to_string() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub async fn list_birthdays(
    State(state): State<Arc<AppStateInner>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.page == 0 {
        return Err(ApiError::unprocessable_entity([("page", "must be at least 1")]));
    }
    let offset = (query.page as u64 - 1) * PER_PAGE as u64;

    // Run blocking DB queries off the async runtime
    let db = state.clone();
    let (rows, total, tag_rows) = tokio::task::spawn_blocking(move || {
        let rows = db.db.list_birthdays(PER_PAGE, offset)?;
        let total = db.db.count_birthdays()?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let tag_rows = db.db.get_tags_for_birthdays(&ids)?;
        Ok::<_, anyhow::Error>((rows, total, tag_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    // Group tags by birthday id (cheap in-memory work, fine on the async thread)
    let mut tag_map: HashMap<i64, Vec<String>> = HashMap::new();
    for t in tag_rows {
        tag_map.entry(t.birthday_id).or_default().push(t.name);
    }

    let items = rows
        .into_iter()
        .map(|row| {
            let tags = tag_map.remove(&row.id).unwrap_or_default();
            to_response(row, tags)
        })
        .collect();

    Ok(Json(BirthdayListResponse {
        items,
        page: query.page,
        total,
        per_page: PER_PAGE,
    }))
}

pub async fn get_birthday(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let (row, tag_rows, congratulation_rows) = tokio::task::spawn_blocking(move || {
        let row = db.db.get_birthday(id)?;
        let tag_rows = db.db.get_tags_for_birthdays(&[id])?;
        let congratulation_rows = db.db.get_congratulations(id)?;
        Ok::<_, anyhow::Error>((row, tag_rows, congratulation_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    let row = row.ok_or(ApiError::NotFound)?;

    let birthday = to_response(row, tag_rows.into_iter().map(|t| t.name).collect());
    let today = chrono::Utc::now().date_naive();
    let countdown = calculate_birthday_countdown(birthday.birthday, today);

    let congratulations = congratulation_rows
        .into_iter()
        .map(congratulation_to_response)
        .collect();

    Ok(Json(BirthdayDetailResponse {
        birthday,
        countdown,
        congratulations,
    }))
}

pub async fn create_birthday(
    State(state): State<Arc<AppStateInner>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BirthdayRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let clean = forms::validate(&req, today, state.max_age_years)
        .map_err(|errors| ApiError::unprocessable_entity(errors))?;

    let db = state.clone();
    let author_id = claims.sub.to_string();
    let (row, tag_rows) = tokio::task::spawn_blocking(move || {
        let id = db.db.insert_birthday(
            &clean.first_name,
            &clean.last_name,
            &clean.birthday.to_string(),
            &author_id,
            &clean.tags,
        )?;
        let row = db
            .db
            .get_birthday(id)?
            .ok_or_else(|| anyhow::anyhow!("birthday {} missing after insert", id))?;
        let tag_rows = db.db.get_tags_for_birthdays(&[id])?;
        Ok::<_, anyhow::Error>((row, tag_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok((
        StatusCode::CREATED,
        Json(to_response(row, tag_rows.into_iter().map(|t| t.name).collect())),
    ))
}

pub async fn update_birthday(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BirthdayRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    ensure_author(&row.author_id, &claims)?;

    let today = chrono::Utc::now().date_naive();
    let clean = forms::validate(&req, today, state.max_age_years)
        .map_err(|errors| ApiError::unprocessable_entity(errors))?;

    let db = state.clone();
    let (row, tag_rows) = tokio::task::spawn_blocking(move || {
        db.db.update_birthday(
            id,
            &clean.first_name,
            &clean.last_name,
            &clean.birthday.to_string(),
            &clean.tags,
        )?;
        let row = db
            .db
            .get_birthday(id)?
            .ok_or_else(|| anyhow::anyhow!("birthday {} missing after update", id))?;
        let tag_rows = db.db.get_tags_for_birthdays(&[id])?;
        Ok::<_, anyhow::Error>((row, tag_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(to_response(row, tag_rows.into_iter().map(|t| t.name).collect())))
}

pub async fn delete_birthday(
    State(state): State<Arc<AppStateInner>>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound)?;

    ensure_author(&row.author_id, &claims)?;

    let db = state.clone();
    tokio::task::spawn_blocking(move || db.db.delete_birthday(id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(StatusCode::NO_CONTENT)
}

fn to_response(row: BirthdayRow, tags: Vec<String>) -> BirthdayResponse {
    BirthdayResponse {
        id: row.id,
        birthday: row.birthday.parse().unwrap_or_else(|e| {
            warn!("Corrupt birthday date '{}' on record {}: {}", row.birthday, row.id, e);
            chrono::NaiveDate::default()
        }),
        first_name: row.first_name,
        last_name: row.last_name,
        image: row.image,
        author_id: parse_uuid(&row.author_id, row.id, "author_id"),
        author_username: row.author_username,
        tags,
        created_at: parse_timestamp(&row.created_at, row.id),
    }
}

fn congratulation_to_response(row: CongratulationRow) -> CongratulationResponse {
    CongratulationResponse {
        id: row.id,
        author_id: parse_uuid(&row.author_id, row.id, "author_id"),
        author_username: row.author_username,
        created_at: parse_timestamp(&row.created_at, row.id),
        text: row.text,
    }
}

fn parse_uuid(value: &str, row_id: i64, field: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row {}: {}", field, value, row_id, e);
        Uuid::default()
    })
}

fn parse_timestamp(value: &str, row_id: i64) -> chrono::DateTime<chrono::Utc> {
    value
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row {}: {}", value, row_id, e);
            chrono::DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: Uuid) -> Claims {
        Claims {
            sub,
            username: "alice".to_string(),
            exp: 0,
        }
    }

    #[test]
    fn only_the_author_passes_the_ownership_check() {
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(ensure_author(&author.to_string(), &claims(author)).is_ok());

        let denied = ensure_author(&author.to_string(), &claims(stranger));
        assert!(matches!(denied, Err(ApiError::Forbidden)));
    }
}
