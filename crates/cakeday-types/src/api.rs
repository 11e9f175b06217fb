use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared between the auth handlers (token minting) and the
/// request middleware (token validation). Canonical definition lives here
/// in cakeday-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Birthdays --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BirthdayRequest {
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BirthdayResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birthday: NaiveDate,
    pub image: Option<String>,
    pub author_id: Uuid,
    pub author_username: String,
    pub tags: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct BirthdayListResponse {
    pub items: Vec<BirthdayResponse>,
    pub page: u32,
    pub total: u64,
    pub per_page: u32,
}

/// Detail payload: the record plus the derived countdown and every
/// congratulation left on it, oldest first.
#[derive(Debug, Serialize)]
pub struct BirthdayDetailResponse {
    pub birthday: BirthdayResponse,
    pub countdown: i64,
    pub congratulations: Vec<CongratulationResponse>,
}

// -- Congratulations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CongratulationRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CongratulationResponse {
    pub id: i64,
    pub text: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Images --

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub birthday_id: i64,
    pub size: u64,
}
