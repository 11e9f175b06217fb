/// Database row types — these map directly to SQLite rows.
/// Distinct from cakeday-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct BirthdayRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    pub image: Option<String>,
    pub author_id: String,
    pub author_username: String,
    pub created_at: String,
}

pub struct TagRow {
    pub birthday_id: i64,
    pub name: String,
}

pub struct CongratulationRow {
    pub id: i64,
    pub text: String,
    pub author_id: String,
    pub author_username: String,
    pub birthday_id: i64,
    pub created_at: String,
}
