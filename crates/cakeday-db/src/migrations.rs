use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS birthdays (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            birthday    TEXT NOT NULL,
            image       TEXT,
            author_id   TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_birthdays_author
            ON birthdays(author_id);

        CREATE TABLE IF NOT EXISTS tags (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS birthday_tags (
            birthday_id INTEGER NOT NULL REFERENCES birthdays(id) ON DELETE CASCADE,
            tag_id      INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            UNIQUE(birthday_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_birthday_tags_birthday
            ON birthday_tags(birthday_id);

        -- Congratulations are immutable once written and disappear only
        -- through the cascade when their birthday is deleted.
        CREATE TABLE IF NOT EXISTS congratulations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            text        TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES users(id),
            birthday_id INTEGER NOT NULL REFERENCES birthdays(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_congratulations_birthday
            ON congratulations(birthday_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
