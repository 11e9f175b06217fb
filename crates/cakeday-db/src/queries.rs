use crate::models::{BirthdayRow, CongratulationRow, TagRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Birthdays --

    /// Insert a birthday together with its tag links in one transaction.
    /// Returns the new row id.
    pub fn insert_birthday(
        &self,
        first_name: &str,
        last_name: &str,
        birthday: &str,
        author_id: &str,
        tags: &[String],
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO birthdays (first_name, last_name, birthday, author_id)
                 VALUES (?1, ?2, ?3, ?4)",
                (first_name, last_name, birthday, author_id),
            )?;
            let id = tx.last_insert_rowid();
            set_tags(&tx, id, tags)?;
            tx.commit()?;
            Ok(id)
        })
    }

    /// Replace the mutable fields and tag links of an existing birthday.
    pub fn update_birthday(
        &self,
        id: i64,
        first_name: &str,
        last_name: &str,
        birthday: &str,
        tags: &[String],
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE birthdays SET first_name = ?1, last_name = ?2, birthday = ?3
                 WHERE id = ?4",
                (first_name, last_name, birthday, id),
            )?;
            tx.execute("DELETE FROM birthday_tags WHERE birthday_id = ?1", [id])?;
            set_tags(&tx, id, tags)?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_birthday(&self, id: i64) -> Result<Option<BirthdayRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.first_name, b.last_name, b.birthday, b.image,
                        b.author_id, u.username, b.created_at
                 FROM birthdays b
                 LEFT JOIN users u ON b.author_id = u.id
                 WHERE b.id = ?1",
            )?;
            let row = stmt.query_row([id], map_birthday_row).optional()?;
            Ok(row)
        })
    }

    /// Page of birthdays ordered by ascending id, author username JOINed in
    /// a single query (eliminates N+1).
    pub fn list_birthdays(&self, limit: u32, offset: u64) -> Result<Vec<BirthdayRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.first_name, b.last_name, b.birthday, b.image,
                        b.author_id, u.username, b.created_at
                 FROM birthdays b
                 LEFT JOIN users u ON b.author_id = u.id
                 ORDER BY b.id ASC
                 LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset as i64], map_birthday_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_birthdays(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM birthdays", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    /// Returns true when a row was actually removed. Congratulations and
    /// tag links go with it via the cascade.
    pub fn delete_birthday(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute("DELETE FROM birthdays WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    pub fn set_birthday_image(&self, id: i64, image: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("UPDATE birthdays SET image = ?1 WHERE id = ?2", (image, id))?;
            Ok(())
        })
    }

    // -- Tags --

    /// Batch-fetch tag names for a set of birthday ids.
    pub fn get_tags_for_birthdays(&self, birthday_ids: &[i64]) -> Result<Vec<TagRow>> {
        if birthday_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=birthday_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT bt.birthday_id, t.name
                 FROM birthday_tags bt
                 JOIN tags t ON bt.tag_id = t.id
                 WHERE bt.birthday_id IN ({})
                 ORDER BY t.name ASC",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = birthday_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(TagRow {
                        birthday_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Congratulations --

    pub fn insert_congratulation(
        &self,
        text: &str,
        author_id: &str,
        birthday_id: i64,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO congratulations (text, author_id, birthday_id) VALUES (?1, ?2, ?3)",
                (text, author_id, birthday_id),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All congratulations on a birthday, oldest first, author username
    /// JOINed in a single query.
    pub fn get_congratulations(&self, birthday_id: i64) -> Result<Vec<CongratulationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.text, c.author_id, u.username, c.birthday_id, c.created_at
                 FROM congratulations c
                 LEFT JOIN users u ON c.author_id = u.id
                 WHERE c.birthday_id = ?1
                 ORDER BY c.id ASC",
            )?;
            let rows = stmt
                .query_map([birthday_id], |row| {
                    Ok(CongratulationRow {
                        id: row.get(0)?,
                        text: row.get(1)?,
                        author_id: row.get(2)?,
                        author_username: row
                            .get::<_, Option<String>>(3)?
                            .unwrap_or_else(|| "unknown".to_string()),
                        birthday_id: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Upsert tag names and link them to the birthday. Runs inside the caller's
/// transaction.
fn set_tags(conn: &Connection, birthday_id: i64, tags: &[String]) -> Result<()> {
    for tag in tags {
        let name = tag.trim();
        if name.is_empty() {
            continue;
        }
        conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [name])?;
        let tag_id: i64 =
            conn.query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| row.get(0))?;
        conn.execute(
            "INSERT OR IGNORE INTO birthday_tags (birthday_id, tag_id) VALUES (?1, ?2)",
            (birthday_id, tag_id),
        )?;
    }
    Ok(())
}

fn map_birthday_row(row: &rusqlite::Row<'_>) -> std::result::Result<BirthdayRow, rusqlite::Error> {
    Ok(BirthdayRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birthday: row.get(3)?,
        image: row.get(4)?,
        author_id: row.get(5)?,
        author_username: row
            .get::<_, Option<String>>(6)?
            .unwrap_or_else(|| "unknown".to_string()),
        created_at: row.get(7)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_user(username: &str) -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let id = format!("user-{}", username);
        db.create_user(&id, username, "hash").unwrap();
        (db, id)
    }

    #[test]
    fn list_is_ordered_by_ascending_id() {
        let (db, uid) = db_with_user("alice");
        for i in 0..15 {
            db.insert_birthday(&format!("Name{}", i), "Last", "1990-01-01", &uid, &[])
                .unwrap();
        }

        let page = db.list_birthdays(10, 0).unwrap();
        assert_eq!(page.len(), 10);
        let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let second = db.list_birthdays(10, 10).unwrap();
        assert_eq!(second.len(), 5);
        assert!(second[0].id > ids[9]);
        assert_eq!(db.count_birthdays().unwrap(), 15);
    }

    #[test]
    fn tags_round_trip_and_batch_fetch() {
        let (db, uid) = db_with_user("alice");
        let a = db
            .insert_birthday("Ann", "Smith", "1990-01-01", &uid, &["friends".into(), "work".into()])
            .unwrap();
        let b = db
            .insert_birthday("Bob", "Jones", "1991-02-02", &uid, &["family".into()])
            .unwrap();

        let rows = db.get_tags_for_birthdays(&[a, b]).unwrap();
        let a_tags: Vec<&str> = rows
            .iter()
            .filter(|r| r.birthday_id == a)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(a_tags, ["friends", "work"]);
        assert_eq!(rows.iter().filter(|r| r.birthday_id == b).count(), 1);
    }

    #[test]
    fn update_replaces_fields_and_tags() {
        let (db, uid) = db_with_user("alice");
        let id = db
            .insert_birthday("Ann", "Smith", "1990-01-01", &uid, &["old".into()])
            .unwrap();

        db.update_birthday(id, "Anna", "Smith", "1990-01-02", &["new".into()])
            .unwrap();

        let row = db.get_birthday(id).unwrap().unwrap();
        assert_eq!(row.first_name, "Anna");
        assert_eq!(row.birthday, "1990-01-02");
        let tags = db.get_tags_for_birthdays(&[id]).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "new");
    }

    #[test]
    fn delete_cascades_to_congratulations_and_tag_links() {
        let (db, uid) = db_with_user("alice");
        let id = db
            .insert_birthday("Ann", "Smith", "1990-01-01", &uid, &["friends".into()])
            .unwrap();
        db.insert_congratulation("happy birthday!", &uid, id).unwrap();
        assert_eq!(db.get_congratulations(id).unwrap().len(), 1);

        assert!(db.delete_birthday(id).unwrap());
        assert!(db.get_birthday(id).unwrap().is_none());
        assert!(db.get_congratulations(id).unwrap().is_empty());
        assert!(db.get_tags_for_birthdays(&[id]).unwrap().is_empty());

        // unknown id deletes nothing
        assert!(!db.delete_birthday(id).unwrap());
    }

    #[test]
    fn congratulations_come_back_oldest_first_with_author() {
        let (db, uid) = db_with_user("alice");
        let id = db.insert_birthday("Ann", "Smith", "1990-01-01", &uid, &[]).unwrap();
        db.insert_congratulation("first", &uid, id).unwrap();
        db.insert_congratulation("second", &uid, id).unwrap();

        let rows = db.get_congratulations(id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "first");
        assert_eq!(rows[1].text, "second");
        assert_eq!(rows[0].author_username, "alice");
    }
}
