use rusqlite::{params, Connection};

use super::{parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::ForumPost;

pub fn create_post(
    conn: &Connection,
    id: &str,
    author_id: &str,
    title: &str,
    content: &str,
    created_at: &chrono::NaiveDateTime,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO forum_posts (id, author_id, title, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, author_id, title, content, created_at.format(TIMESTAMP_FORMAT).to_string()],
    )?;
    Ok(())
}

pub fn list_posts(conn: &Connection, limit: i64) -> anyhow::Result<Vec<ForumPost>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.author_id, u.first_name || ' ' || u.last_name, p.title, p.content, p.likes, p.created_at
         FROM forum_posts p
         JOIN users u ON u.id = p.author_id
         ORDER BY p.created_at DESC, p.rowid DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        let created_at: String = row.get(6)?;
        Ok(ForumPost {
            id: row.get(0)?,
            author_id: row.get(1)?,
            author_name: row.get::<_, String>(2)?.trim().to_string(),
            title: row.get(3)?,
            content: row.get(4)?,
            likes: row.get(5)?,
            created_at: parse_timestamp(&created_at),
        })
    })?;

    let mut posts = vec![];
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

pub fn post_exists(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM forum_posts WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Records a like and bumps the post counter. Returns `None` if the user already
/// liked the post, otherwise the new like count.
pub fn like_post(conn: &Connection, post_id: &str, user_id: &str) -> anyhow::Result<Option<i64>> {
    let tx = conn.unchecked_transaction()?;

    let inserted = tx.execute(
        "INSERT INTO forum_post_likes (post_id, user_id) VALUES (?1, ?2)
         ON CONFLICT(post_id, user_id) DO NOTHING",
        params![post_id, user_id],
    )?;
    if inserted == 0 {
        return Ok(None);
    }

    tx.execute(
        "UPDATE forum_posts SET likes = likes + 1 WHERE id = ?1",
        params![post_id],
    )?;
    let likes: i64 = tx.query_row(
        "SELECT likes FROM forum_posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;

    tx.commit()?;
    Ok(Some(likes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::users::register_user;
    use crate::db::users::tests::sample_user;
    use crate::models::UserRole;
    use chrono::Utc;

    #[test]
    fn test_like_once_per_user() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "ana@example.com", UserRole::Client)).unwrap();
        register_user(&conn, &sample_user("c2", "ben@example.com", UserRole::Client)).unwrap();
        create_post(&conn, "p1", "c1", "Deadlift form", "Any tips?", &Utc::now().naive_utc()).unwrap();

        assert_eq!(like_post(&conn, "p1", "c2").unwrap(), Some(1));
        assert_eq!(like_post(&conn, "p1", "c2").unwrap(), None);
        assert_eq!(like_post(&conn, "p1", "c1").unwrap(), Some(2));

        let posts = list_posts(&conn, 10).unwrap();
        assert_eq!(posts[0].likes, 2);
        assert_eq!(posts[0].author_name, "Test c1");
    }

    #[test]
    fn test_post_exists() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "ana@example.com", UserRole::Client)).unwrap();
        create_post(&conn, "p1", "c1", "Hello", "World", &Utc::now().naive_utc()).unwrap();
        assert!(post_exists(&conn, "p1").unwrap());
        assert!(!post_exists(&conn, "p2").unwrap());
    }
}
