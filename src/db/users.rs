use rusqlite::{params, Connection};

use super::{now_str, parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::{User, UserRole, UserSettings};

pub(super) const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, phone, date_of_birth, \
     profile_image_url, email_verified, created_at, updated_at";

/// `USER_COLUMNS` qualified with a table alias, for joins.
pub(super) fn user_columns(alias: &str) -> String {
    USER_COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Users ──

/// Inserts the user along with default settings and an empty profile for their role.
pub fn register_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO users (id, email, password_hash, role, first_name, last_name, phone, date_of_birth,
                            profile_image_url, email_verified, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            user.id,
            user.email,
            user.password_hash,
            user.role.as_str(),
            user.first_name,
            user.last_name,
            user.phone,
            user.date_of_birth,
            user.profile_image_url,
            user.email_verified as i32,
            user.created_at.format(TIMESTAMP_FORMAT).to_string(),
            user.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;

    tx.execute("INSERT INTO user_settings (user_id) VALUES (?1)", params![user.id])?;

    match user.role {
        UserRole::Instructor => {
            tx.execute(
                "INSERT INTO instructor_profiles (instructor_id) VALUES (?1)",
                params![user.id],
            )?;
        }
        UserRole::Client => {
            tx.execute(
                "INSERT INTO client_profiles (client_id) VALUES (?1)",
                params![user.id],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Partial account update; `None` leaves a column unchanged.
#[derive(Debug, Default)]
pub struct UserUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub profile_image_url: Option<&'a str>,
}

pub fn update_user(conn: &Connection, id: &str, update: &UserUpdate) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET
           first_name = COALESCE(?1, first_name),
           last_name = COALESCE(?2, last_name),
           phone = COALESCE(?3, phone),
           date_of_birth = COALESCE(?4, date_of_birth),
           profile_image_url = COALESCE(?5, profile_image_url),
           updated_at = ?6
         WHERE id = ?7",
        params![
            update.first_name,
            update.last_name,
            update.phone,
            update.date_of_birth,
            update.profile_image_url,
            now_str(),
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_password_hash(conn: &Connection, id: &str, password_hash: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        params![password_hash, now_str(), id],
    )?;
    Ok(count > 0)
}

/// Swaps the hash only if it still equals `expected`. Returns false when another
/// change got there first.
pub fn replace_password_hash(
    conn: &Connection,
    id: &str,
    expected: &str,
    password_hash: &str,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3 AND password_hash = ?4",
        params![password_hash, now_str(), id, expected],
    )?;
    Ok(count > 0)
}

pub fn mark_email_verified(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET email_verified = 1, updated_at = ?1 WHERE email = ?2",
        params![now_str(), email],
    )?;
    Ok(count > 0)
}

/// Removes the account; profiles, sessions and content cascade with it.
pub fn delete_user(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub(super) fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(3)?;
    let role = UserRole::parse(&role_str)
        .ok_or_else(|| anyhow::anyhow!("unknown user role: {role_str}"))?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        phone: row.get(6)?,
        date_of_birth: row.get(7)?,
        profile_image_url: row.get(8)?,
        email_verified: row.get::<_, i32>(9)? != 0,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// ── Settings ──

pub fn get_settings(conn: &Connection, user_id: &str) -> anyhow::Result<Option<UserSettings>> {
    let result = conn.query_row(
        "SELECT user_id, email_notifications, push_notifications, theme FROM user_settings WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(UserSettings {
                user_id: row.get(0)?,
                email_notifications: row.get::<_, i32>(1)? != 0,
                push_notifications: row.get::<_, i32>(2)? != 0,
                theme: row.get(3)?,
            })
        },
    );

    match result {
        Ok(settings) => Ok(Some(settings)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(conn: &Connection, settings: &UserSettings) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO user_settings (user_id, email_notifications, push_notifications, theme, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
           email_notifications = excluded.email_notifications,
           push_notifications = excluded.push_notifications,
           theme = excluded.theme,
           updated_at = excluded.updated_at",
        params![
            settings.user_id,
            settings.email_notifications as i32,
            settings.push_notifications as i32,
            settings.theme,
            now_str(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db;
    use chrono::Utc;

    pub(crate) fn sample_user(id: &str, email: &str, role: UserRole) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
            first_name: "Test".to_string(),
            last_name: id.to_string(),
            phone: None,
            date_of_birth: None,
            profile_image_url: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_register_creates_role_profile_and_settings() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("i1", "coach@example.com", UserRole::Instructor)).unwrap();

        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM instructor_profiles WHERE instructor_id = 'i1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(profiles, 1);

        let settings = get_settings(&conn, "i1").unwrap().unwrap();
        assert!(settings.email_notifications);
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_duplicate_email_is_unique_violation() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "a@example.com", UserRole::Client)).unwrap();
        let err = register_user(&conn, &sample_user("c2", "a@example.com", UserRole::Client)).unwrap_err();
        assert!(db::is_unique_violation(&err));
        // the failed registration left nothing behind
        assert!(get_user_by_id(&conn, "c2").unwrap().is_none());
    }

    #[test]
    fn test_lookup_by_email_ignores_case() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "Jo@Example.com", UserRole::Client)).unwrap();
        let user = get_user_by_email(&conn, "jo@example.com").unwrap().unwrap();
        assert_eq!(user.id, "c1");
        assert_eq!(user.role, UserRole::Client);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "a@example.com", UserRole::Client)).unwrap();

        let update = UserUpdate {
            phone: Some("+15550001111"),
            ..Default::default()
        };
        assert!(update_user(&conn, "c1", &update).unwrap());

        let user = get_user_by_id(&conn, "c1").unwrap().unwrap();
        assert_eq!(user.phone.as_deref(), Some("+15550001111"));
        assert_eq!(user.first_name, "Test");
    }

    #[test]
    fn test_replace_password_hash_checks_current_value() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "a@example.com", UserRole::Client)).unwrap();

        assert!(replace_password_hash(&conn, "c1", "hash", "first").unwrap());
        assert!(!replace_password_hash(&conn, "c1", "hash", "second").unwrap());
        assert_eq!(get_user_by_id(&conn, "c1").unwrap().unwrap().password_hash, "first");
    }

    #[test]
    fn test_delete_cascades_profile() {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("c1", "a@example.com", UserRole::Client)).unwrap();
        assert!(delete_user(&conn, "c1").unwrap());

        let profiles: i64 = conn
            .query_row("SELECT COUNT(*) FROM client_profiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(profiles, 0);
        assert!(!delete_user(&conn, "c1").unwrap());
    }
}
