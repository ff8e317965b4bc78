use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::{now_str, parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::{Session, SessionStatus, SessionWithNames};

const SESSION_COLUMNS: &str = "s.id, s.instructor_id, s.client_id, s.title, s.date, s.start_time, s.end_time, \
     s.session_type, s.notes, s.price, s.status, s.created_at, s.updated_at";

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, instructor_id, client_id, title, date, start_time, end_time,
                               session_type, notes, price, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            session.id,
            session.instructor_id,
            session.client_id,
            session.title,
            session.date.format("%Y-%m-%d").to_string(),
            session.start_time,
            session.end_time,
            session.session_type,
            session.notes,
            session.price,
            session.status.as_str(),
            session.created_at.format(TIMESTAMP_FORMAT).to_string(),
            session.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<Session>> {
    let result = conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM sessions s WHERE s.id = ?1"),
        params![id],
        |row| Ok(parse_session_row(row)),
    );

    match result {
        Ok(session) => Ok(Some(session?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Every session the instructor has on `date`, whatever its status.
pub fn get_instructor_sessions_on(
    conn: &Connection,
    instructor_id: &str,
    date: NaiveDate,
) -> anyhow::Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions s
         WHERE s.instructor_id = ?1 AND s.date = ?2
         ORDER BY s.start_time ASC"
    ))?;

    let rows = stmt.query_map(
        params![instructor_id, date.format("%Y-%m-%d").to_string()],
        |row| Ok(parse_session_row(row)),
    )?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(row??);
    }
    Ok(sessions)
}

/// Sessions where the user is either the instructor or the client, most recent first.
pub fn get_sessions_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<SessionWithNames>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS},
                i.first_name, i.last_name, c.first_name, c.last_name
         FROM sessions s
         JOIN users i ON s.instructor_id = i.id
         JOIN users c ON s.client_id = c.id
         WHERE s.instructor_id = ?1 OR s.client_id = ?1
         ORDER BY s.date DESC, s.start_time DESC"
    ))?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok(parse_session_row(row).and_then(|session| {
            Ok(SessionWithNames {
                session,
                instructor_first_name: row.get(13)?,
                instructor_last_name: row.get(14)?,
                client_first_name: row.get(15)?,
                client_last_name: row.get(16)?,
            })
        }))
    })?;

    let mut sessions = vec![];
    for row in rows {
        sessions.push(row??);
    }
    Ok(sessions)
}

pub fn update_session_status(
    conn: &Connection,
    id: &str,
    status: SessionStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_session_row(row: &rusqlite::Row) -> anyhow::Result<Session> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(10)?;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    Ok(Session {
        id: row.get(0)?,
        instructor_id: row.get(1)?,
        client_id: row.get(2)?,
        title: row.get(3)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        session_type: row.get(7)?,
        notes: row.get(8)?,
        price: row.get(9)?,
        status: SessionStatus::from_str(&status_str),
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}
