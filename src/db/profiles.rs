use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::users::{parse_user_row, user_columns};
use super::{json_column, now_str};
use crate::models::{
    ClientLinkStatus, ClientProfile, ClientSubscription, Demographic, Health, InstructorClient,
    InstructorProfile, InstructorStats, Measurements, User, WeeklyAvailability,
};

// ── Instructor Profiles ──

pub fn get_instructor_profile(
    conn: &Connection,
    instructor_id: &str,
) -> anyhow::Result<Option<InstructorProfile>> {
    let result = conn.query_row(
        "SELECT instructor_id, bio, specialties, rating, review_count, verified, availability
         FROM instructor_profiles WHERE instructor_id = ?1",
        params![instructor_id],
        |row| Ok(parse_instructor_profile_row(row, 0)),
    );

    match result {
        Ok(profile) => Ok(Some(profile?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_instructors(conn: &Connection) -> anyhow::Result<Vec<(User, InstructorProfile)>> {
    let sql = format!(
        "SELECT {}, p.instructor_id, p.bio, p.specialties, p.rating, p.review_count, p.verified, p.availability
         FROM users u
         JOIN instructor_profiles p ON p.instructor_id = u.id
         ORDER BY p.rating DESC, u.first_name ASC",
        user_columns("u")
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map([], |row| {
        Ok(parse_user_row(row).and_then(|user| Ok((user, parse_instructor_profile_row(row, 12)?))))
    })?;

    let mut instructors = vec![];
    for row in rows {
        instructors.push(row??);
    }
    Ok(instructors)
}

pub fn update_instructor_profile(
    conn: &Connection,
    instructor_id: &str,
    bio: Option<&str>,
    specialties: Option<&[String]>,
) -> anyhow::Result<bool> {
    let specialties_json = specialties.map(|s| serde_json::to_string(s)).transpose()?;
    let count = conn.execute(
        "UPDATE instructor_profiles SET
           bio = COALESCE(?1, bio),
           specialties = COALESCE(?2, specialties),
           updated_at = ?3
         WHERE instructor_id = ?4",
        params![bio, specialties_json, now_str(), instructor_id],
    )?;
    Ok(count > 0)
}

pub fn get_availability(
    conn: &Connection,
    instructor_id: &str,
) -> anyhow::Result<Option<WeeklyAvailability>> {
    let result = conn.query_row(
        "SELECT availability FROM instructor_profiles WHERE instructor_id = ?1",
        params![instructor_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(raw) => Ok(Some(json_column(&raw))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replaces the weekly schedule wholesale. Slot times are stored as given.
pub fn save_availability(
    conn: &Connection,
    instructor_id: &str,
    availability: &WeeklyAvailability,
) -> anyhow::Result<bool> {
    let json = serde_json::to_string(availability)?;
    let count = conn.execute(
        "UPDATE instructor_profiles SET availability = ?1, updated_at = ?2 WHERE instructor_id = ?3",
        params![json, now_str(), instructor_id],
    )?;
    Ok(count > 0)
}

/// Recomputes the profile rating from reviews left on the instructor's workout plans.
pub fn refresh_instructor_rating(conn: &Connection, instructor_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE instructor_profiles SET
           rating = COALESCE((SELECT ROUND(AVG(r.rating), 2) FROM workout_plan_reviews r
                              JOIN workout_plans wp ON wp.id = r.workout_plan_id
                              WHERE wp.instructor_id = ?1), 0),
           review_count = (SELECT COUNT(*) FROM workout_plan_reviews r
                           JOIN workout_plans wp ON wp.id = r.workout_plan_id
                           WHERE wp.instructor_id = ?1)
         WHERE instructor_id = ?1",
        params![instructor_id],
    )?;
    Ok(())
}

fn parse_instructor_profile_row(
    row: &rusqlite::Row,
    offset: usize,
) -> anyhow::Result<InstructorProfile> {
    let specialties: String = row.get(offset + 2)?;
    let availability: String = row.get(offset + 6)?;

    Ok(InstructorProfile {
        instructor_id: row.get(offset)?,
        bio: row.get(offset + 1)?,
        specialties: json_column(&specialties),
        rating: row.get(offset + 3)?,
        review_count: row.get(offset + 4)?,
        verified: row.get::<_, i32>(offset + 5)? != 0,
        availability: json_column(&availability),
    })
}

// ── Instructor Clients ──

/// Records that a client trains with an instructor. An existing link keeps its status.
pub fn link_client(conn: &Connection, instructor_id: &str, client_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO instructor_clients (instructor_id, client_id) VALUES (?1, ?2)
         ON CONFLICT(instructor_id, client_id) DO NOTHING",
        params![instructor_id, client_id],
    )?;
    Ok(())
}

pub fn set_client_status(
    conn: &Connection,
    instructor_id: &str,
    client_id: &str,
    status: ClientLinkStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE instructor_clients SET status = ?1 WHERE instructor_id = ?2 AND client_id = ?3",
        params![status.as_str(), instructor_id, client_id],
    )?;
    Ok(count > 0)
}

pub fn list_clients(
    conn: &Connection,
    instructor_id: &str,
    search: Option<&str>,
) -> anyhow::Result<Vec<InstructorClient>> {
    let mut sql = String::from(
        "SELECT u.id, u.first_name, u.last_name, u.email, ic.status, ic.created_at,
                (SELECT COUNT(*) FROM sessions s WHERE s.instructor_id = ic.instructor_id AND s.client_id = u.id)
         FROM instructor_clients ic
         JOIN users u ON u.id = ic.client_id
         WHERE ic.instructor_id = ?1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(instructor_id.to_string())];

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        sql.push_str(
            " AND (u.first_name LIKE ?2 OR u.last_name LIKE ?2 OR u.email LIKE ?2)",
        );
        params_vec.push(Box::new(format!("%{term}%")));
    }
    sql.push_str(" ORDER BY u.first_name ASC, u.last_name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        let status: String = row.get(4)?;
        Ok(InstructorClient {
            client_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            status: ClientLinkStatus::parse(&status),
            since: row.get(5)?,
            sessions_booked: row.get(6)?,
        })
    })?;

    let mut clients = vec![];
    for row in rows {
        clients.push(row?);
    }
    Ok(clients)
}

pub fn instructor_stats(
    conn: &Connection,
    instructor_id: &str,
    today: NaiveDate,
) -> anyhow::Result<InstructorStats> {
    let today = today.format("%Y-%m-%d").to_string();

    let (total_clients, active_clients): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0)
         FROM instructor_clients WHERE instructor_id = ?1",
        params![instructor_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let (total_sessions, upcoming_sessions, total_earnings): (i64, i64, f64) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'scheduled' AND date >= ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' THEN COALESCE(price, 0.0) ELSE 0.0 END), 0.0)
         FROM sessions WHERE instructor_id = ?1",
        params![instructor_id, today],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let workout_plans: i64 = conn.query_row(
        "SELECT COUNT(*) FROM workout_plans WHERE instructor_id = ?1",
        params![instructor_id],
        |row| row.get(0),
    )?;

    let (average_rating, total_reviews): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(r.rating), COUNT(r.id)
         FROM workout_plan_reviews r
         JOIN workout_plans wp ON wp.id = r.workout_plan_id
         WHERE wp.instructor_id = ?1",
        params![instructor_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(InstructorStats {
        total_clients,
        active_clients,
        total_sessions,
        upcoming_sessions,
        total_earnings,
        workout_plans,
        average_rating: average_rating.unwrap_or(0.0),
        total_reviews,
    })
}

// ── Client Profiles ──

pub fn get_client_profile(conn: &Connection, client_id: &str) -> anyhow::Result<Option<ClientProfile>> {
    let result = conn.query_row(
        "SELECT client_id, demographic, health, measurements, subscription_status,
                subscription_end_date, subscription_type, subscription_plan
         FROM client_profiles WHERE client_id = ?1",
        params![client_id],
        |row| {
            let demographic: String = row.get(1)?;
            let health: String = row.get(2)?;
            let measurements: String = row.get(3)?;
            Ok(ClientProfile {
                client_id: row.get(0)?,
                demographic: json_column(&demographic),
                health: json_column(&health),
                measurements: json_column(&measurements),
                subscription: ClientSubscription {
                    status: row.get(4)?,
                    end_date: row.get(5)?,
                    kind: row.get(6)?,
                    plan: row.get(7)?,
                },
            })
        },
    );

    match result {
        Ok(profile) => Ok(Some(profile)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_client_intake(
    conn: &Connection,
    client_id: &str,
    demographic: &Demographic,
    health: &Health,
    measurements: &Measurements,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE client_profiles SET
           demographic = ?1,
           health = ?2,
           measurements = ?3,
           updated_at = ?4
         WHERE client_id = ?5",
        params![
            serde_json::to_string(demographic)?,
            serde_json::to_string(health)?,
            serde_json::to_string(measurements)?,
            now_str(),
            client_id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_client_subscription(
    conn: &Connection,
    client_id: &str,
    end_date: &str,
    kind: &str,
    plan_name: &str,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE client_profiles SET
           subscription_status = 'active',
           subscription_end_date = ?1,
           subscription_type = ?2,
           subscription_plan = ?3,
           updated_at = ?4
         WHERE client_id = ?5",
        params![end_date, kind, plan_name, now_str(), client_id],
    )?;
    Ok(count > 0)
}
