use rusqlite::{params, Connection};

use super::{json_column, now_str, parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::{
    Video, VideoListing, WorkoutExercise, WorkoutGuide, WorkoutPlan, WorkoutPlanReview,
    WorkoutPlanSummary,
};

// ── Videos ──

const VIDEO_COLUMNS: &str = "v.id, v.instructor_id, v.title, v.description, v.url, v.thumbnail_url, v.duration, \
     v.category, v.tags, v.price, v.views, v.likes, v.created_at";

pub fn create_video(conn: &Connection, video: &Video) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO videos (id, instructor_id, title, description, url, thumbnail_url, duration,
                             category, tags, price, views, likes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            video.id,
            video.instructor_id,
            video.title,
            video.description,
            video.url,
            video.thumbnail_url,
            video.duration,
            video.category,
            serde_json::to_string(&video.tags)?,
            video.price,
            video.views,
            video.likes,
            video.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_videos(conn: &Connection, instructor_id: Option<&str>) -> anyhow::Result<Vec<VideoListing>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VIDEO_COLUMNS}, u.first_name, u.last_name
         FROM videos v
         JOIN users u ON v.instructor_id = u.id
         WHERE ?1 IS NULL OR v.instructor_id = ?1
         ORDER BY v.created_at DESC"
    ))?;

    let rows = stmt.query_map(params![instructor_id], |row| {
        Ok(parse_video_row(row).and_then(|video| {
            Ok(VideoListing {
                video,
                first_name: row.get(13)?,
                last_name: row.get(14)?,
            })
        }))
    })?;

    let mut videos = vec![];
    for row in rows {
        videos.push(row??);
    }
    Ok(videos)
}

pub fn get_video(conn: &Connection, id: &str) -> anyhow::Result<Option<Video>> {
    let result = conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = ?1"),
        params![id],
        |row| Ok(parse_video_row(row)),
    );

    match result {
        Ok(video) => Ok(Some(video?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_video(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM videos WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_video_row(row: &rusqlite::Row) -> anyhow::Result<Video> {
    let tags: String = row.get(8)?;
    let created_at: String = row.get(12)?;

    Ok(Video {
        id: row.get(0)?,
        instructor_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        url: row.get(4)?,
        thumbnail_url: row.get(5)?,
        duration: row.get(6)?,
        category: row.get(7)?,
        tags: json_column(&tags),
        price: row.get(9)?,
        views: row.get(10)?,
        likes: row.get(11)?,
        created_at: parse_timestamp(&created_at),
    })
}

// ── Workout Plans ──

const PLAN_COLUMNS: &str = "wp.id, wp.instructor_id, wp.title, wp.description, wp.duration_weeks, \
     wp.difficulty_level, wp.equipment_needed, wp.target_muscles, wp.is_platform_plan, wp.price, \
     wp.preview_video_url, wp.thumbnail_url, wp.created_at, wp.updated_at";

/// Inserts the plan and its exercises atomically.
pub fn create_workout_plan(
    conn: &Connection,
    plan: &WorkoutPlan,
    exercises: &[WorkoutExercise],
) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO workout_plans (id, instructor_id, title, description, duration_weeks, difficulty_level,
                                    equipment_needed, target_muscles, is_platform_plan, price,
                                    preview_video_url, thumbnail_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            plan.id,
            plan.instructor_id,
            plan.title,
            plan.description,
            plan.duration_weeks,
            plan.difficulty_level,
            serde_json::to_string(&plan.equipment_needed)?,
            serde_json::to_string(&plan.target_muscles)?,
            plan.is_platform_plan as i32,
            plan.price,
            plan.preview_video_url,
            plan.thumbnail_url,
            plan.created_at.format(TIMESTAMP_FORMAT).to_string(),
            plan.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;

    for exercise in exercises {
        tx.execute(
            "INSERT INTO workout_exercises (id, workout_plan_id, name, week_number, day_of_week, sets, reps,
                                            rest_time, weight_suggestion, form_tips, notes, sequence_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                exercise.id,
                plan.id,
                exercise.name,
                exercise.week_number,
                exercise.day_of_week,
                exercise.sets,
                exercise.reps,
                exercise.rest_time,
                exercise.weight_suggestion,
                exercise.form_tips,
                exercise.notes,
                exercise.sequence_order,
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

pub enum PlanFilter<'a> {
    All,
    Instructor(&'a str),
    Platform,
}

pub fn list_workout_plans(conn: &Connection, filter: PlanFilter) -> anyhow::Result<Vec<WorkoutPlanSummary>> {
    let (where_clause, instructor_id) = match filter {
        PlanFilter::All => ("", None),
        PlanFilter::Instructor(id) => ("WHERE wp.instructor_id = ?1", Some(id)),
        PlanFilter::Platform => ("WHERE wp.is_platform_plan = 1", None),
    };

    let sql = format!(
        "SELECT {PLAN_COLUMNS}, u.first_name, u.last_name,
                COUNT(DISTINCT r.id), AVG(r.rating)
         FROM workout_plans wp
         LEFT JOIN users u ON wp.instructor_id = u.id
         LEFT JOIN workout_plan_reviews r ON wp.id = r.workout_plan_id
         {where_clause}
         GROUP BY wp.id
         ORDER BY wp.created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt.query_map(rusqlite::params_from_iter(instructor_id.iter()), |row| {
        Ok(parse_plan_summary_row(row))
    })?;

    let mut plans = vec![];
    for row in rows {
        plans.push(row??);
    }
    Ok(plans)
}

pub fn get_workout_plan(conn: &Connection, id: &str) -> anyhow::Result<Option<WorkoutPlanSummary>> {
    let result = conn.query_row(
        &format!(
            "SELECT {PLAN_COLUMNS}, u.first_name, u.last_name,
                    COUNT(DISTINCT r.id), AVG(r.rating)
             FROM workout_plans wp
             LEFT JOIN users u ON wp.instructor_id = u.id
             LEFT JOIN workout_plan_reviews r ON wp.id = r.workout_plan_id
             WHERE wp.id = ?1
             GROUP BY wp.id"
        ),
        params![id],
        |row| Ok(parse_plan_summary_row(row)),
    );

    match result {
        Ok(plan) => Ok(Some(plan?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_plan_exercises(conn: &Connection, plan_id: &str) -> anyhow::Result<Vec<WorkoutExercise>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, week_number, day_of_week, sets, reps, rest_time, weight_suggestion,
                form_tips, notes, sequence_order
         FROM workout_exercises WHERE workout_plan_id = ?1
         ORDER BY week_number ASC, sequence_order ASC",
    )?;

    let rows = stmt.query_map(params![plan_id], |row| {
        Ok(WorkoutExercise {
            id: row.get(0)?,
            name: row.get(1)?,
            week_number: row.get(2)?,
            day_of_week: row.get(3)?,
            sets: row.get(4)?,
            reps: row.get(5)?,
            rest_time: row.get(6)?,
            weight_suggestion: row.get(7)?,
            form_tips: row.get(8)?,
            notes: row.get(9)?,
            sequence_order: row.get(10)?,
        })
    })?;

    let mut exercises = vec![];
    for row in rows {
        exercises.push(row?);
    }
    Ok(exercises)
}

#[derive(Debug, Default)]
pub struct PlanUpdate<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub duration_weeks: Option<i64>,
    pub difficulty_level: Option<&'a str>,
    pub price: Option<f64>,
    pub preview_video_url: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
}

pub fn update_workout_plan(conn: &Connection, id: &str, update: &PlanUpdate) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE workout_plans SET
           title = COALESCE(?1, title),
           description = COALESCE(?2, description),
           duration_weeks = COALESCE(?3, duration_weeks),
           difficulty_level = COALESCE(?4, difficulty_level),
           price = COALESCE(?5, price),
           preview_video_url = COALESCE(?6, preview_video_url),
           thumbnail_url = COALESCE(?7, thumbnail_url),
           updated_at = ?8
         WHERE id = ?9",
        params![
            update.title,
            update.description,
            update.duration_weeks,
            update.difficulty_level,
            update.price,
            update.preview_video_url,
            update.thumbnail_url,
            now_str(),
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_workout_plan(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM workout_plans WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_plan_row(row: &rusqlite::Row) -> anyhow::Result<WorkoutPlan> {
    let equipment: String = row.get(6)?;
    let muscles: String = row.get(7)?;
    let created_at: String = row.get(12)?;
    let updated_at: String = row.get(13)?;

    Ok(WorkoutPlan {
        id: row.get(0)?,
        instructor_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        duration_weeks: row.get(4)?,
        difficulty_level: row.get(5)?,
        equipment_needed: json_column(&equipment),
        target_muscles: json_column(&muscles),
        is_platform_plan: row.get::<_, i32>(8)? != 0,
        price: row.get(9)?,
        preview_video_url: row.get(10)?,
        thumbnail_url: row.get(11)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_plan_summary_row(row: &rusqlite::Row) -> anyhow::Result<WorkoutPlanSummary> {
    Ok(WorkoutPlanSummary {
        plan: parse_plan_row(row)?,
        first_name: row.get(14)?,
        last_name: row.get(15)?,
        review_count: row.get(16)?,
        average_rating: row.get(17)?,
    })
}

// ── Reviews ──

pub fn add_review(conn: &Connection, review: &WorkoutPlanReview) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO workout_plan_reviews (id, workout_plan_id, user_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            review.id,
            review.workout_plan_id,
            review.user_id,
            review.rating,
            review.comment,
            review.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

// ── Workout Guides ──

const GUIDE_COLUMNS: &str = "id, instructor_id, workout_plan_id, title, description, file_url, file_name, \
     access_level, price, downloads, created_at";

pub fn create_guide(conn: &Connection, guide: &WorkoutGuide) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO workout_guides (id, instructor_id, workout_plan_id, title, description, file_url,
                                     file_name, access_level, price, downloads, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            guide.id,
            guide.instructor_id,
            guide.workout_plan_id,
            guide.title,
            guide.description,
            guide.file_url,
            guide.file_name,
            guide.access_level,
            guide.price,
            guide.downloads,
            guide.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_guides(conn: &Connection, instructor_id: Option<&str>) -> anyhow::Result<Vec<WorkoutGuide>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GUIDE_COLUMNS} FROM workout_guides
         WHERE ?1 IS NULL OR instructor_id = ?1
         ORDER BY created_at DESC"
    ))?;

    let rows = stmt.query_map(params![instructor_id], |row| Ok(parse_guide_row(row)))?;

    let mut guides = vec![];
    for row in rows {
        guides.push(row??);
    }
    Ok(guides)
}

pub fn get_guide(conn: &Connection, id: &str) -> anyhow::Result<Option<WorkoutGuide>> {
    let result = conn.query_row(
        &format!("SELECT {GUIDE_COLUMNS} FROM workout_guides WHERE id = ?1"),
        params![id],
        |row| Ok(parse_guide_row(row)),
    );

    match result {
        Ok(guide) => Ok(Some(guide?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn increment_guide_downloads(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE workout_guides SET downloads = downloads + 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

pub fn delete_guide(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM workout_guides WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_guide_row(row: &rusqlite::Row) -> anyhow::Result<WorkoutGuide> {
    let created_at: String = row.get(10)?;

    Ok(WorkoutGuide {
        id: row.get(0)?,
        instructor_id: row.get(1)?,
        workout_plan_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        file_url: row.get(5)?,
        file_name: row.get(6)?,
        access_level: row.get(7)?,
        price: row.get(8)?,
        downloads: row.get(9)?,
        created_at: parse_timestamp(&created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::users::register_user;
    use crate::db::users::tests::sample_user;
    use crate::models::UserRole;
    use chrono::Utc;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        register_user(&conn, &sample_user("i1", "coach@example.com", UserRole::Instructor)).unwrap();
        register_user(&conn, &sample_user("c1", "ana@example.com", UserRole::Client)).unwrap();
        register_user(&conn, &sample_user("c2", "ben@example.com", UserRole::Client)).unwrap();
        conn
    }

    fn sample_plan(id: &str, instructor_id: Option<&str>, platform: bool) -> WorkoutPlan {
        let now = Utc::now().naive_utc();
        WorkoutPlan {
            id: id.to_string(),
            instructor_id: instructor_id.map(str::to_string),
            title: format!("Plan {id}"),
            description: String::new(),
            duration_weeks: 4,
            difficulty_level: "beginner".to_string(),
            equipment_needed: vec!["dumbbells".to_string()],
            target_muscles: vec![],
            is_platform_plan: platform,
            price: 0.0,
            preview_video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn exercise(id: &str, name: &str, order: i64) -> WorkoutExercise {
        WorkoutExercise {
            id: id.to_string(),
            name: name.to_string(),
            week_number: 1,
            day_of_week: Some("monday".to_string()),
            sets: Some(3),
            reps: Some("10".to_string()),
            rest_time: Some(60),
            weight_suggestion: None,
            form_tips: None,
            notes: None,
            sequence_order: order,
        }
    }

    fn review(id: &str, plan: &str, user: &str, rating: i64) -> WorkoutPlanReview {
        WorkoutPlanReview {
            id: id.to_string(),
            workout_plan_id: plan.to_string(),
            user_id: user.to_string(),
            rating,
            comment: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_plan_with_exercises() {
        let conn = setup_db();
        let exercises = vec![exercise("e2", "Row", 2), exercise("e1", "Squat", 1)];
        create_workout_plan(&conn, &sample_plan("p1", Some("i1"), false), &exercises).unwrap();

        let loaded = get_plan_exercises(&conn, "p1").unwrap();
        assert_eq!(loaded.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["Squat", "Row"]);
    }

    #[test]
    fn test_failed_exercise_rolls_back_plan() {
        let conn = setup_db();
        let exercises = vec![exercise("dup", "Squat", 1), exercise("dup", "Row", 2)];
        assert!(create_workout_plan(&conn, &sample_plan("p1", Some("i1"), false), &exercises).is_err());
        assert!(get_workout_plan(&conn, "p1").unwrap().is_none());
    }

    #[test]
    fn test_review_aggregates() {
        let conn = setup_db();
        create_workout_plan(&conn, &sample_plan("p1", Some("i1"), false), &[]).unwrap();
        add_review(&conn, &review("r1", "p1", "c1", 4)).unwrap();
        add_review(&conn, &review("r2", "p1", "c2", 5)).unwrap();

        let plan = get_workout_plan(&conn, "p1").unwrap().unwrap();
        assert_eq!(plan.review_count, 2);
        assert_eq!(plan.average_rating, Some(4.5));
        assert_eq!(plan.first_name.as_deref(), Some("Test"));
    }

    #[test]
    fn test_one_review_per_user() {
        let conn = setup_db();
        create_workout_plan(&conn, &sample_plan("p1", Some("i1"), false), &[]).unwrap();
        add_review(&conn, &review("r1", "p1", "c1", 4)).unwrap();
        let err = add_review(&conn, &review("r2", "p1", "c1", 1)).unwrap_err();
        assert!(db::is_unique_violation(&err));
    }

    #[test]
    fn test_plan_filters() {
        let conn = setup_db();
        create_workout_plan(&conn, &sample_plan("p1", Some("i1"), false), &[]).unwrap();
        create_workout_plan(&conn, &sample_plan("p2", None, true), &[]).unwrap();

        assert_eq!(list_workout_plans(&conn, PlanFilter::All).unwrap().len(), 2);
        let platform = list_workout_plans(&conn, PlanFilter::Platform).unwrap();
        assert_eq!(platform.len(), 1);
        assert_eq!(platform[0].plan.id, "p2");
        assert!(platform[0].first_name.is_none());
        let mine = list_workout_plans(&conn, PlanFilter::Instructor("i1")).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].review_count, 0);
        assert_eq!(mine[0].average_rating, None);
    }

    #[test]
    fn test_guide_downloads() {
        let conn = setup_db();
        let guide = WorkoutGuide {
            id: "g1".to_string(),
            instructor_id: Some("i1".to_string()),
            workout_plan_id: None,
            title: "Mobility".to_string(),
            description: String::new(),
            file_url: "https://cdn.example.com/mobility.pdf".to_string(),
            file_name: Some("mobility.pdf".to_string()),
            access_level: "free".to_string(),
            price: 0.0,
            downloads: 0,
            created_at: Utc::now().naive_utc(),
        };
        create_guide(&conn, &guide).unwrap();
        assert!(increment_guide_downloads(&conn, "g1").unwrap());
        assert!(increment_guide_downloads(&conn, "g1").unwrap());
        assert_eq!(get_guide(&conn, "g1").unwrap().unwrap().downloads, 2);
        assert_eq!(list_guides(&conn, Some("someone-else")).unwrap().len(), 0);
        assert_eq!(list_guides(&conn, None).unwrap().len(), 1);
    }
}
