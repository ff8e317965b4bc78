use rusqlite::{params, Connection};

use super::{now_str, parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::{InstructorFees, SubscriptionPeriod, SubscriptionPlan, UserSubscription};

// ── Instructor Fees ──

pub fn upsert_fees(conn: &Connection, fees: &InstructorFees) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO instructor_fees (instructor_id, session_fee, video_fee, workout_plan_fee,
                                      platform_commission_rate, currency, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(instructor_id) DO UPDATE SET
           session_fee = excluded.session_fee,
           video_fee = excluded.video_fee,
           workout_plan_fee = excluded.workout_plan_fee,
           platform_commission_rate = excluded.platform_commission_rate,
           currency = excluded.currency,
           updated_at = excluded.updated_at",
        params![
            fees.instructor_id,
            fees.session_fee,
            fees.video_fee,
            fees.workout_plan_fee,
            fees.platform_commission_rate,
            fees.currency,
            now_str(),
        ],
    )?;
    Ok(())
}

pub fn get_fees(conn: &Connection, instructor_id: &str) -> anyhow::Result<Option<InstructorFees>> {
    let result = conn.query_row(
        "SELECT instructor_id, session_fee, video_fee, workout_plan_fee, platform_commission_rate, currency
         FROM instructor_fees WHERE instructor_id = ?1",
        params![instructor_id],
        |row| {
            Ok(InstructorFees {
                instructor_id: row.get(0)?,
                session_fee: row.get(1)?,
                video_fee: row.get(2)?,
                workout_plan_fee: row.get(3)?,
                platform_commission_rate: row.get(4)?,
                currency: row.get(5)?,
            })
        },
    );

    match result {
        Ok(fees) => Ok(Some(fees)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Subscription Plans ──

pub fn list_plans(conn: &Connection) -> anyhow::Result<Vec<SubscriptionPlan>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, price, period, is_platform_plan, instructor_id
         FROM subscription_plans ORDER BY price ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_plan_row(row)))?;

    let mut plans = vec![];
    for row in rows {
        plans.push(row??);
    }
    Ok(plans)
}

pub fn get_plan(conn: &Connection, id: &str) -> anyhow::Result<Option<SubscriptionPlan>> {
    let result = conn.query_row(
        "SELECT id, name, description, price, period, is_platform_plan, instructor_id
         FROM subscription_plans WHERE id = ?1",
        params![id],
        |row| Ok(parse_plan_row(row)),
    );

    match result {
        Ok(plan) => Ok(Some(plan?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_plan_row(row: &rusqlite::Row) -> anyhow::Result<SubscriptionPlan> {
    let period_str: String = row.get(4)?;
    let period = SubscriptionPeriod::parse(&period_str)
        .ok_or_else(|| anyhow::anyhow!("unknown subscription period: {period_str}"))?;

    Ok(SubscriptionPlan {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        period,
        is_platform_plan: row.get::<_, i32>(5)? != 0,
        instructor_id: row.get(6)?,
    })
}

// ── Subscriptions ──

pub fn create_subscription(conn: &Connection, sub: &UserSubscription) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO user_subscriptions (id, user_id, plan_id, instructor_id, start_date, end_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            sub.id,
            sub.user_id,
            sub.plan_id,
            sub.instructor_id,
            sub.start_date.format(TIMESTAMP_FORMAT).to_string(),
            sub.end_date.format(TIMESTAMP_FORMAT).to_string(),
            sub.status,
        ],
    )?;
    Ok(())
}

pub fn get_subscriptions_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<UserSubscription>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, plan_id, instructor_id, start_date, end_date, status
         FROM user_subscriptions WHERE user_id = ?1 ORDER BY start_date DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        let start: String = row.get(4)?;
        let end: String = row.get(5)?;
        Ok(UserSubscription {
            id: row.get(0)?,
            user_id: row.get(1)?,
            plan_id: row.get(2)?,
            instructor_id: row.get(3)?,
            start_date: parse_timestamp(&start),
            end_date: parse_timestamp(&end),
            status: row.get(6)?,
        })
    })?;

    let mut subs = vec![];
    for row in rows {
        subs.push(row?);
    }
    Ok(subs)
}
