use rusqlite::{params, Connection};

use super::{parse_timestamp, TIMESTAMP_FORMAT};
use crate::models::ProgressRecord;

pub fn create_record(conn: &Connection, record: &ProgressRecord) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO progress_records (id, client_id, type, value, unit, notes, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.client_id,
            record.kind,
            record.value,
            record.unit,
            record.notes,
            record.recorded_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_records_for_client(conn: &Connection, client_id: &str) -> anyhow::Result<Vec<ProgressRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, client_id, type, value, unit, notes, recorded_at
         FROM progress_records WHERE client_id = ?1
         ORDER BY recorded_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![client_id], |row| {
        let recorded_at: String = row.get(6)?;
        Ok(ProgressRecord {
            id: row.get(0)?,
            client_id: row.get(1)?,
            kind: row.get(2)?,
            value: row.get(3)?,
            unit: row.get(4)?,
            notes: row.get(5)?,
            recorded_at: parse_timestamp(&recorded_at),
        })
    })?;

    let mut records = vec![];
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}
