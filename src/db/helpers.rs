// src/db/helpers.rs

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// Read a JSON value stored under `key`.
///
/// Returns `Ok(None)` when the key has never been written.
pub fn read_value<T>(conn: &Connection, key: &str) -> Result<Option<T>, AppError>
where
    T: DeserializeOwned,
{
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM storage WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and upsert it under `key`.
pub fn write_value<T>(conn: &Connection, key: &str, value: &T, now_ms: i64) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, json, now_ms],
    )?;
    Ok(())
}
