use chrono::{NaiveDate, NaiveTime};
use derive_more::Display;
use sqlx::MySqlPool;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::shift::ShiftInstance;

/// Failure modes of the attendance store. A duplicate `(staff, date, shift)`
/// key is a conflict, never an overwrite.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "an entry already exists for this staff, date and shift")]
    Conflict,
    #[display(fmt = "database error: {}", _0)]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // MySQL duplicate-key violations surface as SQLSTATE 23000.
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Conflict;
            }
        }
        StoreError::Db(e)
    }
}

pub struct NewEntry<'a> {
    pub staff_id: u64,
    pub date: NaiveDate,
    pub shift: ShiftInstance,
    pub entry_time: NaiveTime,
    pub device_id: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Persistence boundary for attendance records. Handlers construct one per
/// request from the shared pool; the shift engine never sees it.
pub struct AttendanceStore<'a> {
    pool: &'a MySqlPool,
}

impl<'a> AttendanceStore<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        staff_id: u64,
        date: NaiveDate,
        shift: ShiftInstance,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, staff_id, date, shift, entry_time, exit_time, status,
                   device_id, lat, lng, created_at, updated_at
            FROM attendance
            WHERE staff_id = ? AND date = ? AND shift = ?
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .bind(shift)
        .fetch_optional(self.pool)
        .await
    }

    /// Create the record with its entry half. The unique key serializes
    /// concurrent duplicates into a [`StoreError::Conflict`].
    pub async fn insert_entry(&self, entry: &NewEntry<'_>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (staff_id, date, shift, entry_time, status, device_id, lat, lng)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.staff_id)
        .bind(entry.date)
        .bind(entry.shift)
        .bind(entry.entry_time)
        .bind(AttendanceStatus::Present)
        .bind(entry.device_id)
        .bind(entry.lat)
        .bind(entry.lng)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Fill the exit half of an existing record. Returns the number of rows
    /// touched; zero means the exit was already set by a concurrent event.
    pub async fn set_exit(
        &self,
        record_id: u64,
        exit_time: NaiveTime,
        device_id: Option<&str>,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET exit_time = ?,
                device_id = COALESCE(?, device_id),
                lat = COALESCE(?, lat),
                lng = COALESCE(?, lng)
            WHERE id = ? AND exit_time IS NULL
            "#,
        )
        .bind(exit_time)
        .bind(device_id)
        .bind(lat)
        .bind(lng)
        .bind(record_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
