use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::shift::ShiftInstance;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Pending,
    Present,
    Absent,
}

/// One attendance row per (staff, date, shift); entry first, exit filled in
/// place later. The unique key lives in the database schema.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub staff_id: u64,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "morning")]
    pub shift: ShiftInstance,
    #[schema(example = "07:12:00", value_type = Option<String>)]
    pub entry_time: Option<NaiveTime>,
    #[schema(example = "12:45:00", value_type = Option<String>)]
    pub exit_time: Option<NaiveTime>,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
    pub device_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
