use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceRecord;
use crate::shift::{self, Incidence, RecordKind, ShiftInstance};
use crate::store::{AttendanceStore, NewEntry, StoreError};
use crate::utils::{staff_cache, staff_cache::CachedStaff, staff_filter};

/// A check-in/out event as delivered by a QR scan or the kiosk sync page.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanEvent {
    #[schema(example = 12)]
    pub staff_id: u64,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// HH:MM:SS, with HH:MM tolerated for older scanner firmware.
    #[schema(example = "07:12:00")]
    pub time: String,
    /// Explicit record kind; omitted means "whatever the record is missing".
    pub kind: Option<RecordKind>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncParams {
    pub staff_id: u64,
    #[schema(example = "2026-03-02")]
    pub date: String,
    #[schema(example = "07:12:00")]
    pub time: String,
}

/// Event pushed by the mobile app, geolocated and device-stamped.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeviceSyncEvent {
    #[schema(example = 12)]
    pub staff_id: u64,
    #[schema(example = "tablet-gate-01")]
    pub device_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[schema(example = "entry")]
    pub kind: RecordKind,
    #[schema(example = "2026-03-02 07:12:00")]
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanOutcome {
    pub staff_id: u64,
    pub full_name: String,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "morning")]
    pub shift: ShiftInstance,
    #[schema(example = "entry")]
    pub kind: RecordKind,
    #[schema(example = "07:12:00", value_type = String)]
    pub time: NaiveTime,
    pub late: bool,
    pub message: String,
    /// Present on exit events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incidence: Option<Incidence>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkImportResult {
    #[schema(example = 8)]
    pub imported: usize,
    #[schema(example = json!(["row 3: staff member 99 not found"]))]
    pub errors: Vec<String>,
}

/// Failure modes of a single attendance event, kept apart so the transport
/// layer can answer 404 / 400 / 409 / 500 respectively.
#[derive(Debug, Display)]
pub enum ScanError {
    #[display(fmt = "staff member {} not found", _0)]
    UnknownStaff(u64),
    /// Expected policy outcome from the shift engine, not a fault.
    #[display(fmt = "{}", _0)]
    Rejected(String),
    /// Data-integrity clash with an already stored record.
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "database error")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for ScanError {
    fn from(e: sqlx::Error) -> Self {
        ScanError::Db(e)
    }
}

impl From<StoreError> for ScanError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => ScanError::Conflict(StoreError::Conflict.to_string()),
            StoreError::Db(e) => ScanError::Db(e),
        }
    }
}

fn scan_error_response(err: ScanError) -> HttpResponse {
    match err {
        ScanError::UnknownStaff(id) => HttpResponse::NotFound().json(json!({
            "message": format!("staff member {id} not found")
        })),
        ScanError::Rejected(message) => {
            HttpResponse::BadRequest().json(json!({ "message": message }))
        }
        ScanError::Conflict(message) => {
            HttpResponse::Conflict().json(json!({ "message": message }))
        }
        ScanError::Db(e) => {
            error!(error = %e, "Attendance event failed");
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }))
        }
    }
}

pub(crate) fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Three-tier staff lookup: cuckoo filter for the fast negative, moka cache
/// for the fast positive, database as the fallback.
async fn lookup_staff(pool: &MySqlPool, staff_id: u64) -> Result<Option<CachedStaff>, sqlx::Error> {
    if !staff_filter::might_exist(staff_id) {
        return Ok(None);
    }

    if let Some(staff) = staff_cache::get(staff_id).await {
        return Ok(Some(staff));
    }

    let row = sqlx::query_as::<_, (String, shift::ShiftType, bool)>(
        "SELECT full_name, shift_type, active FROM staff WHERE id = ?",
    )
    .bind(staff_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((full_name, shift_type, active)) => {
            let staff = CachedStaff {
                full_name,
                shift_type,
                active,
            };
            staff_cache::put(staff_id, staff.clone()).await;
            Ok(Some(staff))
        }
        None => Ok(None),
    }
}

/// Pick the record kind for an event: an explicit kind always wins, otherwise
/// the first event of the day is the entry and the next one fills the exit.
fn determine_kind(
    explicit: Option<RecordKind>,
    entry_present: bool,
    exit_present: bool,
) -> Result<RecordKind, String> {
    if let Some(kind) = explicit {
        return Ok(kind);
    }
    match (entry_present, exit_present) {
        (true, false) => Ok(RecordKind::Exit),
        (true, true) => Err("record already has both entry and exit".to_string()),
        _ => Ok(RecordKind::Entry),
    }
}

/// The one resolve → validate → upsert pipeline every scan-shaped entry
/// point goes through.
pub(crate) async fn process_scan_event(
    pool: &MySqlPool,
    staff_id: u64,
    date: NaiveDate,
    time: NaiveTime,
    kind: Option<RecordKind>,
) -> Result<ScanOutcome, ScanError> {
    let staff = lookup_staff(pool, staff_id)
        .await?
        .ok_or(ScanError::UnknownStaff(staff_id))?;

    let resolution = shift::resolve(staff.shift_type, time);
    let Some(resolved) = resolution.shift() else {
        return Err(ScanError::Rejected(resolution.message()));
    };

    let store = AttendanceStore::new(pool);
    let existing = store.find(staff_id, date, resolved).await?;

    let entry_present = existing.as_ref().is_some_and(|r| r.entry_time.is_some());
    let exit_present = existing.as_ref().is_some_and(|r| r.exit_time.is_some());

    let kind = determine_kind(kind, entry_present, exit_present)
        .map_err(|msg| ScanError::Conflict(format!("{msg} for {date} ({resolved})")))?;

    let verdict = shift::validate(resolved, time, kind);
    if !verdict.is_accepted() {
        return Err(ScanError::Rejected(verdict.message().to_string()));
    }

    let mut incidence = None;
    match kind {
        RecordKind::Entry => {
            if entry_present {
                return Err(ScanError::Conflict(format!(
                    "entry already registered for {date} ({resolved})"
                )));
            }
            store
                .insert_entry(&NewEntry {
                    staff_id,
                    date,
                    shift: resolved,
                    entry_time: time,
                    device_id: None,
                    lat: None,
                    lng: None,
                })
                .await?;
        }
        RecordKind::Exit => {
            let Some(record) = existing.filter(|r| r.entry_time.is_some()) else {
                return Err(ScanError::Conflict(format!(
                    "no entry registered for {date} ({resolved})"
                )));
            };
            if exit_present {
                return Err(ScanError::Conflict(format!(
                    "exit already registered for {date} ({resolved})"
                )));
            }
            if record.entry_time.is_some_and(|entry| time < entry) {
                return Err(ScanError::Rejected(
                    "exit time precedes the registered entry".to_string(),
                ));
            }
            let affected = store.set_exit(record.id, time, None, None, None).await?;
            if affected == 0 {
                return Err(ScanError::Conflict(format!(
                    "exit already registered for {date} ({resolved})"
                )));
            }
            incidence = Some(shift::incidence(resolved, record.entry_time, Some(time)));
        }
    }

    Ok(ScanOutcome {
        staff_id,
        full_name: staff.full_name,
        date,
        shift: resolved,
        kind,
        time,
        late: verdict.is_late(),
        message: verdict.message().to_string(),
        incidence,
    })
}

/// QR scan endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = ScanEvent,
    responses(
        (status = 200, description = "Event registered", body = ScanOutcome),
        (status = 400, description = "Rejected by the shift window rules"),
        (status = 404, description = "Unknown staff id"),
        (status = 409, description = "Duplicate entry or missing counterpart"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn scan(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ScanEvent>,
) -> actix_web::Result<impl Responder> {
    let Some(time) = parse_clock_time(&payload.time) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("invalid time format ({})", payload.time)
        })));
    };

    match process_scan_event(pool.get_ref(), payload.staff_id, payload.date, time, payload.kind).await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) => Ok(scan_error_response(err)),
    }
}

/// Sync endpoint for offline scanners replaying events via query string
#[utoipa::path(
    get,
    path = "/api/v1/attendance/sync",
    params(
        ("staff_id" = u64, Query, description = "Staff ID"),
        ("date" = String, Query, description = "Event date, YYYY-MM-DD"),
        ("time" = String, Query, description = "Event time, HH:MM:SS")
    ),
    responses(
        (status = 200, description = "Event registered", body = ScanOutcome),
        (status = 400, description = "Malformed parameters or rejected event"),
        (status = 404, description = "Unknown staff id"),
        (status = 409, description = "Duplicate entry or missing counterpart")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn sync(
    pool: web::Data<MySqlPool>,
    query: web::Query<SyncParams>,
) -> actix_web::Result<impl Responder> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").ok();
    let time = parse_clock_time(&query.time);

    let (Some(date), Some(time)) = (date, time) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "invalid date/time format"
        })));
    };

    match process_scan_event(pool.get_ref(), query.staff_id, date, time, None).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) => Ok(scan_error_response(err)),
    }
}

/// Geolocated device sync endpoint
///
/// Unlike the scan pipeline, the shift is bucketed from the timestamp alone;
/// the assigned shift type plays no part here, and no window validation is
/// applied beyond the bucket itself.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/device-sync",
    request_body = DeviceSyncEvent,
    responses(
        (status = 200, description = "Event registered", body = ScanOutcome),
        (status = 400, description = "Malformed timestamp or outside working hours"),
        (status = 404, description = "Unknown staff id"),
        (status = 409, description = "Duplicate entry or missing counterpart")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn device_sync(
    pool: web::Data<MySqlPool>,
    payload: web::Json<DeviceSyncEvent>,
) -> actix_web::Result<impl Responder> {
    let Ok(stamp) = NaiveDateTime::parse_from_str(&payload.timestamp, "%Y-%m-%d %H:%M:%S") else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("invalid timestamp format ({})", payload.timestamp)
        })));
    };

    match process_device_event(pool.get_ref(), &payload, stamp.date(), stamp.time()).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(err) => Ok(scan_error_response(err)),
    }
}

async fn process_device_event(
    pool: &MySqlPool,
    event: &DeviceSyncEvent,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<ScanOutcome, ScanError> {
    let staff = lookup_staff(pool, event.staff_id)
        .await?
        .ok_or(ScanError::UnknownStaff(event.staff_id))?;

    let Some(resolved) = shift::bucket(time) else {
        return Err(ScanError::Rejected(
            "time is outside working hours".to_string(),
        ));
    };

    let store = AttendanceStore::new(pool);
    let existing = store.find(event.staff_id, date, resolved).await?;

    let mut incidence = None;
    match event.kind {
        RecordKind::Entry => {
            if existing.as_ref().is_some_and(|r| r.entry_time.is_some()) {
                return Err(ScanError::Conflict(format!(
                    "entry already registered for {date} ({resolved})"
                )));
            }
            store
                .insert_entry(&NewEntry {
                    staff_id: event.staff_id,
                    date,
                    shift: resolved,
                    entry_time: time,
                    device_id: Some(&event.device_id),
                    lat: event.lat,
                    lng: event.lng,
                })
                .await?;
        }
        RecordKind::Exit => {
            let Some(record) = existing.filter(|r| r.entry_time.is_some()) else {
                return Err(ScanError::Conflict(format!(
                    "no entry registered for {date} ({resolved})"
                )));
            };
            if record.exit_time.is_some() {
                return Err(ScanError::Conflict(format!(
                    "exit already registered for {date} ({resolved})"
                )));
            }
            if record.entry_time.is_some_and(|entry| time < entry) {
                return Err(ScanError::Rejected(
                    "exit time precedes the registered entry".to_string(),
                ));
            }
            store
                .set_exit(record.id, time, Some(&event.device_id), event.lat, event.lng)
                .await?;
            incidence = Some(shift::incidence(resolved, record.entry_time, Some(time)));
        }
    }

    Ok(ScanOutcome {
        staff_id: event.staff_id,
        full_name: staff.full_name,
        date,
        shift: resolved,
        kind: event.kind,
        time,
        late: false,
        message: format!("{} registered on the {resolved} shift", event.kind),
        incidence,
    })
}

/// Bulk import of scan events
///
/// Rows are processed independently; one bad row never aborts the batch.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/import",
    request_body = Vec<ScanEvent>,
    responses(
        (status = 200, description = "Batch processed", body = BulkImportResult)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn import(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<Vec<ScanEvent>>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut imported = 0usize;
    let mut errors = Vec::new();

    for (index, event) in payload.iter().enumerate() {
        let row = index + 1;

        let Some(time) = parse_clock_time(&event.time) else {
            errors.push(format!("row {row}: invalid time format ({})", event.time));
            continue;
        };

        match process_scan_event(pool.get_ref(), event.staff_id, event.date, time, event.kind).await
        {
            Ok(_) => imported += 1,
            Err(ScanError::Db(e)) => {
                // Infrastructure faults still only sink the one row.
                error!(error = %e, row, "Bulk import row failed");
                errors.push(format!("row {row}: database error"));
            }
            Err(err) => errors.push(format!("row {row}: {err}")),
        }
    }

    Ok(HttpResponse::Ok().json(BulkImportResult { imported, errors }))
}

/// Today's records for the authenticated staff user
#[utoipa::path(
    get,
    path = "/api/v1/attendance/me",
    responses(
        (status = 200, description = "Today's attendance records", body = [AttendanceRecord]),
        (status = 403, description = "User has no staff profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let staff_id: u64 = auth
        .staff_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No staff profile"))?;

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, staff_id, date, shift, entry_time, exit_time, status,
               device_id, lat, lng, created_at, updated_at
        FROM attendance
        WHERE staff_id = ? AND date = CURDATE()
        ORDER BY entry_time
        "#,
    )
    .bind(staff_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, staff_id, "Failed to fetch own attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_accepts_both_formats() {
        assert_eq!(parse_clock_time("07:12:00"), NaiveTime::from_hms_opt(7, 12, 0));
        assert_eq!(parse_clock_time("07:12"), NaiveTime::from_hms_opt(7, 12, 0));
        assert!(parse_clock_time("7h12").is_none());
        assert!(parse_clock_time("25:00:00").is_none());
    }

    #[test]
    fn explicit_kind_wins() {
        assert_eq!(
            determine_kind(Some(RecordKind::Entry), true, false),
            Ok(RecordKind::Entry)
        );
        assert_eq!(
            determine_kind(Some(RecordKind::Exit), false, false),
            Ok(RecordKind::Exit)
        );
    }

    #[test]
    fn record_state_decides_when_kind_is_omitted() {
        assert_eq!(determine_kind(None, false, false), Ok(RecordKind::Entry));
        assert_eq!(determine_kind(None, true, false), Ok(RecordKind::Exit));
        assert!(determine_kind(None, true, true).is_err());
    }
}
