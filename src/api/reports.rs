use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::model::leave_request::LeaveStatus;
use crate::model::staff::StaffKind;
use crate::shift::{self, ShiftInstance, ShiftType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct IncidenceParams {
    #[schema(example = "2026-03-01", value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-03-31", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    pub shift: Option<ShiftInstance>,
    pub staff_id: Option<u64>,
}

/// Per-staff compliance totals over a date range. Only staff with at least
/// one infraction appear.
#[derive(Debug, Serialize, ToSchema)]
pub struct IncidenceSummary {
    pub staff_id: u64,
    pub full_name: String,
    #[schema(example = "morning")]
    pub shift_type: ShiftType,
    pub late_count: u32,
    pub early_departure_count: u32,
    pub infractions: u32,
    pub late_minutes: i64,
    pub early_departure_minutes: i64,
    /// Minutes actually worked on infringing days.
    pub worked_minutes: i64,
}

#[derive(sqlx::FromRow)]
struct IncidenceRow {
    staff_id: u64,
    full_name: String,
    shift_type: ShiftType,
    shift: ShiftInstance,
    entry_time: Option<NaiveTime>,
    exit_time: Option<NaiveTime>,
}

/// Lateness / early-departure report
#[utoipa::path(
    get,
    path = "/api/v1/reports/incidences",
    params(
        ("from" = Option<String>, Query, description = "Range start, YYYY-MM-DD (default today)"),
        ("to" = Option<String>, Query, description = "Range end, YYYY-MM-DD (default today)"),
        ("shift" = Option<String>, Query, description = "Filter by resolved shift"),
        ("staff_id" = Option<u64>, Query, description = "Filter by staff member")
    ),
    responses(
        (status = 200, description = "Per-staff incidence summary", body = [IncidenceSummary])
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn incidences(
    pool: web::Data<MySqlPool>,
    params: web::Query<IncidenceParams>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();
    let from = params.from.unwrap_or(today);
    let to = params.to.unwrap_or(today);

    let mut sql = String::from(
        r#"
        SELECT a.staff_id, s.full_name, s.shift_type, a.shift, a.entry_time, a.exit_time
        FROM attendance a
        INNER JOIN staff s ON s.id = a.staff_id
        WHERE a.date BETWEEN ? AND ?
        "#,
    );
    if params.shift.is_some() {
        sql.push_str(" AND a.shift = ?");
    }
    if params.staff_id.is_some() {
        sql.push_str(" AND a.staff_id = ?");
    }
    sql.push_str(" ORDER BY a.date, a.entry_time");

    let mut query = sqlx::query_as::<_, IncidenceRow>(&sql).bind(from).bind(to);
    if let Some(shift) = params.shift {
        query = query.bind(shift);
    }
    if let Some(staff_id) = params.staff_id {
        query = query.bind(staff_id);
    }

    let rows = query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch incidence rows");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut summary: HashMap<u64, IncidenceSummary> = HashMap::new();

    for row in rows {
        let inc = shift::incidence(row.shift, row.entry_time, row.exit_time);
        if inc.late_minutes == 0 && inc.early_departure_minutes == 0 {
            continue;
        }

        let entry = summary
            .entry(row.staff_id)
            .or_insert_with(|| IncidenceSummary {
                staff_id: row.staff_id,
                full_name: row.full_name.clone(),
                shift_type: row.shift_type,
                late_count: 0,
                early_departure_count: 0,
                infractions: 0,
                late_minutes: 0,
                early_departure_minutes: 0,
                worked_minutes: 0,
            });

        if inc.late_minutes > 0 {
            entry.late_count += 1;
        }
        if inc.early_departure_minutes > 0 {
            entry.early_departure_count += 1;
        }
        entry.infractions += 1;
        entry.late_minutes += inc.late_minutes;
        entry.early_departure_minutes += inc.early_departure_minutes;
        entry.worked_minutes += shift::worked_minutes(row.entry_time, row.exit_time);
    }

    let mut result: Vec<IncidenceSummary> = summary.into_values().collect();
    result.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DailyParams {
    #[schema(example = "2026-03-02", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct DailyRow {
    pub id: u64,
    pub staff_id: u64,
    pub full_name: String,
    #[schema(example = "morning")]
    pub shift: ShiftInstance,
    #[schema(value_type = Option<String>)]
    pub entry_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub exit_time: Option<NaiveTime>,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

/// Daily attendance report
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily",
    params(
        ("date" = Option<String>, Query, description = "Day to report, YYYY-MM-DD (default today)"),
        ("search" = Option<String>, Query, description = "Filter by staff name")
    ),
    responses(
        (status = 200, description = "Day's attendance records", body = [DailyRow])
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn daily(
    pool: web::Data<MySqlPool>,
    params: web::Query<DailyParams>,
) -> actix_web::Result<impl Responder> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());

    let mut sql = String::from(
        r#"
        SELECT a.id, a.staff_id, s.full_name, a.shift, a.entry_time, a.exit_time, a.status
        FROM attendance a
        INNER JOIN staff s ON s.id = a.staff_id
        WHERE a.date = ?
        "#,
    );
    if params.search.is_some() {
        sql.push_str(" AND s.full_name LIKE ?");
    }
    sql.push_str(" ORDER BY a.shift, a.entry_time");

    let mut query = sqlx::query_as::<_, DailyRow>(&sql).bind(date);
    if let Some(search) = &params.search {
        query = query.bind(format!("%{}%", search));
    }

    let rows = query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch daily report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AbsenceParams {
    #[schema(example = "2026-03-02", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AbsenceRow {
    pub staff_id: u64,
    pub full_name: String,
    #[schema(example = "morning")]
    pub shift_type: ShiftType,
    #[schema(example = "teaching")]
    pub staff_kind: StaffKind,
}

/// Unjustified absences: active staff with neither an attendance record nor
/// approved leave covering the day.
#[utoipa::path(
    get,
    path = "/api/v1/reports/absences",
    params(
        ("date" = Option<String>, Query, description = "Day to check, YYYY-MM-DD (default today)")
    ),
    responses(
        (status = 200, description = "Staff absent without leave", body = [AbsenceRow])
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn absences(
    pool: web::Data<MySqlPool>,
    params: web::Query<AbsenceParams>,
) -> actix_web::Result<impl Responder> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());

    let rows = sqlx::query_as::<_, AbsenceRow>(
        r#"
        SELECT s.id AS staff_id, s.full_name, s.shift_type, s.staff_kind
        FROM staff s
        WHERE s.active = TRUE
          AND s.id NOT IN (SELECT staff_id FROM attendance WHERE date = ?)
          AND s.id NOT IN (
              SELECT staff_id FROM leave_requests
              WHERE status = 'approved' AND start_date <= ? AND end_date >= ?
          )
        ORDER BY s.full_name
        "#,
    )
    .bind(date)
    .bind(date)
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch absences");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthlyParams {
    /// Month to report, YYYY-MM (default current month)
    #[schema(example = "2026-03")]
    pub month: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySummary {
    pub staff_id: u64,
    pub full_name: String,
    pub present: u32,
    pub absent: u32,
    pub pending: u32,
    pub late_arrivals: u32,
}

#[derive(sqlx::FromRow)]
struct MonthlyRow {
    staff_id: u64,
    full_name: String,
    shift: ShiftInstance,
    entry_time: Option<NaiveTime>,
    status: AttendanceStatus,
}

/// Monthly per-staff summary
#[utoipa::path(
    get,
    path = "/api/v1/reports/monthly",
    params(
        ("month" = Option<String>, Query, description = "Month to report, YYYY-MM (default current)"),
        ("search" = Option<String>, Query, description = "Filter by staff name")
    ),
    responses(
        (status = 200, description = "Per-staff monthly summary", body = [MonthlySummary]),
        (status = 400, description = "Invalid month format")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn monthly(
    pool: web::Data<MySqlPool>,
    params: web::Query<MonthlyParams>,
) -> actix_web::Result<impl Responder> {
    let (year, month) = match &params.month {
        Some(raw) => {
            let parsed = raw
                .split_once('-')
                .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
                .filter(|(_, m)| (1..=12).contains(m));
            match parsed {
                Some(pair) => pair,
                None => {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "invalid month format, use YYYY-MM"
                    })));
                }
            }
        }
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let mut sql = String::from(
        r#"
        SELECT a.staff_id, s.full_name, a.shift, a.entry_time, a.status
        FROM attendance a
        INNER JOIN staff s ON s.id = a.staff_id
        WHERE YEAR(a.date) = ? AND MONTH(a.date) = ?
        "#,
    );
    if params.search.is_some() {
        sql.push_str(" AND s.full_name LIKE ?");
    }

    let mut query = sqlx::query_as::<_, MonthlyRow>(&sql).bind(year).bind(month);
    if let Some(search) = &params.search {
        query = query.bind(format!("%{}%", search));
    }

    let rows = query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch monthly report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut summary: HashMap<u64, MonthlySummary> = HashMap::new();

    for row in rows {
        let entry = summary
            .entry(row.staff_id)
            .or_insert_with(|| MonthlySummary {
                staff_id: row.staff_id,
                full_name: row.full_name.clone(),
                present: 0,
                absent: 0,
                pending: 0,
                late_arrivals: 0,
            });

        match row.status {
            AttendanceStatus::Present => {
                entry.present += 1;
                let inc = shift::incidence(row.shift, row.entry_time, None);
                if inc.late_minutes > 0 {
                    entry.late_arrivals += 1;
                }
            }
            AttendanceStatus::Absent => entry.absent += 1,
            AttendanceStatus::Pending => entry.pending += 1,
        }
    }

    let mut result: Vec<MonthlySummary> = summary.into_values().collect();
    result.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    #[schema(example = "approved")]
    pub status: LeaveStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftCount {
    #[schema(example = "morning")]
    pub shift_type: ShiftType,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RankingEntry {
    pub staff_id: u64,
    pub full_name: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_staff: i64,
    pub active_leaves: i64,
    pub attendance_today: i64,
    /// Approved leaves ending within the next 3 days.
    pub expiring_leaves: i64,
    pub leaves_by_status: Vec<StatusCount>,
    pub staff_by_shift: Vec<ShiftCount>,
    /// Most late arrivals over the last 30 days.
    pub late_ranking: Vec<RankingEntry>,
    /// Most days without any record over the last 5 days.
    pub absence_ranking: Vec<RankingEntry>,
}

/// Dashboard metrics
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard metric cards and rankings", body = DashboardSummary)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn dashboard(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let db = pool.get_ref();
    let internal = |e: sqlx::Error| {
        error!(error = %e, "Dashboard query failed");
        ErrorInternalServerError("Internal Server Error")
    };

    let total_staff = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM staff")
        .fetch_one(db)
        .await
        .map_err(internal)?;

    let active_leaves = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM leave_requests
        WHERE status = 'approved' AND start_date <= CURDATE() AND end_date >= CURDATE()
        "#,
    )
    .fetch_one(db)
    .await
    .map_err(internal)?;

    let attendance_today =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = CURDATE()")
            .fetch_one(db)
            .await
            .map_err(internal)?;

    let expiring_leaves = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM leave_requests
        WHERE status = 'approved'
          AND end_date BETWEEN CURDATE() AND DATE_ADD(CURDATE(), INTERVAL 3 DAY)
        "#,
    )
    .fetch_one(db)
    .await
    .map_err(internal)?;

    let leaves_by_status = sqlx::query_as::<_, (LeaveStatus, i64)>(
        "SELECT status, COUNT(*) FROM leave_requests GROUP BY status",
    )
    .fetch_all(db)
    .await
    .map_err(internal)?
    .into_iter()
    .map(|(status, count)| StatusCount { status, count })
    .collect();

    let staff_by_shift = sqlx::query_as::<_, (ShiftType, i64)>(
        "SELECT shift_type, COUNT(*) FROM staff GROUP BY shift_type",
    )
    .fetch_all(db)
    .await
    .map_err(internal)?
    .into_iter()
    .map(|(shift_type, count)| ShiftCount { shift_type, count })
    .collect();

    // Late arrivals are judged by the incidence engine, so the ranking is
    // aggregated here rather than in SQL.
    let recent = sqlx::query_as::<_, (u64, String, ShiftInstance, Option<NaiveTime>)>(
        r#"
        SELECT a.staff_id, s.full_name, a.shift, a.entry_time
        FROM attendance a
        INNER JOIN staff s ON s.id = a.staff_id
        WHERE a.date >= DATE_SUB(CURDATE(), INTERVAL 30 DAY)
          AND a.entry_time IS NOT NULL
        "#,
    )
    .fetch_all(db)
    .await
    .map_err(internal)?;

    let mut late_counts: HashMap<u64, (String, i64)> = HashMap::new();
    for (staff_id, full_name, shift, entry_time) in recent {
        if shift::incidence(shift, entry_time, None).late_minutes > 0 {
            let entry = late_counts.entry(staff_id).or_insert((full_name, 0));
            entry.1 += 1;
        }
    }
    let mut late_ranking: Vec<RankingEntry> = late_counts
        .into_iter()
        .map(|(staff_id, (full_name, count))| RankingEntry {
            staff_id,
            full_name,
            count,
        })
        .collect();
    late_ranking.sort_by(|a, b| b.count.cmp(&a.count).then(a.full_name.cmp(&b.full_name)));
    late_ranking.truncate(5);

    let absence_ranking = sqlx::query_as::<_, (u64, String, i64)>(
        r#"
        SELECT s.id, s.full_name, 5 - COUNT(DISTINCT a.date) AS missing_days
        FROM staff s
        LEFT JOIN attendance a
          ON a.staff_id = s.id AND a.date > DATE_SUB(CURDATE(), INTERVAL 5 DAY)
        WHERE s.active = TRUE
        GROUP BY s.id, s.full_name
        HAVING missing_days > 0
        ORDER BY missing_days DESC, s.full_name
        LIMIT 5
        "#,
    )
    .fetch_all(db)
    .await
    .map_err(internal)?
    .into_iter()
    .map(|(staff_id, full_name, count)| RankingEntry {
        staff_id,
        full_name,
        count,
    })
    .collect();

    Ok(HttpResponse::Ok().json(DashboardSummary {
        total_staff,
        active_leaves,
        attendance_today,
        expiring_leaves,
        leaves_by_status,
        staff_by_shift,
        late_ranking,
        absence_ranking,
    }))
}
