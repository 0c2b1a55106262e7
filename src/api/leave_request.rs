use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 12)]
    pub staff_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "medical leave")]
    pub reason: Option<String>,
    /// HR may file a pre-approved leave; defaults to pending.
    pub status: Option<LeaveStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 12)]
    /// Filter by staff ID
    pub staff_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    /// Only leaves starting on or after this date
    #[schema(example = "2026-01-01", value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    /// Only leaves ending on or before this date
    #[schema(example = "2026-01-31", value_type = Option<String>)]
    #[param(value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// Inclusive date ranges overlap iff each starts before the other ends.
fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Find a non-rejected leave clashing with [start, end] for this staff
/// member. Checking pending rows too keeps a later approval from creating
/// an overlapping approved pair.
async fn overlapping_leave(
    pool: &MySqlPool,
    staff_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<u64>,
) -> Result<Option<(NaiveDate, NaiveDate)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (u64, NaiveDate, NaiveDate)>(
        r#"
        SELECT id, start_date, end_date
        FROM leave_requests
        WHERE staff_id = ? AND status != 'rejected'
        "#,
    )
    .bind(staff_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|(id, _, _)| Some(*id) != exclude_id)
        .find(|(_, s, e)| ranges_overlap(start, end, *s, *e))
        .map(|(_, s, e)| (s, e)))
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlapping leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    // Staff users may only file their own, always-pending requests.
    let (staff_id, status) = if auth.is_hr_or_admin() {
        (
            payload.staff_id,
            payload.status.unwrap_or(LeaveStatus::Pending),
        )
    } else {
        let own = auth
            .staff_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No staff profile"))?;
        if payload.staff_id != own {
            return Err(actix_web::error::ErrorForbidden(
                "Cannot file leave for another staff member",
            ));
        }
        (own, LeaveStatus::Pending)
    };

    // 1. validate dates
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    // 2. reject overlapping ranges
    let conflict = overlapping_leave(
        pool.get_ref(),
        staff_id,
        payload.start_date,
        payload.end_date,
        None,
    )
    .await
    .map_err(|e| {
        error!(error = %e, staff_id, "Overlap check failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some((start, end)) = conflict {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": format!("conflicts with an existing leave from {start} to {end}")
        })));
    }

    let approved_by = match status {
        LeaveStatus::Approved => Some(auth.username.as_str()),
        _ => None,
    };

    // 3. insert request
    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (staff_id, start_date, end_date, reason, status, approved_by)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(staff_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.as_deref())
    .bind(status)
    .bind(approved_by)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, staff_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request submitted",
        "status": status.to_string()
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'approved', approved_by = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(&auth.username)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'rejected', approved_by = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(&auth.username)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Reject leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave rejected"
    })))
}

/// Update a leave request (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave updated"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlapping leave")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let staff_id = sqlx::query_scalar::<_, u64>("SELECT staff_id FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(staff_id) = staff_id else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        })));
    };

    let conflict = overlapping_leave(
        pool.get_ref(),
        staff_id,
        payload.start_date,
        payload.end_date,
        Some(leave_id),
    )
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Overlap check failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some((start, end)) = conflict {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": format!("conflicts with an existing leave from {start} to {end}")
        })));
    }

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET start_date = ?, end_date = ?, reason = ?, status = ?, approved_by = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.as_deref())
    .bind(payload.status)
    .bind(&auth.username)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to update leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave updated"
    })))
}

/// Delete a leave request (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave deleted"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to delete leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave deleted"
    })))
}

/// Get a leave request by id
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, staff_id, start_date, end_date, reason, status, approved_by, created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        }))),
    }
}

/// List leave requests
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(staff_id) = query.staff_id {
        where_sql.push_str(" AND staff_id = ?");
        args.push(FilterValue::U64(staff_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND start_date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND end_date <= ?");
        args.push(FilterValue::Date(to));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, staff_id, start_date, end_date, reason, status, approved_by, created_at
        FROM leave_requests
        {}
        ORDER BY start_date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn touching_ranges_overlap() {
        assert!(ranges_overlap(d(2026, 1, 5), d(2026, 1, 9), d(2026, 1, 9), d(2026, 1, 12)));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(d(2026, 1, 5), d(2026, 1, 9), d(2026, 1, 10), d(2026, 1, 12)));
    }

    #[test]
    fn containment_overlaps() {
        assert!(ranges_overlap(d(2026, 1, 1), d(2026, 1, 31), d(2026, 1, 10), d(2026, 1, 12)));
        assert!(ranges_overlap(d(2026, 1, 10), d(2026, 1, 12), d(2026, 1, 1), d(2026, 1, 31)));
    }
}
