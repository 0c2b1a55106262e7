use crate::{
    auth::auth::AuthUser,
    model::staff::{Staff, StaffKind},
    shift::ShiftType,
    utils::db_utils::{build_update_sql, execute_update},
    utils::{staff_cache, staff_cache::CachedStaff, staff_filter},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateStaff {
    #[schema(example = "Maria Lopez")]
    pub full_name: String,
    #[schema(example = "0912345678")]
    pub national_id: String,
    #[schema(example = "0998765432")]
    pub phone: String,
    #[schema(example = "maria.lopez@school.edu", format = "email")]
    pub email: String,
    #[schema(example = "morning")]
    pub shift_type: ShiftType,
    #[schema(example = "teaching")]
    pub staff_kind: StaffKind,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub shift_type: Option<ShiftType>,
    pub staff_kind: Option<StaffKind>,
    pub active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StaffListResponse {
    pub data: Vec<Staff>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Bool(bool),
}

fn validate_new_staff(payload: &CreateStaff) -> Result<(), String> {
    if payload.full_name.trim().is_empty() {
        return Err("full_name must not be empty".to_string());
    }
    if payload.national_id.len() != 10 || !payload.national_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid national id ({})", payload.national_id));
    }
    if !(7..=10).contains(&payload.phone.len()) || !payload.phone.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(format!("invalid phone number ({})", payload.phone));
    }
    if !payload.email.contains('@') || !payload.email.contains('.') {
        return Err(format!("invalid email ({})", payload.email));
    }
    Ok(())
}

/// Create a staff member
#[utoipa::path(
    post,
    path = "/api/v1/staff",
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff member created", body = Object, example = json!({
            "message": "Staff member registered",
            "id": 1
        })),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Duplicate national id or email"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_staff(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateStaff>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if let Err(message) = validate_new_staff(&payload) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": message })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO staff
        (full_name, national_id, phone, email, shift_type, staff_kind)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.full_name.trim())
    .bind(&payload.national_id)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(payload.shift_type)
    .bind(payload.staff_kind)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_id();

            // Keep the scan fast path aware of the new id.
            staff_filter::insert(id);
            staff_cache::put(
                id,
                CachedStaff {
                    full_name: payload.full_name.trim().to_string(),
                    shift_type: payload.shift_type,
                    active: true,
                },
            )
            .await;

            Ok(HttpResponse::Created().json(json!({
                "message": "Staff member registered",
                "id": id
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "A staff member with this national id or email already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to create staff member");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/staff",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("shift_type" = Option<String>, Query, description = "Filter by assigned shift"),
        ("staff_kind" = Option<String>, Query, description = "Filter by personnel category"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search by name or email")
    ),
    responses(
        (status = 200, description = "Paginated staff list", body = StaffListResponse)
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_staff(
    pool: web::Data<MySqlPool>,
    query: web::Query<StaffQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(shift_type) = query.shift_type {
        conditions.push("shift_type = ?");
        bindings.push(FilterValue::Str(shift_type.to_string()));
    }

    if let Some(staff_kind) = query.staff_kind {
        conditions.push("staff_kind = ?");
        bindings.push(FilterValue::Str(staff_kind.to_string()));
    }

    if let Some(active) = query.active {
        conditions.push("active = ?");
        bindings.push(FilterValue::Bool(active));
    }

    if let Some(search) = &query.search {
        conditions.push("(full_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM staff {}", where_clause);
    debug!(sql = %count_sql, "Counting staff");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Str(v) => count_query.bind(v),
            FilterValue::Bool(v) => count_query.bind(*v),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count staff");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM staff {} ORDER BY full_name LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching staff");

    let mut data_query = sqlx::query_as::<_, Staff>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::Str(v) => data_query.bind(v),
            FilterValue::Bool(v) => data_query.bind(*v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let staff = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch staff");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(StaffListResponse {
        data: staff,
        page,
        per_page,
        total,
    }))
}

/// Get a staff member by ID
#[utoipa::path(
    get,
    path = "/api/v1/staff/{staff_id}",
    params(
        ("staff_id" = u64, Path, description = "Staff ID")
    ),
    responses(
        (status = 200, description = "Staff member found", body = Staff),
        (status = 404, description = "Staff member not found", body = Object, example = json!({
            "message": "Staff member not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_staff(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let staff_id = path.into_inner();

    let staff = sqlx::query_as::<_, Staff>(
        r#"
        SELECT id, full_name, national_id, phone, email, shift_type, staff_kind,
               active, created_at, updated_at
        FROM staff
        WHERE id = ?
        "#,
    )
    .bind(staff_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, staff_id, "Failed to fetch staff member");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match staff {
        Some(member) => Ok(HttpResponse::Ok().json(member)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff member not found"
        }))),
    }
}

/// Update a staff member
#[utoipa::path(
    put,
    path = "/api/v1/staff/{staff_id}",
    params(
        ("staff_id" = u64, Path, description = "Staff ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Staff member updated"),
        (status = 404, description = "Staff member not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_staff(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let staff_id = path.into_inner();

    let update = build_update_sql("staff", &body, "id", staff_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Staff member not found"));
    }

    // Shift or active flag may have changed; force the next scan to re-read.
    staff_cache::evict(staff_id as u64).await;

    Ok(HttpResponse::Ok().body("Staff member updated"))
}

/// Delete a staff member (attendance and leave rows cascade)
#[utoipa::path(
    delete,
    path = "/api/v1/staff/{staff_id}",
    params(
        ("staff_id" = u64, Path, description = "Staff ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Staff member not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_staff(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let staff_id = path.into_inner();

    let result = sqlx::query(r#"DELETE FROM staff WHERE id = ?"#)
        .bind(staff_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Staff member not found"
                })));
            }

            staff_filter::remove(staff_id);
            staff_cache::evict(staff_id).await;

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, staff_id, "Failed to delete staff member");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

async fn set_active(
    pool: &MySqlPool,
    staff_id: u64,
    active: bool,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query("UPDATE staff SET active = ? WHERE id = ?")
        .bind(active)
        .bind(staff_id)
        .execute(pool)
        .await
        .map_err(|e| {
            error!(error = %e, staff_id, "Failed to update active flag");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Staff member not found"
        })));
    }

    staff_cache::evict(staff_id).await;

    let message = if active {
        "Staff member reactivated"
    } else {
        "Staff member deactivated"
    };
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/// Deactivate a staff member without deleting history
#[utoipa::path(
    post,
    path = "/api/v1/staff/{staff_id}/deactivate",
    params(
        ("staff_id" = u64, Path, description = "Staff ID")
    ),
    responses(
        (status = 200, description = "Staff member deactivated"),
        (status = 404, description = "Staff member not found")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_staff(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    set_active(pool.get_ref(), path.into_inner(), false).await
}

/// Reactivate a staff member
#[utoipa::path(
    post,
    path = "/api/v1/staff/{staff_id}/reactivate",
    params(
        ("staff_id" = u64, Path, description = "Staff ID")
    ),
    responses(
        (status = 200, description = "Staff member reactivated"),
        (status = 404, description = "Staff member not found")
    ),
    tag = "Staff",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reactivate_staff(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    set_active(pool.get_ref(), path.into_inner(), true).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateStaff {
        CreateStaff {
            full_name: "Maria Lopez".to_string(),
            national_id: "0912345678".to_string(),
            phone: "0998765432".to_string(),
            email: "maria.lopez@school.edu".to_string(),
            shift_type: ShiftType::Morning,
            staff_kind: StaffKind::Teaching,
        }
    }

    #[test]
    fn accepts_a_well_formed_payload() {
        assert!(validate_new_staff(&payload()).is_ok());
    }

    #[test]
    fn rejects_bad_national_id() {
        let mut p = payload();
        p.national_id = "12345".to_string();
        assert!(validate_new_staff(&p).is_err());

        p.national_id = "09123456ab".to_string();
        assert!(validate_new_staff(&p).is_err());
    }

    #[test]
    fn rejects_bad_phone_and_email() {
        let mut p = payload();
        p.phone = "123".to_string();
        assert!(validate_new_staff(&p).is_err());

        let mut p = payload();
        p.email = "not-an-email".to_string();
        assert!(validate_new_staff(&p).is_err());
    }
}
