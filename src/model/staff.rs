use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::shift::ShiftType;

/// Personnel category, used only for filtering and reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StaffKind {
    Teaching,
    Administrative,
    Custodial,
    Counseling,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "Maria Lopez",
        "national_id": "0912345678",
        "phone": "0998765432",
        "email": "maria.lopez@school.edu",
        "shift_type": "morning",
        "staff_kind": "teaching",
        "active": true
    })
)]
pub struct Staff {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Maria Lopez")]
    pub full_name: String,

    #[schema(example = "0912345678")]
    pub national_id: String,

    #[schema(example = "0998765432")]
    pub phone: String,

    #[schema(example = "maria.lopez@school.edu")]
    pub email: String,

    #[schema(example = "morning")]
    pub shift_type: ShiftType,

    #[schema(example = "teaching")]
    pub staff_kind: StaffKind,

    #[schema(example = true)]
    pub active: bool,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
