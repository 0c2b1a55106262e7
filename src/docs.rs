use crate::api::attendance::{
    BulkImportResult, DeviceSyncEvent, ScanEvent, ScanOutcome, SyncParams,
};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, UpdateLeave};
use crate::api::reports::{
    AbsenceRow, DailyRow, DashboardSummary, IncidenceSummary, MonthlySummary, RankingEntry,
    ShiftCount, StatusCount,
};
use crate::api::staff::{CreateStaff, StaffListResponse, StaffQuery};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::staff::{Staff, StaffKind};
use crate::shift::{Incidence, RecordKind, ShiftInstance, ShiftType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staff Attendance Management API",
        version = "1.0.0",
        description = r#"
## Staff Attendance & Leave Management

This API powers the attendance and leave tracking system of a school or
similar institution.

### Key Features
- **Staff Management**
  - Register, update, list, deactivate and remove staff members
- **Attendance**
  - QR scan check-in/out, offline scanner sync, geolocated device sync,
    and bulk import of scan batches
  - Shift-window validation with tardiness tolerance per shift
    (morning / afternoon / full / double)
- **Leave Management**
  - File, approve, reject and track leave requests with overlap protection
- **Reports**
  - Lateness and early-departure incidences, daily sheets, unjustified
    absences, monthly summaries and a dashboard

### Security
Endpoints under the API prefix require **JWT Bearer authentication**.
Staff administration and approvals are restricted to **Admin** or **HR**
roles.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::scan,
        crate::api::attendance::sync,
        crate::api::attendance::device_sync,
        crate::api::attendance::import,
        crate::api::attendance::my_attendance,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::staff::create_staff,
        crate::api::staff::get_staff,
        crate::api::staff::list_staff,
        crate::api::staff::update_staff,
        crate::api::staff::delete_staff,
        crate::api::staff::deactivate_staff,
        crate::api::staff::reactivate_staff,

        crate::api::reports::incidences,
        crate::api::reports::daily,
        crate::api::reports::absences,
        crate::api::reports::monthly,
        crate::api::reports::dashboard
    ),
    components(
        schemas(
            ScanEvent,
            SyncParams,
            DeviceSyncEvent,
            ScanOutcome,
            BulkImportResult,
            AttendanceRecord,
            AttendanceStatus,
            ShiftType,
            ShiftInstance,
            RecordKind,
            Incidence,
            CreateLeave,
            UpdateLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRequest,
            LeaveStatus,
            CreateStaff,
            StaffQuery,
            StaffListResponse,
            Staff,
            StaffKind,
            IncidenceSummary,
            DailyRow,
            AbsenceRow,
            MonthlySummary,
            DashboardSummary,
            StatusCount,
            ShiftCount,
            RankingEntry
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance registration APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Staff", description = "Staff management APIs"),
        (name = "Reports", description = "Reporting and dashboard APIs"),
    )
)]
pub struct ApiDoc;
