//! Shift-window engine: resolving which shift an event clocks against,
//! validating the clock time, and computing incidence minutes.
//!
//! Everything in here is a pure function over `chrono` clock times so the
//! HTTP handlers can share one rule set. Persistence stays in the store layer.

pub mod catalog;
mod engine_tests;
pub mod incidence;
pub mod resolver;
pub mod validator;

pub use catalog::{ShiftWindow, window};
pub use incidence::{FULL_SHIFT_HOURS, Incidence, incidence, worked_minutes};
pub use resolver::{Resolution, bucket, resolve};
pub use validator::{Verdict, validate};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Work pattern assigned to a staff member by an administrator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Full,
    Double,
}

/// Concrete shift resolved for one event. `double` staff always land on
/// morning or afternoon; `full` staff always land on full.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ShiftInstance {
    Morning,
    Afternoon,
    Full,
}

/// Whether an event is a check-in or a check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordKind {
    Entry,
    Exit,
}
