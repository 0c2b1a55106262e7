pub mod attendance;

pub use attendance::{AttendanceStore, NewEntry, StoreError};
