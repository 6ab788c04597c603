//! Flutter-facing FFI surface for DayPlan core.

pub mod api;
