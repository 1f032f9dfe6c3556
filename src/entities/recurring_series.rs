//! Recurring series entity - A generator definition for repeated lessons.
//!
//! A series is not itself schedulable; it is expanded into concrete
//! `private_lessons` rows at creation time. Generated lessons point back via
//! `recurring_series_id`. Cancelling a series only deactivates it and
//! cancels its future unattended instances - the row is never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring lesson series database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_series")]
pub struct Model {
    /// Unique identifier for the series
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the attending student (weak reference)
    pub student_id: i64,
    /// Single instructor for every generated lesson (the simple path)
    pub teacher_id: i64,
    /// Enrollment propagated to every generated lesson (weak reference)
    pub enrollment_id: Option<i64>,
    /// Notes propagated to every generated lesson
    pub notes: Option<String>,
    /// Start of the first occurrence
    pub start_datetime: DateTimeUtc,
    /// Length of each occurrence in minutes
    pub duration_minutes: i32,
    /// Recurrence step: `"weekly"`, `"bi_weekly"` or `"monthly"`
    pub recurrence_pattern: String,
    /// Last occurrence date (inclusive); either bound may be set, neither is required
    pub end_date: Option<DateTimeUtc>,
    /// Maximum number of occurrences to generate
    pub max_occurrences: Option<i32>,
    /// False once the series has been cancelled
    pub is_active: bool,
    /// When the series was created
    pub created_at: DateTimeUtc,
}

/// Generated lessons point back at the series by plain id only; the series
/// does not own them
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
