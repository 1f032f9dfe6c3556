//! Private lesson entity - One scheduled session at the studio.
//!
//! The lifecycle state (scheduled / cancelled / attended) is persisted as the
//! `is_cancelled` / `is_attended` boolean pair for compatibility with the
//! document shapes older tooling expects; core logic works with the tagged
//! [`crate::core::lesson::LessonStatus`] projection instead.
//!
//! `teacher_ids` is a JSON array of teacher ids. Legacy rows carry a single
//! `teacher_id` instead; readers must go through
//! [`crate::core::lesson::teacher_ids_of`], which migrates the old shape
//! on read without writing it back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Private lesson database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "private_lessons")]
pub struct Model {
    /// Unique identifier for the lesson
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the attending student (weak reference)
    pub student_id: i64,
    /// JSON array of instructor ids, e.g. `"[3,7]"`; None on legacy rows
    pub teacher_ids: Option<String>,
    /// Legacy single-instructor column, read-migrated to `teacher_ids`
    pub teacher_id: Option<i64>,
    /// When the lesson starts
    pub start_datetime: DateTimeUtc,
    /// When the lesson ends; always `start_datetime + duration_minutes`
    pub end_datetime: DateTimeUtc,
    /// Lesson length in minutes
    pub duration_minutes: i32,
    /// Kind of booking: `"private_lesson"`, `"meeting"`, `"training"` or `"party"`
    pub booking_type: String,
    /// Free-form notes about the lesson
    pub notes: Option<String>,
    /// Enrollment whose credits this lesson consumes on attendance (weak reference)
    pub enrollment_id: Option<i64>,
    /// Whether the lesson was attended; set at most once, deducts at most one credit
    pub is_attended: bool,
    /// Whether the lesson is currently cancelled
    pub is_cancelled: bool,
    /// Why the lesson was cancelled
    pub cancellation_reason: Option<String>,
    /// Display name of whoever cancelled the lesson
    pub cancelled_by: Option<String>,
    /// When the lesson was cancelled
    pub cancelled_at: Option<DateTimeUtc>,
    /// Series that generated this lesson, if any (weak back-reference)
    pub recurring_series_id: Option<i64>,
    /// When the lesson record was created
    pub created_at: DateTimeUtc,
    /// When the lesson record was last modified
    pub modified_at: DateTimeUtc,
    /// Display name of whoever last modified the lesson
    pub modified_by: Option<String>,
}

/// Lessons reference students, teachers, enrollments and series by plain id
/// only; nothing owns them and they own nothing
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
