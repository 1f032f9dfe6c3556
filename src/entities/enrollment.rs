//! Enrollment entity - A purchased bundle of lesson credits for one student.
//!
//! `remaining_lessons` is the credit balance and is mutated only by the
//! lesson lifecycle (attendance deduction). The central invariant of the
//! whole subsystem is `0 <= remaining_lessons <= total_lessons`.
//!
//! Legacy rows from the older "package" model may lack `program_name` and
//! `total_lessons`; both columns are nullable and are backfilled on read by
//! [`crate::core::enrollment::normalize`], never persisted back.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the student this bundle belongs to (weak reference)
    pub student_id: i64,
    /// Name of the purchased program; None on legacy "package" rows
    pub program_name: Option<String>,
    /// Number of lessons purchased, immutable after creation; None on legacy rows
    pub total_lessons: Option<i32>,
    /// Remaining lesson credits, deducted once per attended lesson
    pub remaining_lessons: i32,
    /// Total amount paid for this bundle in dollars
    pub total_paid: f64,
    /// Whether this enrollment still counts toward the student's balance
    pub is_active: bool,
    /// When the bundle was purchased
    pub purchase_date: DateTimeUtc,
    /// Optional expiry date for the credits
    pub expiry_date: Option<DateTimeUtc>,
}

/// Enrollments carry no owning relationships; lessons and payments point at
/// them by plain id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
