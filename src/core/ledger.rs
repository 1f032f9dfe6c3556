//! Student ledger aggregation - read-only financial/credit view.
//!
//! Joins a student's enrollments, payments and lessons into one composite
//! snapshot with derived totals. This is a pure projection: it never mutates
//! the store, and every total is recomputed on each call so the view is
//! always consistent with the latest lifecycle mutations, at the cost of
//! O(enrollments + payments + lessons) work per call.

use crate::{
    core::enrollment::{self, NormalizedEnrollment},
    core::{lesson, payment, student},
    entities::{payment as payment_entity, private_lesson, student as student_entity},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

/// Composite, read-only view of one student's scheduling and billing state.
#[derive(Debug, Clone)]
pub struct StudentLedger {
    /// The student record itself
    pub student: student_entity::Model,
    /// All enrollments, legacy rows normalized, oldest purchase first
    pub enrollments: Vec<NormalizedEnrollment>,
    /// All payments, most recent first
    pub payments: Vec<payment_entity::Model>,
    /// Lessons starting now or later that are not cancelled, ascending
    pub upcoming_lessons: Vec<private_lesson::Model>,
    /// Lessons that have already started, cancelled or not, most recent first
    pub lesson_history: Vec<private_lesson::Model>,
    /// Sum of all payment amounts
    pub total_paid: f64,
    /// Sum of `total_lessons` across all enrollments
    pub total_enrolled_lessons: i64,
    /// Sum of `remaining_lessons` across active enrollments only
    pub remaining_lessons: i64,
    /// Number of attended lessons in the history
    pub lessons_taken: usize,
}

/// Assembles the ledger view for one student.
///
/// Fails with `NotFound` if the student does not exist. A cancelled future
/// lesson appears in neither list: it is not upcoming, and it is not yet
/// history. Past lessons stay in the history whether or not they were
/// cancelled - the history shows what was scheduled.
pub async fn get_student_ledger(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<StudentLedger> {
    let student = student::get_student_by_id(db, student_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: student_id.to_string(),
        })?;

    let enrollments = enrollment::get_enrollments_for_student(db, student_id).await?;
    let payments = payment::get_payments_for_student(db, student_id).await?;
    let lessons = lesson::get_lessons_for_student(db, student_id).await?;

    let now = Utc::now();
    let mut upcoming_lessons = Vec::new();
    let mut lesson_history = Vec::new();
    for lesson in lessons {
        if lesson.start_datetime < now {
            lesson_history.push(lesson);
        } else if !lesson.is_cancelled {
            upcoming_lessons.push(lesson);
        }
    }
    // Fetched ascending; history reads most recent first.
    lesson_history.reverse();

    let total_paid = payments.iter().map(|p| p.amount).sum();
    let total_enrolled_lessons = enrollments
        .iter()
        .map(|e| i64::from(e.total_lessons))
        .sum();
    let remaining_lessons = enrollments
        .iter()
        .filter(|e| e.is_active)
        .map(|e| i64::from(e.remaining_lessons))
        .sum();
    let lessons_taken = lesson_history.iter().filter(|l| l.is_attended).count();

    Ok(StudentLedger {
        student,
        enrollments,
        payments,
        upcoming_lessons,
        lesson_history,
        total_paid,
        total_enrolled_lessons,
        remaining_lessons,
        lessons_taken,
    })
}
