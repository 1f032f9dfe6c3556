//! Lesson lifecycle business logic.
//!
//! Drives a single lesson through its states:
//! `scheduled -> attended` (terminal for credit purposes) and
//! `scheduled <-> cancelled` (reversible via reactivation). A cancelled
//! lesson must be reactivated before it can be attended.
//!
//! Credits are deducted only at attendance, never pre-reserved, so
//! cancellation has nothing to restore. Attendance is idempotent with
//! respect to deduction: the `is_attended` flip is a conditional update at
//! the store level, and only the call that wins the flip may deduct.

use crate::{
    core::enrollment,
    entities::{PrivateLesson, Student, Teacher, private_lesson},
    errors::{Error, Result},
    notify::{Actor, Notifier, broadcast_event},
};
use chrono::{Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{info, instrument, warn};

/// Booking kinds a lesson may carry.
pub const BOOKING_TYPES: [&str; 4] = ["private_lesson", "meeting", "training", "party"];

/// Tagged lifecycle state, projected from the persisted boolean pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    /// Initial state; the only state that allows cancellation or attendance
    Scheduled,
    /// Cancelled; reversible via reactivation
    Cancelled,
    /// Attended; terminal for credit purposes
    Attended,
}

/// Projects the stored `is_attended` / `is_cancelled` pair into the tagged
/// state. Attendance wins: the lifecycle never allows both flags at once,
/// but a row hand-edited into that shape still reads as attended.
#[must_use]
pub const fn lesson_status(lesson: &private_lesson::Model) -> LessonStatus {
    if lesson.is_attended {
        LessonStatus::Attended
    } else if lesson.is_cancelled {
        LessonStatus::Cancelled
    } else {
        LessonStatus::Scheduled
    }
}

/// Reads the instructor list of a lesson, migrating legacy rows on read.
///
/// Current rows store a JSON array in `teacher_ids`; legacy rows carry a
/// single `teacher_id` instead and are presented as a one-element list. The
/// stored row is never rewritten.
pub fn teacher_ids_of(lesson: &private_lesson::Model) -> Result<Vec<i64>> {
    match (&lesson.teacher_ids, lesson.teacher_id) {
        (Some(raw), _) => serde_json::from_str(raw).map_err(Into::into),
        (None, Some(single)) => Ok(vec![single]),
        (None, None) => Ok(Vec::new()),
    }
}

fn validate_booking_type(booking_type: &str) -> Result<()> {
    if BOOKING_TYPES.contains(&booking_type) {
        Ok(())
    } else {
        Err(Error::Validation {
            message: format!("unknown booking type: {booking_type:?}"),
        })
    }
}

/// Parameters for booking a new lesson.
#[derive(Debug, Clone)]
pub struct CreateLessonArgs {
    /// Attending student
    pub student_id: i64,
    /// Instructors; must be non-empty and every id must exist
    pub teacher_ids: Vec<i64>,
    /// When the lesson starts
    pub start_datetime: DateTimeUtc,
    /// Lesson length in minutes; must be positive
    pub duration_minutes: i32,
    /// One of [`BOOKING_TYPES`]
    pub booking_type: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Enrollment to charge on attendance, if any
    pub enrollment_id: Option<i64>,
    /// Series that generated this lesson, if any
    pub recurring_series_id: Option<i64>,
}

/// Partial update for an existing lesson. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateLessonArgs {
    /// Replacement instructor list
    pub teacher_ids: Option<Vec<i64>>,
    /// New start time; triggers an `end_datetime` recompute
    pub start_datetime: Option<DateTimeUtc>,
    /// New duration; triggers an `end_datetime` recompute
    pub duration_minutes: Option<i32>,
    /// New booking type
    pub booking_type: Option<String>,
    /// Replacement notes
    pub notes: Option<String>,
    /// Outer `Some` sets the field, inner `None` detaches the enrollment.
    /// Already-deducted credits are never moved retroactively.
    pub enrollment_id: Option<Option<i64>>,
}

/// Books a new lesson.
///
/// Validates the booking type, a non-empty instructor list, a positive
/// duration, and that the student and every instructor exist.
/// `end_datetime` is computed from the start and duration. Enrollment
/// credits are untouched at booking time.
#[instrument(skip(db, notifier, args, actor))]
pub async fn create_lesson(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    args: CreateLessonArgs,
    actor: &Actor,
) -> Result<private_lesson::Model> {
    validate_booking_type(&args.booking_type)?;
    if args.teacher_ids.is_empty() {
        return Err(Error::Validation {
            message: "lesson must reference at least one teacher".to_string(),
        });
    }
    if args.duration_minutes <= 0 {
        return Err(Error::Validation {
            message: format!("duration must be positive, got {}", args.duration_minutes),
        });
    }

    Student::find_by_id(args.student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: args.student_id.to_string(),
        })?;
    for teacher_id in &args.teacher_ids {
        Teacher::find_by_id(*teacher_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "teacher",
                id: teacher_id.to_string(),
            })?;
    }

    let now = Utc::now();
    let end = args.start_datetime + Duration::minutes(i64::from(args.duration_minutes));
    let lesson = private_lesson::ActiveModel {
        student_id: Set(args.student_id),
        teacher_ids: Set(Some(serde_json::to_string(&args.teacher_ids)?)),
        teacher_id: Set(None),
        start_datetime: Set(args.start_datetime),
        end_datetime: Set(end),
        duration_minutes: Set(args.duration_minutes),
        booking_type: Set(args.booking_type),
        notes: Set(args.notes),
        enrollment_id: Set(args.enrollment_id),
        is_attended: Set(false),
        is_cancelled: Set(false),
        cancellation_reason: Set(None),
        cancelled_by: Set(None),
        cancelled_at: Set(None),
        recurring_series_id: Set(args.recurring_series_id),
        created_at: Set(now),
        modified_at: Set(now),
        modified_by: Set(Some(actor.user_name.clone())),
        ..Default::default()
    };

    let result = lesson.insert(db).await?;
    broadcast_event(
        notifier,
        "lesson_created",
        json!({
            "lesson_id": result.id,
            "student_id": result.student_id,
            "start_datetime": result.start_datetime,
        }),
        actor,
    );
    Ok(result)
}

/// Finds a lesson by its unique ID, returning None if not found.
pub async fn get_lesson_by_id(
    db: &DatabaseConnection,
    lesson_id: i64,
) -> Result<Option<private_lesson::Model>> {
    PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all of a student's lessons in chronological order.
pub async fn get_lessons_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<private_lesson::Model>> {
    PrivateLesson::find()
        .filter(private_lesson::Column::StudentId.eq(student_id))
        .order_by_asc(private_lesson::Column::StartDatetime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a lesson.
///
/// Whenever the start time or duration changes, `end_datetime` is recomputed
/// from the new start and the newly supplied duration - or the previously
/// stored one, so duration is never silently dropped. Re-pointing
/// `enrollment_id` never moves credits that were already deducted.
#[instrument(skip(db, notifier, args, actor))]
pub async fn update_lesson(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    lesson_id: i64,
    args: UpdateLessonArgs,
    actor: &Actor,
) -> Result<private_lesson::Model> {
    let lesson = PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "lesson",
            id: lesson_id.to_string(),
        })?;

    if let Some(duration) = args.duration_minutes {
        if duration <= 0 {
            return Err(Error::Validation {
                message: format!("duration must be positive, got {duration}"),
            });
        }
    }
    if let Some(booking_type) = &args.booking_type {
        validate_booking_type(booking_type)?;
    }
    if let Some(teacher_ids) = &args.teacher_ids {
        if teacher_ids.is_empty() {
            return Err(Error::Validation {
                message: "lesson must reference at least one teacher".to_string(),
            });
        }
        for teacher_id in teacher_ids {
            Teacher::find_by_id(*teacher_id)
                .one(db)
                .await?
                .ok_or_else(|| Error::NotFound {
                    entity: "teacher",
                    id: teacher_id.to_string(),
                })?;
        }
    }

    let schedule_changed = args.start_datetime.is_some() || args.duration_minutes.is_some();
    let new_start = args.start_datetime.unwrap_or(lesson.start_datetime);
    let new_duration = args.duration_minutes.unwrap_or(lesson.duration_minutes);

    let mut active: private_lesson::ActiveModel = lesson.into();
    if let Some(teacher_ids) = args.teacher_ids {
        active.teacher_ids = Set(Some(serde_json::to_string(&teacher_ids)?));
        active.teacher_id = Set(None);
    }
    if let Some(start) = args.start_datetime {
        active.start_datetime = Set(start);
    }
    if let Some(duration) = args.duration_minutes {
        active.duration_minutes = Set(duration);
    }
    if schedule_changed {
        active.end_datetime = Set(new_start + Duration::minutes(i64::from(new_duration)));
    }
    if let Some(booking_type) = args.booking_type {
        active.booking_type = Set(booking_type);
    }
    if let Some(notes) = args.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(enrollment_id) = args.enrollment_id {
        active.enrollment_id = Set(enrollment_id);
    }
    active.modified_at = Set(Utc::now());
    active.modified_by = Set(Some(actor.user_name.clone()));

    let updated = active.update(db).await?;
    broadcast_event(
        notifier,
        "lesson_updated",
        json!({
            "lesson_id": updated.id,
            "student_id": updated.student_id,
            "start_datetime": updated.start_datetime,
        }),
        actor,
    );
    Ok(updated)
}

/// Cancels a scheduled lesson.
///
/// Allowed only from the scheduled state; cancelling an already-cancelled or
/// attended lesson fails with `InvalidState`. Enrollment credits are
/// untouched: a lesson that was never attended never consumed a credit, so
/// there is nothing to restore. The `notify_student` flag rides along in the
/// broadcast for the external notifier to act on.
#[instrument(skip(db, notifier, actor))]
pub async fn cancel_lesson(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    lesson_id: i64,
    reason: String,
    notify_student: bool,
    actor: &Actor,
) -> Result<private_lesson::Model> {
    let lesson = PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "lesson",
            id: lesson_id.to_string(),
        })?;

    match lesson_status(&lesson) {
        LessonStatus::Attended => Err(Error::InvalidState {
            message: format!("lesson {lesson_id} is already attended"),
        }),
        LessonStatus::Cancelled => Err(Error::InvalidState {
            message: format!("lesson {lesson_id} is already cancelled"),
        }),
        LessonStatus::Scheduled => {
            let now = Utc::now();
            let mut active: private_lesson::ActiveModel = lesson.into();
            active.is_cancelled = Set(true);
            active.cancellation_reason = Set(Some(reason));
            active.cancelled_by = Set(Some(actor.user_name.clone()));
            active.cancelled_at = Set(Some(now));
            active.modified_at = Set(now);
            active.modified_by = Set(Some(actor.user_name.clone()));

            let updated = active.update(db).await?;
            broadcast_event(
                notifier,
                "lesson_cancelled",
                json!({
                    "lesson_id": updated.id,
                    "student_id": updated.student_id,
                    "notify_student": notify_student,
                }),
                actor,
            );
            Ok(updated)
        }
    }
}

/// Reactivates a cancelled lesson back to the scheduled state.
///
/// Allowed only from the cancelled state. All cancellation fields are
/// cleared, restoring the lesson to a state indistinguishable from before
/// the cancellation (apart from the modification stamp).
#[instrument(skip(db, notifier, actor))]
pub async fn reactivate_lesson(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    lesson_id: i64,
    actor: &Actor,
) -> Result<private_lesson::Model> {
    let lesson = PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "lesson",
            id: lesson_id.to_string(),
        })?;

    if lesson_status(&lesson) != LessonStatus::Cancelled {
        return Err(Error::InvalidState {
            message: format!("lesson {lesson_id} is not cancelled"),
        });
    }

    let mut active: private_lesson::ActiveModel = lesson.into();
    active.is_cancelled = Set(false);
    active.cancellation_reason = Set(None);
    active.cancelled_by = Set(None);
    active.cancelled_at = Set(None);
    active.modified_at = Set(Utc::now());
    active.modified_by = Set(Some(actor.user_name.clone()));

    let updated = active.update(db).await?;
    broadcast_event(
        notifier,
        "lesson_reactivated",
        json!({
            "lesson_id": updated.id,
            "student_id": updated.student_id,
        }),
        actor,
    );
    Ok(updated)
}

/// Marks a lesson as attended, deducting at most one enrollment credit.
///
/// Attending from the cancelled state fails with `InvalidState`; attending
/// an already-attended lesson is a no-op that returns the current row
/// without touching the ledger, so retries can never double-charge.
///
/// The attendance flip itself is a conditional store-level update keyed on
/// `is_attended = false`; only the caller that wins the flip proceeds to the
/// atomic credit deduction. An exhausted enrollment still records the
/// attendance - the skipped deduction is logged, not raised.
#[instrument(skip(db, notifier, actor))]
pub async fn mark_attended(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    lesson_id: i64,
    actor: &Actor,
) -> Result<private_lesson::Model> {
    use sea_orm::sea_query::Expr;

    let lesson = PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "lesson",
            id: lesson_id.to_string(),
        })?;

    match lesson_status(&lesson) {
        LessonStatus::Cancelled => Err(Error::InvalidState {
            message: format!("lesson {lesson_id} is cancelled and must be reactivated first"),
        }),
        LessonStatus::Attended => Ok(lesson),
        LessonStatus::Scheduled => {
            let now = Utc::now();
            let txn = db.begin().await?;

            let flip = PrivateLesson::update_many()
                .col_expr(private_lesson::Column::IsAttended, Expr::value(true))
                .col_expr(private_lesson::Column::ModifiedAt, Expr::value(now))
                .col_expr(
                    private_lesson::Column::ModifiedBy,
                    Expr::value(Some(actor.user_name.clone())),
                )
                .filter(private_lesson::Column::Id.eq(lesson_id))
                .filter(private_lesson::Column::IsAttended.eq(false))
                .exec(&txn)
                .await?;

            let mut deducted = false;
            if flip.rows_affected == 1 {
                if let Some(enrollment_id) = lesson.enrollment_id {
                    match enrollment::deduct_credit_if_available(&txn, enrollment_id).await {
                        Ok(true) => deducted = true,
                        Ok(false) => info!(
                            "enrollment {enrollment_id} is exhausted; \
                             attendance of lesson {lesson_id} recorded without deduction"
                        ),
                        Err(Error::NotFound { .. }) => warn!(
                            "lesson {lesson_id} references missing enrollment {enrollment_id}; \
                             attendance recorded without deduction"
                        ),
                        Err(e) => return Err(e),
                    }
                }
            }

            txn.commit().await?;

            let updated = PrivateLesson::find_by_id(lesson_id)
                .one(db)
                .await?
                .ok_or_else(|| Error::NotFound {
                    entity: "lesson",
                    id: lesson_id.to_string(),
                })?;
            broadcast_event(
                notifier,
                "lesson_attended",
                json!({
                    "lesson_id": updated.id,
                    "student_id": updated.student_id,
                    "deducted_credit": deducted,
                }),
                actor,
            );
            Ok(updated)
        }
    }
}

/// Hard-deletes a lesson record.
///
/// This is the only hard-delete path for lessons; deleting a student,
/// teacher or enrollment never removes the lessons that reference them.
pub async fn delete_lesson(db: &DatabaseConnection, lesson_id: i64) -> Result<()> {
    let lesson = PrivateLesson::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "lesson",
            id: lesson_id.to_string(),
        })?;

    lesson.delete(db).await?;
    Ok(())
}
