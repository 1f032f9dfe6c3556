//! Recurring series business logic - creation and cascade cancellation.
//!
//! Creating a series persists the generator definition and immediately
//! expands it into concrete lesson rows, in chronological order. Cancelling
//! a series deactivates the definition and cancels its future, unattended
//! instances; past or attended lessons are history and are never rewritten.

use crate::{
    core::expansion::{self, RecurrencePattern},
    entities::{PrivateLesson, RecurringSeries, Student, Teacher, private_lesson, recurring_series},
    errors::{Error, Result},
    notify::{Actor, Notifier, broadcast_event},
};
use chrono::{Duration, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde_json::json;
use tracing::{instrument, warn};

/// Parameters for defining a new recurring series.
#[derive(Debug, Clone)]
pub struct CreateSeriesArgs {
    /// Attending student
    pub student_id: i64,
    /// Single instructor applied to every generated lesson
    pub teacher_id: i64,
    /// Start of the first occurrence
    pub start_datetime: DateTimeUtc,
    /// Length of each occurrence in minutes; must be positive
    pub duration_minutes: i32,
    /// `"weekly"`, `"bi_weekly"` or `"monthly"`
    pub recurrence_pattern: String,
    /// Last occurrence date (inclusive); optional
    pub end_date: Option<DateTimeUtc>,
    /// Maximum number of occurrences; optional
    pub max_occurrences: Option<i32>,
    /// Notes propagated to every generated lesson
    pub notes: Option<String>,
    /// Enrollment propagated to every generated lesson
    pub enrollment_id: Option<i64>,
}

/// Creates a recurring series and expands it into concrete lessons.
///
/// The pattern string is validated before any expansion begins; an unknown
/// pattern is rejected with `Validation`. Generated lessons share the
/// student, the single-element instructor list, notes and enrollment, and
/// point back at the series via `recurring_series_id`. They are persisted in
/// chronological order, which is also the returned order. The series row and
/// every instance are written in one transaction, so a failed insert can
/// never leave an active series with a partial instance set.
#[instrument(skip(db, notifier, args, actor))]
pub async fn create_series(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    args: CreateSeriesArgs,
    actor: &Actor,
) -> Result<(recurring_series::Model, Vec<private_lesson::Model>)> {
    let pattern: RecurrencePattern = args.recurrence_pattern.parse()?;
    if args.duration_minutes <= 0 {
        return Err(Error::Validation {
            message: format!("duration must be positive, got {}", args.duration_minutes),
        });
    }
    if let Some(max) = args.max_occurrences {
        if max < 0 {
            return Err(Error::Validation {
                message: format!("max_occurrences must be non-negative, got {max}"),
            });
        }
    }

    Student::find_by_id(args.student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "student",
            id: args.student_id.to_string(),
        })?;
    Teacher::find_by_id(args.teacher_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "teacher",
            id: args.teacher_id.to_string(),
        })?;

    let now = Utc::now();
    let txn = db.begin().await?;
    let series = recurring_series::ActiveModel {
        student_id: Set(args.student_id),
        teacher_id: Set(args.teacher_id),
        enrollment_id: Set(args.enrollment_id),
        notes: Set(args.notes.clone()),
        start_datetime: Set(args.start_datetime),
        duration_minutes: Set(args.duration_minutes),
        recurrence_pattern: Set(pattern.as_str().to_string()),
        end_date: Set(args.end_date),
        max_occurrences: Set(args.max_occurrences),
        is_active: Set(true),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let occurrences = expansion::expand_occurrences(
        args.start_datetime,
        pattern,
        args.end_date,
        args.max_occurrences.and_then(|m| u32::try_from(m).ok()),
    );

    let teacher_ids_json = serde_json::to_string(&[args.teacher_id])?;
    let mut lessons = Vec::with_capacity(occurrences.len());
    for start in occurrences {
        let lesson = private_lesson::ActiveModel {
            student_id: Set(args.student_id),
            teacher_ids: Set(Some(teacher_ids_json.clone())),
            teacher_id: Set(None),
            start_datetime: Set(start),
            end_datetime: Set(start + Duration::minutes(i64::from(args.duration_minutes))),
            duration_minutes: Set(args.duration_minutes),
            booking_type: Set("private_lesson".to_string()),
            notes: Set(args.notes.clone()),
            enrollment_id: Set(args.enrollment_id),
            is_attended: Set(false),
            is_cancelled: Set(false),
            cancellation_reason: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            recurring_series_id: Set(Some(series.id)),
            created_at: Set(now),
            modified_at: Set(now),
            modified_by: Set(Some(actor.user_name.clone())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        lessons.push(lesson);
    }

    txn.commit().await?;

    broadcast_event(
        notifier,
        "series_created",
        json!({
            "series_id": series.id,
            "student_id": series.student_id,
            "instance_count": lessons.len(),
        }),
        actor,
    );
    Ok((series, lessons))
}

/// Finds a series by its unique ID, returning None if not found.
pub async fn get_series_by_id(
    db: &DatabaseConnection,
    series_id: i64,
) -> Result<Option<recurring_series::Model>> {
    RecurringSeries::find_by_id(series_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Cancels a series: deactivates the definition and cancels its future,
/// unattended instances.
///
/// Only lessons starting today or later (cutoff is the start of the current
/// UTC day, not the current instant) that are neither attended nor already
/// cancelled are touched; history is never rewritten. Each instance is
/// cancelled with its own conditional update, so a lesson that fails or is
/// concurrently edited is skipped rather than aborting the batch. Returns
/// the number of lessons actually cancelled. Cancelling an already-inactive
/// series is not an error; the cutoff query simply finds little left to do.
#[instrument(skip(db, notifier, actor))]
pub async fn cancel_series(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    series_id: i64,
    reason: String,
    actor: &Actor,
) -> Result<u64> {
    use sea_orm::sea_query::Expr;

    let series = RecurringSeries::find_by_id(series_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "series",
            id: series_id.to_string(),
        })?;

    let mut active: recurring_series::ActiveModel = series.into();
    active.is_active = Set(false);
    active.update(db).await?;

    let today_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let candidates = PrivateLesson::find()
        .filter(private_lesson::Column::RecurringSeriesId.eq(series_id))
        .filter(private_lesson::Column::StartDatetime.gte(today_start))
        .filter(private_lesson::Column::IsAttended.eq(false))
        .filter(private_lesson::Column::IsCancelled.eq(false))
        .order_by_asc(private_lesson::Column::StartDatetime)
        .all(db)
        .await?;

    let now = Utc::now();
    let mut cancelled = 0u64;
    for lesson in candidates {
        let result = PrivateLesson::update_many()
            .col_expr(private_lesson::Column::IsCancelled, Expr::value(true))
            .col_expr(
                private_lesson::Column::CancellationReason,
                Expr::value(Some(reason.clone())),
            )
            .col_expr(
                private_lesson::Column::CancelledBy,
                Expr::value(Some(actor.user_name.clone())),
            )
            .col_expr(private_lesson::Column::CancelledAt, Expr::value(Some(now)))
            .col_expr(private_lesson::Column::ModifiedAt, Expr::value(now))
            .col_expr(
                private_lesson::Column::ModifiedBy,
                Expr::value(Some(actor.user_name.clone())),
            )
            .filter(private_lesson::Column::Id.eq(lesson.id))
            .filter(private_lesson::Column::IsCancelled.eq(false))
            .filter(private_lesson::Column::IsAttended.eq(false))
            .exec(db)
            .await;

        // Best-effort across the batch: one bad instance never aborts the rest.
        match result {
            Ok(r) => cancelled += r.rows_affected,
            Err(e) => warn!(
                "failed to cancel lesson {} of series {series_id}: {e}",
                lesson.id
            ),
        }
    }

    broadcast_event(
        notifier,
        "series_cancelled",
        json!({
            "series_id": series_id,
            "cancelled_count": cancelled,
        }),
        actor,
    );
    Ok(cancelled)
}
