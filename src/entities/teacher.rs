//! Teacher entity - Represents an instructor at the studio.
//!
//! Lessons reference teachers through a list of ids (multi-instructor
//! support); legacy lesson rows may instead carry a single `teacher_id`.
//! Either way the reference is weak and never enforced by the store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teacher database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    /// Unique identifier for the teacher
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Teacher's first name
    pub first_name: String,
    /// Teacher's last name
    pub last_name: String,
    /// Contact email address
    pub email: Option<String>,
    /// Comma-separated dance specialties (e.g. `"ballet,salsa"`)
    pub specialties: Option<String>,
    /// Whether the teacher currently takes bookings
    pub is_active: bool,
    /// When the teacher record was created
    pub created_at: DateTimeUtc,
}

/// Teachers carry no owning relationships; all references to them are weak
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
