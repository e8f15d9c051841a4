use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// ISO weekdays, 1 = Monday .. 7 = Sunday.
pub const WEEKDAYS: RangeInclusive<i16> = 1..=7;

pub fn is_valid_weekday(weekday: i16) -> bool {
    WEEKDAYS.contains(&weekday)
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ClubRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// Normalized comma list, see [`crate::categories::normalize`].
    pub categories: String,
    pub slug: String,
    pub contact_name: String,
    pub contact_role: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_website: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_postal: String,
    pub address_city: String,
    pub address_country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct OpeningHourRow {
    pub id: Uuid,
    pub club_id: Uuid,
    /// 1 = Monday .. 7 = Sunday
    pub weekday: i16,
    pub opens_at: String,
    pub closes_at: String,
    pub note: String,
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: Uuid,
    pub club_id: Uuid,
    /// 1 = Monday .. 7 = Sunday
    pub weekday: i16,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub instructor: String,
    pub level: String,
    pub description: String,
    pub position: i32,
}

/// A club profile together with its opening hours and courses, as stored.
///
/// This is the unit the static site is generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub profile: ClubRow,
    pub opening_hours: Vec<OpeningHourRow>,
    pub courses: Vec<CourseRow>,
}

impl Club {
    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    pub fn slug(&self) -> &str {
        &self.profile.slug
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "build_task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BuildTaskStatus {
    Idle,
    Pending,
    Running,
}

impl BuildTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTaskStatus::Idle => "idle",
            BuildTaskStatus::Pending => "pending",
            BuildTaskStatus::Running => "running",
        }
    }
}

impl std::fmt::Display for BuildTaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BuildTaskRow {
    pub id: Uuid,
    pub task_key: String,
    pub status: BuildTaskStatus,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_event_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
