use sqlx::{PgConnection, PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::{is_valid_weekday, OpeningHourRow};

/// One opening-hours line as submitted by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningHourInput {
    pub weekday: i16,
    pub opens_at: String,
    pub closes_at: String,
    pub note: String,
}

impl OpeningHourInput {
    /// Trimmed copy, or `None` if the line would not be stored.
    pub fn normalized(&self) -> Option<Self> {
        let input = Self {
            weekday: self.weekday,
            opens_at: self.opens_at.trim().to_string(),
            closes_at: self.closes_at.trim().to_string(),
            note: self.note.trim().to_string(),
        };

        let blank = input.opens_at.is_empty() && input.closes_at.is_empty() && input.note.is_empty();
        if blank || !is_valid_weekday(input.weekday) {
            return None;
        }
        Some(input)
    }
}

/// Replace all opening hours of a club. Runs on the caller's connection so it
/// can join the profile save transaction.
pub async fn replace(
    conn: &mut PgConnection,
    club_id: Uuid,
    inputs: &[OpeningHourInput],
) -> SqlxResult<Vec<OpeningHourRow>> {
    sqlx::query("DELETE FROM opening_hours WHERE club_id = $1")
        .bind(club_id)
        .execute(&mut *conn)
        .await?;

    let mut rows = Vec::new();
    for (position, input) in inputs
        .iter()
        .filter_map(OpeningHourInput::normalized)
        .enumerate()
    {
        let row = sqlx::query_as::<_, OpeningHourRow>(
            r#"
            INSERT INTO opening_hours (club_id, weekday, opens_at, closes_at, note, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, club_id, weekday, opens_at, closes_at, note, position
            "#,
        )
        .bind(club_id)
        .bind(input.weekday)
        .bind(&input.opens_at)
        .bind(&input.closes_at)
        .bind(&input.note)
        .bind(position as i32)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }

    Ok(rows)
}

pub async fn list_for_clubs<'e>(
    executor: impl PgExecutor<'e>,
    club_ids: &[Uuid],
) -> SqlxResult<Vec<OpeningHourRow>> {
    sqlx::query_as::<_, OpeningHourRow>(
        r#"
        SELECT id, club_id, weekday, opens_at, closes_at, note, position
        FROM opening_hours
        WHERE club_id = ANY($1)
        ORDER BY club_id, weekday, position
        "#,
    )
    .bind(club_ids)
    .fetch_all(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(weekday: i16, opens_at: &str, closes_at: &str, note: &str) -> OpeningHourInput {
        OpeningHourInput {
            weekday,
            opens_at: opens_at.into(),
            closes_at: closes_at.into(),
            note: note.into(),
        }
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(input(1, " ", "", "  ").normalized(), None);
    }

    #[test]
    fn invalid_weekdays_are_dropped() {
        assert_eq!(input(0, "09:00", "", "").normalized(), None);
        assert_eq!(input(8, "09:00", "", "").normalized(), None);
    }

    #[test]
    fn note_alone_is_kept_and_trimmed() {
        assert_eq!(
            input(7, "", "", " closed ").normalized(),
            Some(input(7, "", "", "closed"))
        );
    }
}
