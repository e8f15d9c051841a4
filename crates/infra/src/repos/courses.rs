use sqlx::{PgConnection, PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::{is_valid_weekday, CourseRow};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseInput {
    pub weekday: i16,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub instructor: String,
    pub level: String,
    pub description: String,
}

impl CourseInput {
    /// Trimmed copy; courses without a title or with an invalid weekday are dropped.
    pub fn normalized(&self) -> Option<Self> {
        let title = self.title.trim();
        if title.is_empty() || !is_valid_weekday(self.weekday) {
            return None;
        }

        Some(Self {
            weekday: self.weekday,
            title: title.to_string(),
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
            location: self.location.trim().to_string(),
            instructor: self.instructor.trim().to_string(),
            level: self.level.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

/// Replace all courses of a club, keeping submission order in `position`.
pub async fn replace(
    conn: &mut PgConnection,
    club_id: Uuid,
    inputs: &[CourseInput],
) -> SqlxResult<Vec<CourseRow>> {
    sqlx::query("DELETE FROM courses WHERE club_id = $1")
        .bind(club_id)
        .execute(&mut *conn)
        .await?;

    let mut rows = Vec::new();
    for (position, input) in inputs.iter().filter_map(CourseInput::normalized).enumerate() {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            INSERT INTO courses (
                club_id, weekday, title, start_time, end_time,
                location, instructor, level, description, position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, club_id, weekday, title, start_time, end_time,
                      location, instructor, level, description, position
            "#,
        )
        .bind(club_id)
        .bind(input.weekday)
        .bind(&input.title)
        .bind(&input.start_time)
        .bind(&input.end_time)
        .bind(&input.location)
        .bind(&input.instructor)
        .bind(&input.level)
        .bind(&input.description)
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
) -> SqlxResult<Vec<CourseRow>> {
    sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, club_id, weekday, title, start_time, end_time,
               location, instructor, level, description, position
        FROM courses
        WHERE club_id = ANY($1)
        ORDER BY club_id, position
        "#,
    )
    .bind(club_ids)
    .fetch_all(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_dropped() {
        let course = CourseInput {
            weekday: 2,
            title: "   ".into(),
            start_time: "18:00".into(),
            ..Default::default()
        };
        assert_eq!(course.normalized(), None);
    }

    #[test]
    fn fields_are_trimmed() {
        let course = CourseInput {
            weekday: 3,
            title: " Yoga ".into(),
            start_time: " 9:00".into(),
            location: "Halle 1 ".into(),
            ..Default::default()
        };
        let normalized = course.normalized().unwrap();
        assert_eq!(normalized.title, "Yoga");
        assert_eq!(normalized.start_time, "9:00");
        assert_eq!(normalized.location, "Halle 1");
    }
}
