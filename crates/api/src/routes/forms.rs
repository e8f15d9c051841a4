//! The club form on the admin dashboard: parsing submitted fields and
//! pre-filling rows from a stored club.

use infra::categories;
use infra::models::{is_valid_weekday, WEEKDAYS};
use infra::repos::{ClubUpdate, CourseInput, OpeningHourInput};
use infra::Club;

/// Blank course rows appended below the existing ones.
pub const COURSE_EXTRA_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const CATEGORY_OPTIONS: &[CategoryOption] = &[
    CategoryOption { value: "fitness", label: "Fitness" },
    CategoryOption { value: "kampfsport", label: "Kampfsport" },
    CategoryOption { value: "teamsport", label: "Teamsport" },
    CategoryOption { value: "yoga", label: "Yoga" },
    CategoryOption { value: "tanz", label: "Tanz" },
    CategoryOption { value: "outdoor", label: "Outdoor" },
    CategoryOption { value: "schwimmen", label: "Schwimmen" },
    CategoryOption { value: "gesundheit", label: "Gesundheit" },
];

/// Display label for a checkbox value; unknown values come back lowercased.
pub fn category_label(value: &str) -> String {
    let value = value.trim().to_lowercase();
    CATEGORY_OPTIONS
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label.to_string())
        .unwrap_or(value)
}

/// Stored category string from the checked boxes plus the free-text field.
pub fn categories_from_form(checked: &[&str], custom: &str) -> String {
    let mut selected: Vec<String> = checked
        .iter()
        .map(|value| category_label(value))
        .filter(|label| !label.is_empty())
        .collect();
    let custom = custom.trim();
    if !custom.is_empty() {
        selected.push(custom.to_string());
    }
    categories::normalize(&selected.join(", "))
}

/// Split a stored category string into checked option values and the rest.
pub fn category_selection(stored: &str) -> (Vec<&'static str>, String) {
    let mut checked = Vec::new();
    let mut custom = Vec::new();
    for item in categories::split(stored) {
        let lower = item.to_lowercase();
        match CATEGORY_OPTIONS.iter().find(|option| option.value == lower) {
            Some(option) => checked.push(option.value),
            None => custom.push(item),
        }
    }
    (checked, custom.join(", "))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningFormRow {
    pub day: i16,
    pub open: String,
    pub close: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFormRow {
    pub day: i16,
    pub title: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub instructor: String,
    pub level: String,
    pub description: String,
}

impl CourseFormRow {
    fn blank() -> Self {
        Self {
            day: 1,
            ..Default::default()
        }
    }

    fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.start,
            &self.end,
            &self.location,
            &self.instructor,
            &self.level,
            &self.description,
        ]
        .iter()
        .all(|value| value.trim().is_empty())
    }
}

/// Everything the dashboard form shows or submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubForm {
    pub club: ClubUpdate,
    pub opening_rows: Vec<OpeningFormRow>,
    pub course_rows: Vec<CourseFormRow>,
}

impl ClubForm {
    /// Pre-filled form for the owner's stored club, or an empty one.
    pub fn from_club(club: Option<&Club>) -> Self {
        let Some(club) = club else {
            return Self {
                club: ClubUpdate::default(),
                opening_rows: week_rows(|_| None),
                course_rows: blank_course_rows(),
            };
        };

        let opening_rows = week_rows(|day| {
            club.opening_hours
                .iter()
                .find(|hour| hour.weekday == day)
                .map(|hour| OpeningFormRow {
                    day,
                    open: hour.opens_at.clone(),
                    close: hour.closes_at.clone(),
                    note: hour.note.clone(),
                })
        });

        let mut course_rows: Vec<CourseFormRow> = club
            .courses
            .iter()
            .map(|course| CourseFormRow {
                day: course.weekday,
                title: course.title.clone(),
                start: course.start_time.clone(),
                end: course.end_time.clone(),
                location: course.location.clone(),
                instructor: course.instructor.clone(),
                level: course.level.clone(),
                description: course.description.clone(),
            })
            .collect();
        course_rows.extend(blank_course_rows());

        Self {
            club: ClubUpdate::from(&club.profile),
            opening_rows,
            course_rows,
        }
    }

    /// Parse a submitted form. Repeated fields are matched up by position.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let fields = Fields(pairs);

        let club = ClubUpdate {
            name: fields.first("name"),
            description: fields.first("description"),
            categories: categories_from_form(
                &fields.all("category"),
                &fields.first("category_custom"),
            ),
            contact_name: fields.first("contact_name"),
            contact_role: fields.first("contact_role"),
            contact_email: fields.first("contact_email"),
            contact_phone: fields.first("contact_phone"),
            contact_website: fields.first("contact_website"),
            address_line1: fields.first("address_line1"),
            address_line2: fields.first("address_line2"),
            address_postal: fields.first("address_postal"),
            address_city: fields.first("address_city"),
            address_country: fields.first("address_country"),
        };

        Self {
            club,
            opening_rows: opening_rows_from(&fields),
            course_rows: course_rows_from(&fields),
        }
    }

    pub fn opening_inputs(&self) -> Vec<OpeningHourInput> {
        self.opening_rows
            .iter()
            .map(|row| OpeningHourInput {
                weekday: row.day,
                opens_at: row.open.clone(),
                closes_at: row.close.clone(),
                note: row.note.clone(),
            })
            .collect()
    }

    /// Course rows with a title; the repo trims and validates the rest.
    pub fn course_inputs(&self) -> Vec<CourseInput> {
        self.course_rows
            .iter()
            .filter(|row| !row.title.trim().is_empty())
            .map(|row| CourseInput {
                weekday: row.day,
                title: row.title.clone(),
                start_time: row.start.clone(),
                end_time: row.end.clone(),
                location: row.location.clone(),
                instructor: row.instructor.clone(),
                level: row.level.clone(),
                description: row.description.clone(),
            })
            .collect()
    }
}

struct Fields<'a>(&'a [(String, String)]);

impl Fields<'_> {
    fn all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn first(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }
}

fn value_at(values: &[&str], index: usize) -> String {
    values.get(index).map(|value| value.to_string()).unwrap_or_default()
}

fn parse_day(value: &str, fallback: i16) -> i16 {
    match value.trim().parse::<i16>() {
        Ok(day) if is_valid_weekday(day) => day,
        _ => fallback,
    }
}

fn week_rows(mut row_for: impl FnMut(i16) -> Option<OpeningFormRow>) -> Vec<OpeningFormRow> {
    WEEKDAYS
        .map(|day| {
            row_for(day).unwrap_or(OpeningFormRow {
                day,
                ..Default::default()
            })
        })
        .collect()
}

fn blank_course_rows() -> Vec<CourseFormRow> {
    vec![CourseFormRow::blank(); COURSE_EXTRA_ROWS]
}

fn opening_rows_from(fields: &Fields<'_>) -> Vec<OpeningFormRow> {
    let days = fields.all("opening_day");
    if days.is_empty() {
        return week_rows(|_| None);
    }

    let opens = fields.all("opening_open");
    let closes = fields.all("opening_close");
    let notes = fields.all("opening_note");

    days.iter()
        .enumerate()
        .map(|(i, day)| OpeningFormRow {
            day: parse_day(day, i16::try_from(i + 1).unwrap_or(i16::MAX)),
            open: value_at(&opens, i),
            close: value_at(&closes, i),
            note: value_at(&notes, i),
        })
        .collect()
}

fn course_rows_from(fields: &Fields<'_>) -> Vec<CourseFormRow> {
    let titles = fields.all("course_title");
    let days = fields.all("course_day");
    let starts = fields.all("course_start");
    let ends = fields.all("course_end");
    let locations = fields.all("course_location");
    let instructors = fields.all("course_instructor");
    let levels = fields.all("course_level");
    let descriptions = fields.all("course_description");

    let count = [
        &titles,
        &days,
        &starts,
        &ends,
        &locations,
        &instructors,
        &levels,
        &descriptions,
    ]
    .iter()
    .map(|values| values.len())
    .max()
    .unwrap_or(0);

    let mut rows: Vec<CourseFormRow> = (0..count)
        .map(|i| CourseFormRow {
            day: parse_day(&value_at(&days, i), 1),
            title: value_at(&titles, i),
            start: value_at(&starts, i),
            end: value_at(&ends, i),
            location: value_at(&locations, i),
            instructor: value_at(&instructors, i),
            level: value_at(&levels, i),
            description: value_at(&descriptions, i),
        })
        .collect();

    while rows.last().is_some_and(CourseFormRow::is_empty) {
        rows.pop();
    }
    rows.extend(blank_course_rows());
    rows
}

#[cfg(test)]
mod tests {
    use infra::models::{ClubRow, CourseRow, OpeningHourRow};

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn categories_map_known_values_and_append_custom() {
        assert_eq!(
            categories_from_form(&["yoga", "Fitness", "yoga"], " Klettern "),
            "Yoga, Fitness, Klettern"
        );
        assert_eq!(categories_from_form(&[], "  "), "");
    }

    #[test]
    fn selection_splits_known_and_custom() {
        let (checked, custom) = category_selection("Yoga, Klettern, fitness, Boule");
        assert_eq!(checked, vec!["yoga", "fitness"]);
        assert_eq!(custom, "Klettern, Boule");
    }

    #[test]
    fn empty_form_has_week_and_blank_courses() {
        let form = ClubForm::from_pairs(&[]);
        assert_eq!(form.opening_rows.len(), 7);
        assert_eq!(form.opening_rows[6].day, 7);
        assert_eq!(form.course_rows.len(), COURSE_EXTRA_ROWS);
        assert!(form.course_inputs().is_empty());
    }

    #[test]
    fn opening_day_falls_back_to_position() {
        let form = ClubForm::from_pairs(&pairs(&[
            ("opening_day", "x"),
            ("opening_open", "09:00"),
            ("opening_day", "9"),
            ("opening_day", "5"),
            ("opening_close", "18:00"),
        ]));

        let days: Vec<i16> = form.opening_rows.iter().map(|row| row.day).collect();
        assert_eq!(days, vec![1, 2, 5]);
        assert_eq!(form.opening_rows[0].open, "09:00");
        assert_eq!(form.opening_rows[0].close, "18:00");
        assert_eq!(form.opening_rows[2].note, "");
    }

    #[test]
    fn course_rows_trim_trailing_blanks_and_skip_untitled() {
        let form = ClubForm::from_pairs(&pairs(&[
            ("course_title", "Yoga"),
            ("course_day", "3"),
            ("course_start", "18:00"),
            ("course_title", ""),
            ("course_day", "0"),
            ("course_start", "19:00"),
            ("course_title", ""),
            ("course_day", "1"),
            ("course_title", " "),
            ("course_day", "2"),
        ]));

        assert_eq!(form.course_rows.len(), 2 + COURSE_EXTRA_ROWS);
        assert_eq!(form.course_rows[1].day, 1);
        assert_eq!(form.course_rows[1].start, "19:00");

        let inputs = form.course_inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].weekday, 3);
        assert_eq!(inputs[0].title, "Yoga");
    }

    #[test]
    fn profile_fields_and_categories_are_read() {
        let form = ClubForm::from_pairs(&pairs(&[
            ("name", "SV Adler"),
            ("address_city", "Bremen"),
            ("category", "tanz"),
            ("category_custom", "Boule"),
        ]));
        assert_eq!(form.club.name, "SV Adler");
        assert_eq!(form.club.address_city, "Bremen");
        assert_eq!(form.club.categories, "Tanz, Boule");
    }

    #[test]
    fn from_club_fills_week_first_entry_wins() {
        let club = Club {
            profile: ClubRow {
                name: "SV Adler".into(),
                ..Default::default()
            },
            opening_hours: vec![
                OpeningHourRow {
                    weekday: 2,
                    opens_at: "08:00".into(),
                    ..Default::default()
                },
                OpeningHourRow {
                    weekday: 2,
                    opens_at: "12:00".into(),
                    ..Default::default()
                },
            ],
            courses: vec![CourseRow {
                weekday: 4,
                title: "Judo".into(),
                ..Default::default()
            }],
        };

        let form = ClubForm::from_club(Some(&club));

        assert_eq!(form.club.name, "SV Adler");
        assert_eq!(form.opening_rows.len(), 7);
        assert_eq!(form.opening_rows[1].open, "08:00");
        assert_eq!(form.opening_rows[0], OpeningFormRow { day: 1, ..Default::default() });
        assert_eq!(form.course_rows.len(), 1 + COURSE_EXTRA_ROWS);
        assert_eq!(form.course_rows[0].title, "Judo");
        assert_eq!(form.course_rows[1].day, 1);
    }
}
