//! Render-ready view of a club: opening hours for every weekday and courses
//! grouped by day and time slot.

use std::cmp::Ordering;
use std::collections::HashMap;

use infra::categories;
use infra::models::{is_valid_weekday, CourseRow, OpeningHourRow, WEEKDAYS};
use infra::Club;

use crate::i18n::{Labels, BY_ARRANGEMENT};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningHourView {
    pub weekday: i16,
    pub day: String,
    pub opens_at: String,
    pub closes_at: String,
    pub note: String,
}

impl OpeningHourView {
    pub fn is_empty(&self) -> bool {
        self.opens_at.is_empty() && self.closes_at.is_empty() && self.note.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseView {
    pub title: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub instructor: String,
    pub level: String,
    pub description: String,
}

/// Courses sharing the same start and end time on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub time: String,
    pub courses: Vec<CourseView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDay {
    pub weekday: i16,
    pub day: String,
    pub slots: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubView {
    pub name: String,
    pub description: String,
    pub slug: String,
    pub categories: Vec<String>,
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
    pub opening_hours: Vec<OpeningHourView>,
    pub has_opening_hours: bool,
    pub schedule: Vec<ScheduleDay>,
    pub has_schedule: bool,
    pub has_contact: bool,
    pub has_address: bool,
}

pub fn club_view(club: &Club, labels: &Labels) -> ClubView {
    let profile = &club.profile;
    let (opening_hours, has_opening_hours) = opening_hours(&club.opening_hours, labels);
    let schedule = schedule(&club.courses, labels);

    let has_contact = [
        &profile.contact_name,
        &profile.contact_role,
        &profile.contact_email,
        &profile.contact_phone,
        &profile.contact_website,
    ]
    .iter()
    .any(|field| !field.trim().is_empty());

    let has_address = [
        &profile.address_line1,
        &profile.address_line2,
        &profile.address_postal,
        &profile.address_city,
        &profile.address_country,
    ]
    .iter()
    .any(|field| !field.trim().is_empty());

    ClubView {
        name: profile.name.clone(),
        description: profile.description.clone(),
        slug: profile.slug.clone(),
        categories: categories::split(&profile.categories),
        contact_name: profile.contact_name.clone(),
        contact_role: profile.contact_role.clone(),
        contact_email: profile.contact_email.clone(),
        contact_phone: profile.contact_phone.clone(),
        contact_website: profile.contact_website.clone(),
        address_line1: profile.address_line1.clone(),
        address_line2: profile.address_line2.clone(),
        address_postal: profile.address_postal.clone(),
        address_city: profile.address_city.clone(),
        address_country: profile.address_country.clone(),
        opening_hours,
        has_opening_hours,
        has_schedule: !schedule.is_empty(),
        schedule,
        has_contact,
        has_address,
    }
}

/// Exactly seven entries, Monday first. The first row per weekday wins and
/// days without a row get an empty placeholder.
///
/// The flag is true when any entry carries an opening, closing time or note.
pub fn opening_hours(hours: &[OpeningHourRow], labels: &Labels) -> (Vec<OpeningHourView>, bool) {
    let mut by_day: HashMap<i16, &OpeningHourRow> = HashMap::new();
    for hour in hours.iter().filter(|hour| is_valid_weekday(hour.weekday)) {
        by_day.entry(hour.weekday).or_insert(hour);
    }

    let entries: Vec<OpeningHourView> = WEEKDAYS
        .map(|weekday| {
            let hour = by_day.get(&weekday).copied();
            let trimmed = |value: Option<&String>| {
                value.map(|v| v.trim().to_string()).unwrap_or_default()
            };
            OpeningHourView {
                weekday,
                day: labels.weekday(weekday),
                opens_at: trimmed(hour.map(|h| &h.opens_at)),
                closes_at: trimmed(hour.map(|h| &h.closes_at)),
                note: trimmed(hour.map(|h| &h.note)),
            }
        })
        .collect();

    let has_any = entries.iter().any(|entry| !entry.is_empty());
    (entries, has_any)
}

/// Zero-pad `H:MM` to `HH:MM` so times compare as strings.
pub fn time_key(value: &str) -> String {
    let value = value.trim();
    if value.len() == 4 && value.contains(':') {
        format!("0{value}")
    } else {
        value.to_string()
    }
}

/// `start - end`, whichever side is present, or the "by arrangement" label.
pub fn format_time_range(start: &str, end: &str, labels: &Labels) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => labels.text(BY_ARRANGEMENT).to_string(),
        (start, "") => start.to_string(),
        ("", end) => end.to_string(),
        (start, end) => format!("{start} - {end}"),
    }
}

fn course_order(a: &CourseRow, b: &CourseRow) -> Ordering {
    a.weekday
        .cmp(&b.weekday)
        .then_with(|| time_key(&a.start_time).cmp(&time_key(&b.start_time)))
        .then_with(|| time_key(&a.end_time).cmp(&time_key(&b.end_time)))
        .then_with(|| a.title.cmp(&b.title))
}

/// Courses sorted by weekday, start, end and title, grouped into days and
/// slots. Courses with an invalid weekday are left out.
pub fn schedule(courses: &[CourseRow], labels: &Labels) -> Vec<ScheduleDay> {
    let mut sorted: Vec<&CourseRow> = courses
        .iter()
        .filter(|course| is_valid_weekday(course.weekday))
        .collect();
    sorted.sort_by(|a, b| course_order(a, b));

    let mut days: Vec<ScheduleDay> = Vec::new();
    let mut slot_key: Option<(String, String)> = None;

    for course in sorted {
        let key = (time_key(&course.start_time), time_key(&course.end_time));

        if days.last().map(|day| day.weekday) != Some(course.weekday) {
            days.push(ScheduleDay {
                weekday: course.weekday,
                day: labels.weekday(course.weekday),
                slots: Vec::new(),
            });
            slot_key = None;
        }
        let Some(day) = days.last_mut() else {
            continue;
        };

        if slot_key.as_ref() != Some(&key) {
            day.slots.push(ScheduleSlot {
                time: format_time_range(&course.start_time, &course.end_time, labels),
                courses: Vec::new(),
            });
            slot_key = Some(key);
        }
        if let Some(slot) = day.slots.last_mut() {
            slot.courses.push(CourseView {
                title: course.title.clone(),
                start: course.start_time.clone(),
                end: course.end_time.clone(),
                location: course.location.clone(),
                instructor: course.instructor.clone(),
                level: course.level.clone(),
                description: course.description.clone(),
            });
        }
    }

    days
}
