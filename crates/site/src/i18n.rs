use std::collections::HashMap;

use infra::models::is_valid_weekday;

pub const DEFAULT_LOCALE: &str = "de";

pub const APP_NAME: &str = "app.name";
pub const BY_ARRANGEMENT: &str = "schedule.by_arrangement";
pub const SECTION_OPENING_HOURS: &str = "section.opening_hours";
pub const SECTION_SCHEDULE: &str = "section.schedule";
pub const SECTION_CONTACT: &str = "section.contact";
pub const SECTION_ADDRESS: &str = "section.address";

// ── Built-in tables ─────────────────────────────────────────────────

const DE: &[(&str, &str)] = &[
    (APP_NAME, "Mein Club"),
    ("weekday.1", "Montag"),
    ("weekday.2", "Dienstag"),
    ("weekday.3", "Mittwoch"),
    ("weekday.4", "Donnerstag"),
    ("weekday.5", "Freitag"),
    ("weekday.6", "Samstag"),
    ("weekday.7", "Sonntag"),
    (BY_ARRANGEMENT, "nach Vereinbarung"),
    (SECTION_OPENING_HOURS, "\u{d6}ffnungszeiten"),
    (SECTION_SCHEDULE, "Kursplan"),
    (SECTION_CONTACT, "Kontakt"),
    (SECTION_ADDRESS, "Adresse"),
];

const EN: &[(&str, &str)] = &[
    (APP_NAME, "My Club"),
    ("weekday.1", "Monday"),
    ("weekday.2", "Tuesday"),
    ("weekday.3", "Wednesday"),
    ("weekday.4", "Thursday"),
    ("weekday.5", "Friday"),
    ("weekday.6", "Saturday"),
    ("weekday.7", "Sunday"),
    (BY_ARRANGEMENT, "by arrangement"),
    (SECTION_OPENING_HOURS, "Opening hours"),
    (SECTION_SCHEDULE, "Schedule"),
    (SECTION_CONTACT, "Contact"),
    (SECTION_ADDRESS, "Address"),
];

pub fn weekday_key(day: i16) -> String {
    format!("weekday.{day}")
}

/// Text lookup table: locale -> key -> text.
///
/// Lookups fall back from the selected locale to [`DEFAULT_LOCALE`] and
/// finally to the key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    locale: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Labels {
    /// Built-in `de` and `en` tables with `locale` selected.
    pub fn new(locale: impl Into<String>) -> Self {
        Self::empty(locale)
            .with_table(DEFAULT_LOCALE, DE)
            .with_table("en", EN)
    }

    /// No texts at all; every lookup yields its key.
    pub fn empty(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            tables: HashMap::new(),
        }
    }

    pub fn with_text(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.tables
            .entry(locale.into())
            .or_default()
            .insert(key.into(), text.into());
        self
    }

    fn with_table(self, locale: &str, entries: &[(&str, &str)]) -> Self {
        entries
            .iter()
            .fold(self, |labels, (key, text)| labels.with_text(locale, *key, *text))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.text_for(&self.locale, key)
    }

    pub fn text_for<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        [locale, DEFAULT_LOCALE]
            .into_iter()
            .find_map(|locale| self.tables.get(locale)?.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn app_name(&self) -> &str {
        self.text(APP_NAME)
    }

    /// Weekday name for 1 (Monday) ..= 7 (Sunday); empty otherwise.
    pub fn weekday(&self, day: i16) -> String {
        if !is_valid_weekday(day) {
            return String::new();
        }
        let key = weekday_key(day);
        self.text(&key).to_string()
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_is_german() {
        let labels = Labels::default();
        assert_eq!(labels.app_name(), "Mein Club");
        assert_eq!(labels.weekday(1), "Montag");
        assert_eq!(labels.weekday(7), "Sonntag");
        assert_eq!(labels.text(BY_ARRANGEMENT), "nach Vereinbarung");
    }

    #[test]
    fn invalid_weekday_has_no_label() {
        let labels = Labels::default();
        assert_eq!(labels.weekday(0), "");
        assert_eq!(labels.weekday(8), "");
    }

    #[test]
    fn lookup_falls_back_to_default_locale_then_key() {
        let labels = Labels::empty("fr")
            .with_text("fr", APP_NAME, "Mon Club")
            .with_text(DEFAULT_LOCALE, "weekday.1", "Montag");

        assert_eq!(labels.app_name(), "Mon Club");
        assert_eq!(labels.weekday(1), "Montag");
        assert_eq!(labels.text("missing.key"), "missing.key");
    }

    #[test]
    fn unknown_locale_uses_german_table() {
        let labels = Labels::new("nl");
        assert_eq!(labels.weekday(3), "Mittwoch");
    }

    #[test]
    fn english_table_is_selectable() {
        let labels = Labels::new("en");
        assert_eq!(labels.weekday(2), "Tuesday");
        assert_eq!(labels.text(BY_ARRANGEMENT), "by arrangement");
    }
}
