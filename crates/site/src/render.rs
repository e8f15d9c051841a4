use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::SiteError;
use crate::i18n::{Labels, SECTION_ADDRESS, SECTION_CONTACT, SECTION_OPENING_HOURS, SECTION_SCHEDULE};
use crate::view::{ClubView, CourseView, OpeningHourView, ScheduleDay};

pub const LAYOUT_TEMPLATE: &str = "layout.html";

/// Page shell with `{{title}}`, `{{content}}` and `{{app_name}}` placeholders.
#[derive(Debug, Clone)]
pub struct Layout {
    source: String,
}

impl Layout {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn load(template_dir: &Path) -> Result<Self, SiteError> {
        let path = template_dir.join(LAYOUT_TEMPLATE);
        match fs::read_to_string(&path) {
            Ok(source) => Ok(Self::new(source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(SiteError::MissingTemplate(path))
            }
            Err(err) => Err(SiteError::io(&path)(err)),
        }
    }

    /// Substitute placeholders in one pass; `title` and `app_name` are
    /// escaped here, `content` must already be HTML.
    pub fn render(&self, title: &str, content: &str, app_name: &str) -> String {
        let title = encode_text(title);
        let app_name = encode_text(app_name);

        let mut out = String::with_capacity(self.source.len() + content.len());
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };
            match after[..end].trim() {
                "title" => out.push_str(&title),
                "content" => out.push_str(content),
                "app_name" => out.push_str(&app_name),
                _ => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// Output path of a club page relative to the output directory.
pub fn club_page_path(slug: &str) -> PathBuf {
    Path::new("clubs").join(slug).join("index.html")
}

/// Page body for one club.
pub fn club_page(view: &ClubView, labels: &Labels) -> String {
    let mut html = String::from("<article class=\"club\">\n");

    html.push_str(&format!("  <h1>{}</h1>\n", encode_text(&view.name)));
    if !view.categories.is_empty() {
        html.push_str("  <ul class=\"categories\">\n");
        for category in &view.categories {
            html.push_str(&format!("    <li>{}</li>\n", encode_text(category)));
        }
        html.push_str("  </ul>\n");
    }
    if !view.description.trim().is_empty() {
        html.push_str(&format!(
            "  <p class=\"description\">{}</p>\n",
            encode_text(view.description.trim())
        ));
    }

    if view.has_opening_hours {
        opening_hours_section(&mut html, &view.opening_hours, labels);
    }
    if view.has_schedule {
        schedule_section(&mut html, &view.schedule, labels);
    }
    if view.has_contact {
        contact_section(&mut html, view, labels);
    }
    if view.has_address {
        address_section(&mut html, view, labels);
    }

    html.push_str("</article>\n");
    html
}

fn opening_hours_section(html: &mut String, entries: &[OpeningHourView], labels: &Labels) {
    html.push_str(&format!(
        "  <section class=\"opening-hours\">\n    <h2>{}</h2>\n    <table>\n",
        encode_text(labels.text(SECTION_OPENING_HOURS))
    ));
    for entry in entries {
        let hours = [entry.opens_at.as_str(), entry.closes_at.as_str()]
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" - ");
        html.push_str(&format!(
            "      <tr><th>{}</th><td>{}</td><td>{}</td></tr>\n",
            encode_text(&entry.day),
            encode_text(&hours),
            encode_text(&entry.note)
        ));
    }
    html.push_str("    </table>\n  </section>\n");
}

fn schedule_section(html: &mut String, days: &[ScheduleDay], labels: &Labels) {
    html.push_str(&format!(
        "  <section class=\"schedule\">\n    <h2>{}</h2>\n",
        encode_text(labels.text(SECTION_SCHEDULE))
    ));
    for day in days {
        html.push_str(&format!(
            "    <div class=\"day\">\n      <h3>{}</h3>\n",
            encode_text(&day.day)
        ));
        for slot in &day.slots {
            html.push_str(&format!(
                "      <div class=\"slot\">\n        <p class=\"time\">{}</p>\n        <ul>\n",
                encode_text(&slot.time)
            ));
            for course in &slot.courses {
                html.push_str(&course_item(course));
            }
            html.push_str("        </ul>\n      </div>\n");
        }
        html.push_str("    </div>\n");
    }
    html.push_str("  </section>\n");
}

fn course_item(course: &CourseView) -> String {
    let mut item = format!(
        "          <li><strong>{}</strong>",
        encode_text(&course.title)
    );
    for (class, value) in [
        ("location", &course.location),
        ("instructor", &course.instructor),
        ("level", &course.level),
        ("description", &course.description),
    ] {
        if !value.is_empty() {
            item.push_str(&format!(
                " <span class=\"{class}\">{}</span>",
                encode_text(value)
            ));
        }
    }
    item.push_str("</li>\n");
    item
}

fn contact_section(html: &mut String, view: &ClubView, labels: &Labels) {
    html.push_str(&format!(
        "  <section class=\"contact\">\n    <h2>{}</h2>\n    <ul>\n",
        encode_text(labels.text(SECTION_CONTACT))
    ));

    let person = [view.contact_name.as_str(), view.contact_role.as_str()]
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !person.is_empty() {
        html.push_str(&format!("      <li>{}</li>\n", encode_text(&person)));
    }
    if !view.contact_email.is_empty() {
        html.push_str(&format!(
            "      <li><a href=\"mailto:{}\">{}</a></li>\n",
            encode_double_quoted_attribute(&view.contact_email),
            encode_text(&view.contact_email)
        ));
    }
    if !view.contact_phone.is_empty() {
        html.push_str(&format!(
            "      <li>{}</li>\n",
            encode_text(&view.contact_phone)
        ));
    }
    if !view.contact_website.is_empty() {
        html.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            encode_double_quoted_attribute(&website_href(&view.contact_website)),
            encode_text(&view.contact_website)
        ));
    }

    html.push_str("    </ul>\n  </section>\n");
}

fn address_section(html: &mut String, view: &ClubView, labels: &Labels) {
    html.push_str(&format!(
        "  <section class=\"address\">\n    <h2>{}</h2>\n    <address>\n",
        encode_text(labels.text(SECTION_ADDRESS))
    ));

    let city = [view.address_postal.as_str(), view.address_city.as_str()]
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let lines = [
        view.address_line1.as_str(),
        view.address_line2.as_str(),
        city.as_str(),
        view.address_country.as_str(),
    ];
    let lines: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .map(|line| encode_text(line).into_owned())
        .collect();
    html.push_str(&format!("      {}\n", lines.join("<br>\n      ")));

    html.push_str("    </address>\n  </section>\n");
}

/// Only http(s) links are emitted as-is; anything else is treated as a host.
fn website_href(website: &str) -> String {
    let lower = website.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        website.to_string()
    } else {
        format!("https://{website}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_fills_placeholders_once() {
        let layout = Layout::new(
            "<title>{{title}} | {{ app_name }}</title><main>{{content}}</main>{{unknown}}",
        );

        let html = layout.render("A & B {{content}}", "<p>x</p>", "Mein Club");

        assert_eq!(
            html,
            "<title>A &amp; B {{content}} | Mein Club</title><main><p>x</p></main>{{unknown}}"
        );
    }

    #[test]
    fn layout_keeps_unclosed_braces() {
        let html = Layout::new("a {{title").render("t", "", "");
        assert_eq!(html, "a {{title");
    }

    #[test]
    fn club_page_escapes_text() {
        let view = ClubView {
            name: "<script>".into(),
            contact_website: "example.org/\"x".into(),
            has_contact: true,
            ..Default::default()
        };

        let html = club_page(&view, &Labels::default());

        assert!(html.contains("<h1>&lt;script&gt;</h1>"));
        assert!(html.contains("href=\"https://example.org/&quot;x\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn club_page_path_uses_slug() {
        assert_eq!(
            club_page_path("sv-adler"),
            Path::new("clubs/sv-adler/index.html")
        );
    }
}
