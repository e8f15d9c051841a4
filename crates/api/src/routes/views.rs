//! Server-rendered pages of the portal itself (login, register, dashboard, home).

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use infra::categories;
use infra::models::{ClubRow, WEEKDAYS};
use site::Labels;

use crate::routes::forms::{
    category_label, category_selection, ClubForm, CourseFormRow, OpeningFormRow, CATEGORY_OPTIONS,
};

pub const LOGIN_TITLE: &str = "Login";
pub const REGISTER_TITLE: &str = "Registrieren";
pub const DASHBOARD_TITLE: &str = "Dashboard";
pub const HOME_TITLE: &str = "Start";

/// Wrap a body in the portal page shell.
pub fn page(labels: &Labels, title: &str, body: &str) -> Html<String> {
    let app_name = text(labels.app_name());
    let title = text(title);
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | {app_name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 960px; margin: 0 auto; padding: 20px; color: #1f2933; }}
        header {{ display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; }}
        .form-group {{ margin-bottom: 15px; }}
        label {{ display: block; margin-bottom: 5px; }}
        input, textarea, select {{ width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 4px; box-sizing: border-box; }}
        input[type=checkbox] {{ width: auto; }}
        table input, table select {{ padding: 4px; }}
        button {{ background: #2f6f4f; color: white; padding: 10px 20px; border: none; border-radius: 4px; cursor: pointer; }}
        .error {{ background: #fde8e8; color: #9b1c1c; padding: 10px; border-radius: 4px; }}
        .info {{ background: #e3f8ec; color: #1e5b3b; padding: 10px; border-radius: 4px; }}
        .clubs li {{ margin-bottom: 12px; }}
        .muted {{ color: #616e7c; }}
    </style>
</head>
<body>
    <header><a href="/"><strong>{app_name}</strong></a></header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        lang = attr(labels.locale()),
    ))
}

fn notice(class: &str, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => {
            format!("<p class=\"{class}\">{}</p>\n", text(message))
        }
        _ => String::new(),
    }
}

pub fn login_page(labels: &Labels, error: Option<&str>, email: &str) -> Html<String> {
    let body = format!(
        r#"<h2>Login</h2>
{error}<form method="post" action="/login">
    <div class="form-group">
        <label for="email">E-Mail</label>
        <input type="email" id="email" name="email" value="{email}" required>
    </div>
    <div class="form-group">
        <label for="password">Passwort</label>
        <input type="password" id="password" name="password" required>
    </div>
    <button type="submit">Anmelden</button>
</form>
<p>Noch kein Konto? <a href="/register">Registrieren</a></p>
"#,
        error = notice("error", error),
        email = attr(email),
    );
    page(labels, LOGIN_TITLE, &body)
}

pub fn register_page(labels: &Labels, error: Option<&str>, email: &str) -> Html<String> {
    let body = format!(
        r#"<h2>Registrieren</h2>
{error}<form method="post" action="/register">
    <div class="form-group">
        <label for="email">E-Mail</label>
        <input type="email" id="email" name="email" value="{email}" required>
    </div>
    <div class="form-group">
        <label for="password">Passwort</label>
        <input type="password" id="password" name="password" required>
    </div>
    <button type="submit">Konto anlegen</button>
</form>
<p>Schon registriert? <a href="/login">Login</a></p>
"#,
        error = notice("error", error),
        email = attr(email),
    );
    page(labels, REGISTER_TITLE, &body)
}

/// "city, country", or whichever of the two is set.
pub fn location(city: &str, country: &str) -> String {
    match (city.trim(), country.trim()) {
        ("", country) => country.to_string(),
        (city, "") => city.to_string(),
        (city, country) => format!("{city}, {country}"),
    }
}

pub fn home_page(labels: &Labels, clubs: &[ClubRow]) -> Html<String> {
    let mut body = format!(
        "<h2>Clubs</h2>\n<p class=\"muted\">{} Clubs</p>\n<ul class=\"clubs\">\n",
        clubs.len()
    );
    for club in clubs {
        let href = format!("/clubs/{}/", urlencoding::encode(club.slug.trim()));
        body.push_str(&format!(
            "    <li><a href=\"{}\"><strong>{}</strong></a>",
            attr(&href),
            text(club.name.trim())
        ));

        let location = location(&club.address_city, &club.address_country);
        if !location.is_empty() {
            body.push_str(&format!(" <span class=\"muted\">{}</span>", text(&location)));
        }
        let category_labels: Vec<String> = categories::split(&club.categories)
            .iter()
            .map(|item| category_label(item))
            .collect();
        if !category_labels.is_empty() {
            body.push_str(&format!(
                "<br><small>{}</small>",
                text(&category_labels.join(", "))
            ));
        }
        let description = club.description.trim();
        if !description.is_empty() {
            body.push_str(&format!("<br>{}", text(description)));
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n<p><a href=\"/login\">Login</a> | <a href=\"/register\">Registrieren</a></p>\n");

    page(labels, HOME_TITLE, &body)
}

pub struct Dashboard<'a> {
    pub form: &'a ClubForm,
    pub error: Option<&'a str>,
    pub info: Option<&'a str>,
    /// Slug of the stored club, if any; links to its public page.
    pub slug: Option<&'a str>,
}

pub fn dashboard_page(labels: &Labels, dashboard: &Dashboard<'_>) -> Html<String> {
    let club = &dashboard.form.club;
    let mut body = String::from("<h2>Dashboard</h2>\n");
    body.push_str(&notice("error", dashboard.error));
    body.push_str(&notice("info", dashboard.info));

    if let Some(slug) = dashboard.slug.filter(|slug| !slug.is_empty()) {
        let href = format!("/clubs/{}/", urlencoding::encode(slug));
        body.push_str(&format!(
            "<p>Vorschau: <a href=\"{}\">{}</a></p>\n",
            attr(&href),
            text(&href)
        ));
    }

    body.push_str("<form method=\"post\" action=\"/admin/club\">\n");
    body.push_str(&input("name", "Clubname", &club.name));
    body.push_str(&format!(
        "<div class=\"form-group\"><label for=\"description\">Beschreibung</label><textarea id=\"description\" name=\"description\" rows=\"4\">{}</textarea></div>\n",
        text(&club.description)
    ));

    body.push_str(&category_fields(&club.categories));

    body.push_str("<h3>Kontakt</h3>\n");
    body.push_str(&input("contact_name", "Name", &club.contact_name));
    body.push_str(&input("contact_role", "Funktion", &club.contact_role));
    body.push_str(&input("contact_email", "E-Mail", &club.contact_email));
    body.push_str(&input("contact_phone", "Telefon", &club.contact_phone));
    body.push_str(&input("contact_website", "Website", &club.contact_website));

    body.push_str("<h3>Adresse</h3>\n");
    body.push_str(&input("address_line1", "Strasse", &club.address_line1));
    body.push_str(&input("address_line2", "Zusatz", &club.address_line2));
    body.push_str(&input("address_postal", "PLZ", &club.address_postal));
    body.push_str(&input("address_city", "Ort", &club.address_city));
    body.push_str(&input("address_country", "Land", &club.address_country));

    body.push_str(&opening_table(labels, &dashboard.form.opening_rows));
    body.push_str(&course_table(labels, &dashboard.form.course_rows));

    body.push_str("<button type=\"submit\">Speichern</button>\n</form>\n");
    body.push_str("<form method=\"post\" action=\"/logout\"><button type=\"submit\">Logout</button></form>\n");

    page(labels, DASHBOARD_TITLE, &body)
}

fn input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}</label><input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\"></div>\n",
        attr(value)
    )
}

fn category_fields(stored: &str) -> String {
    let (selected, custom) = category_selection(stored);
    let mut html = String::from("<fieldset><legend>Kategorien</legend>\n");
    for option in CATEGORY_OPTIONS {
        let checked = if selected.contains(&option.value) { " checked" } else { "" };
        html.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"category\" value=\"{}\"{checked}> {}</label>\n",
            option.value, option.label
        ));
    }
    html.push_str(&format!(
        "<div class=\"form-group\"><label for=\"category_custom\">Weitere</label><input type=\"text\" id=\"category_custom\" name=\"category_custom\" value=\"{}\"></div>\n",
        attr(&custom)
    ));
    html.push_str("</fieldset>\n");
    html
}

fn day_select(labels: &Labels, name: &str, selected: i16) -> String {
    let mut html = format!("<select name=\"{name}\">");
    for day in WEEKDAYS {
        let mark = if day == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{day}\"{mark}>{}</option>",
            text(&labels.weekday(day))
        ));
    }
    html.push_str("</select>");
    html
}

fn opening_table(labels: &Labels, rows: &[OpeningFormRow]) -> String {
    let mut html = String::from(
        "<h3>Oeffnungszeiten</h3>\n<table>\n<tr><th>Tag</th><th>Von</th><th>Bis</th><th>Hinweis</th></tr>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td><input type=\"hidden\" name=\"opening_day\" value=\"{day}\">{label}</td><td><input name=\"opening_open\" value=\"{}\"></td><td><input name=\"opening_close\" value=\"{}\"></td><td><input name=\"opening_note\" value=\"{}\"></td></tr>\n",
            attr(&row.open),
            attr(&row.close),
            attr(&row.note),
            day = row.day,
            label = text(&labels.weekday(row.day)),
        ));
    }
    html.push_str("</table>\n");
    html
}

fn course_table(labels: &Labels, rows: &[CourseFormRow]) -> String {
    let mut html = String::from(
        "<h3>Kurse</h3>\n<table>\n<tr><th>Titel</th><th>Tag</th><th>Start</th><th>Ende</th><th>Ort</th><th>Leitung</th><th>Level</th><th>Beschreibung</th></tr>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td><input name=\"course_title\" value=\"{}\"></td><td>{}</td><td><input name=\"course_start\" value=\"{}\"></td><td><input name=\"course_end\" value=\"{}\"></td><td><input name=\"course_location\" value=\"{}\"></td><td><input name=\"course_instructor\" value=\"{}\"></td><td><input name=\"course_level\" value=\"{}\"></td><td><input name=\"course_description\" value=\"{}\"></td></tr>\n",
            attr(&row.title),
            day_select(labels, "course_day", row.day),
            attr(&row.start),
            attr(&row.end),
            attr(&row.location),
            attr(&row.instructor),
            attr(&row.level),
            attr(&row.description),
        ));
    }
    html.push_str("</table>\n");
    html
}
