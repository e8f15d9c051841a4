//! URL path segments derived from club names.

/// Slug used when a name contains nothing sluggable.
pub const FALLBACK_SLUG: &str = "club";

/// Lowercase, transliterate German umlauts, and collapse everything that is
/// not `a-z0-9` into single dashes.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut last_dash = false;
    for ch in lowered.chars() {
        let mapped = match ch {
            'ä' => Some("ae"),
            'ö' => Some("oe"),
            'ü' => Some("ue"),
            'ß' => Some("ss"),
            _ => None,
        };
        if let Some(text) = mapped {
            slug.push_str(text);
            last_dash = false;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_matches('-').to_string()
}

/// Slugify `name`, falling back to [`FALLBACK_SLUG`] when nothing is left.
pub fn base_slug(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// First of `base`, `base-2`, `base-3`, ... for which `is_taken` is false.
pub fn unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (2u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("SV Adler"), "sv-adler");
        assert_eq!(slugify("  TSV 1860 / München e.V. "), "tsv-1860-muenchen-e-v");
    }

    #[test]
    fn slugify_transliterates_umlauts() {
        assert_eq!(slugify("Fußball Größe Übung"), "fussball-groesse-uebung");
    }

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("--Yoga!!!  & Tanz--"), "yoga-tanz");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn base_slug_falls_back_to_club() {
        assert_eq!(base_slug("!!!"), FALLBACK_SLUG);
        assert_eq!(base_slug(""), FALLBACK_SLUG);
    }

    #[test]
    fn unique_slug_appends_numeric_suffix() {
        let taken = ["sv-adler".to_string()];
        let slug = unique_slug("sv-adler", |s| taken.iter().any(|t| t == s));
        assert_eq!(slug, "sv-adler-2");

        let taken = ["sv-adler", "sv-adler-2", "sv-adler-3"];
        let slug = unique_slug("sv-adler", |s| taken.contains(&s));
        assert_eq!(slug, "sv-adler-4");
    }

    #[test]
    fn unique_slug_keeps_free_base() {
        assert_eq!(unique_slug("sv-adler", |_| false), "sv-adler");
    }
}
