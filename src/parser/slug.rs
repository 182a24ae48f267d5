use std::sync::LazyLock;

use regex::Regex;

use super::headings::PATH_SEPARATOR;

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase ASCII slug: every run of other characters becomes one `-`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_RE
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Path as shown to a user, without the page's own top heading.
pub fn display_label<'a>(path: &'a str, boilerplate: Option<&str>) -> &'a str {
    boilerplate
        .filter(|b| !b.is_empty())
        .and_then(|b| path.strip_prefix(b)?.strip_prefix(PATH_SEPARATOR))
        .unwrap_or(path)
}

/// Id offered when a parsed snippet is loaded for saving.
pub fn id_from_path(path: &str, boilerplate: Option<&str>) -> String {
    slugify(display_label(path, boilerplate))
}

/// Normalise a user supplied id and drop the page heading prefix if present.
pub fn normalize_id(id: &str, boilerplate: Option<&str>) -> String {
    let id = slugify(id);
    let prefix = boilerplate
        .map(slugify)
        .filter(|p| !p.is_empty())
        .map(|p| format!("{p}-"));
    match prefix {
        Some(p) => id.strip_prefix(&p).map(str::to_string).unwrap_or(id),
        None => id,
    }
}
