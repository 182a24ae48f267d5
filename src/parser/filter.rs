use super::Snippet;

/// Drop snippets whose title or path is exactly the page's own top heading.
pub fn drop_boilerplate(snippets: Vec<Snippet>, boilerplate: Option<&str>) -> Vec<Snippet> {
    let Some(drop) = boilerplate.map(str::trim).filter(|b| !b.is_empty()) else {
        return snippets;
    };
    snippets
        .into_iter()
        .filter(|s| s.title.trim() != drop && s.path.trim() != drop)
        .collect()
}
