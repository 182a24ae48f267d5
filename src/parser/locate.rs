use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

static PRE_CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre > code").unwrap());
static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").unwrap());
static CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());

/// Best code text inside `root`: `pre > code`, then `pre`, then `code`.
/// Empty string means the subtree holds no code.
pub fn locate_code(root: ElementRef) -> String {
    [&*PRE_CODE, &*PRE, &*CODE]
        .into_iter()
        .filter_map(|selector| root.select(selector).next())
        .map(text_of)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Trimmed text content of an element and all its descendants.
pub fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
