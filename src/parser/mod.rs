pub mod dedupe;
pub mod filter;
pub mod headings;
pub mod locate;
pub mod slug;
pub mod walk;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// One code block found on a docs page, keyed by its heading path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub path: String,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Exact title/path to drop from the output (the page's own top heading).
    pub boilerplate: Option<String>,
}

/// Three-pass pipeline: html → raw snippets → unique paths → boilerplate dropped.
///
/// Never fails: empty or malformed markup yields an empty list.
pub fn parse_docs_html(html: &str, options: &ExtractOptions) -> Vec<Snippet> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY).next() else {
        debug!("document has no body element");
        return Vec::new();
    };

    let raw = walk::extract(body);
    let raw_count = raw.len();
    let unique = dedupe::dedupe_by_path(raw);
    let unique_count = unique.len();
    let snippets = filter::drop_boilerplate(unique, options.boilerplate.as_deref());

    debug!(
        raw = raw_count,
        unique = unique_count,
        kept = snippets.len(),
        "extracted snippets"
    );
    snippets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const PAGE: &str = "Actions and Filters – Customize WP Staging";

    fn opts() -> ExtractOptions {
        ExtractOptions {
            boilerplate: Some(PAGE.to_string()),
        }
    }

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/actions-and-filters.html").unwrap()
    }

    #[test]
    fn empty_input() {
        assert!(parse_docs_html("", &opts()).is_empty());
        assert!(parse_docs_html("   \n", &opts()).is_empty());
    }

    #[test]
    fn garbage_input_does_not_fail() {
        assert!(parse_docs_html("<<<>>> </div></details><pre", &opts()).is_empty());
        assert!(parse_docs_html("just some text", &opts()).is_empty());
    }

    #[test]
    fn unclosed_tags_are_tolerated() {
        let out = parse_docs_html("<h2>Hooks<details><summary>s</summary><pre>x();", &opts());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "x();");
    }

    #[test]
    fn details_scenario() {
        let out = parse_docs_html(
            "<h2>Hooks</h2><details><summary>do_thing</summary><pre><code>add_action('x');</code></pre></details>",
            &opts(),
        );
        assert_eq!(
            out,
            vec![Snippet {
                id: "hooks-do-thing".into(),
                title: "do_thing".into(),
                path: "Hooks > do_thing".into(),
                code: "add_action('x');".into(),
            }]
        );
    }

    #[test]
    fn figure_scenario() {
        let out = parse_docs_html(
            "<h1>Filters</h1><figure class=\"wp-block-code\"><pre><code>apply_filters('y');</code></pre></figure>",
            &opts(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "Filters");
        assert_eq!(out[0].title, "Filters");
        assert_eq!(out[0].code, "apply_filters('y');");
    }

    #[test]
    fn bare_code_scenario() {
        let out = parse_docs_html("<pre><code>echo 1;</code></pre>", &opts());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "Code Snippet");
        assert_eq!(out[0].title, "Snippet");
        assert_eq!(out[0].id, "code-snippet");
    }

    #[test]
    fn boilerplate_scenario() {
        let html = format!("<h1>{PAGE}</h1><pre>intro();</pre><h2>Hooks</h2><pre>x();</pre>");
        let out = parse_docs_html(&html, &opts());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, format!("{PAGE} > Hooks"));

        let kept = parse_docs_html(&html, &ExtractOptions::default());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].path, PAGE);
    }

    #[test]
    fn longest_code_wins_for_shared_path() {
        let html = "<h2>Hooks</h2><pre>short();</pre><p>text</p><pre>much_longer_call();</pre><h2>Other</h2><pre>o();</pre>";
        let out = parse_docs_html(html, &opts());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].path, "Hooks");
        assert_eq!(out[0].code, "much_longer_call();");
        assert_eq!(out[1].path, "Other");
    }

    #[test]
    fn fixture_extracts_expected_paths() {
        let out = parse_docs_html(&fixture(), &opts());
        let paths: Vec<&str> = out.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Code Snippet".to_string(),
                format!("{PAGE} > Cloning > Exclude tables from cloning"),
                format!("{PAGE} > Cloning > Exclude folders from cloning"),
                format!("{PAGE} > Cloning"),
                format!("{PAGE} > Push > Preserve options"),
                format!("{PAGE} > Push > Backup"),
                format!("{PAGE} > Push > Backup > Change backup schedule"),
            ]
        );
    }

    #[test]
    fn fixture_details_not_double_counted() {
        let out = parse_docs_html(&fixture(), &opts());
        let exclude = out
            .iter()
            .find(|s| s.title == "Exclude tables from cloning")
            .unwrap();
        assert!(exclude.code.starts_with("function wpstg_cloning_excluded_tables"));
        assert!(!out.iter().any(|s| s.path == PAGE));
        // the inline mention is replaced by the longer figure on the same path
        let cloning = out.iter().find(|s| s.path.ends_with("> Cloning")).unwrap();
        assert_eq!(cloning.title, "Cloning");
        assert!(cloning.code.starts_with("add_filter( 'wpstg_clone_mu_plugins'"));
        // a figure nested in <details> loses to the longer figure above it
        let backup = out.iter().find(|s| s.path.ends_with("> Backup")).unwrap();
        assert!(backup.code.contains("non_prefixed"));
    }

    #[test]
    fn fixture_output_is_idempotent_and_unique() {
        let html = fixture();
        let a = parse_docs_html(&html, &opts());
        let b = parse_docs_html(&html, &opts());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        let paths: HashSet<_> = a.iter().map(|s| &s.path).collect();
        assert_eq!(paths.len(), a.len());
        assert!(a.iter().all(|s| !s.code.is_empty()));
        assert!(a.iter().all(|s| s.id == slug::slugify(&s.path)));
    }
}
