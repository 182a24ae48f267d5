use scraper::ElementRef;

use super::headings::{HeadingTracker, PATH_SEPARATOR};
use super::locate::{locate_code, text_of};
use super::slug::slugify;
use super::Snippet;

const CODE_BLOCK_CLASS: &str = "wp-block-code";
const FALLBACK_PATH: &str = "Code Snippet";
const FALLBACK_TITLE: &str = "Snippet";

/// Mutable state threaded through one extraction run.
#[derive(Debug, Default)]
pub struct TraversalState {
    pub headings: HeadingTracker,
    pub results: Vec<Snippet>,
}

/// Walk `root` in document order and collect every recognised code block.
/// Paths may repeat; deduplication happens afterwards.
pub fn extract(root: ElementRef) -> Vec<Snippet> {
    let mut state = TraversalState::default();
    walk(root, &mut state);
    state.results
}

/// Pre-order visit of every element under (and including) `root`.
pub fn walk(root: ElementRef, state: &mut TraversalState) {
    for node in root.descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            visit(el, state);
        }
    }
}

fn visit(el: ElementRef, state: &mut TraversalState) {
    let tag = el.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "details" => visit_details(el, state),
        "figure" if has_code_block_class(el) => {
            let code = locate_code(el);
            push_headed(code, state);
        }
        "pre" | "code" => {
            if !inside_details(el) {
                push_headed(text_of(el), state);
            }
        }
        _ => {
            if let Some(level) = heading_level(&tag) {
                state.headings.observe(level, &text_of(el));
            }
        }
    }
}

fn visit_details(el: ElementRef, state: &mut TraversalState) {
    let summary = el
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name().eq_ignore_ascii_case("summary"))
        .map(text_of)
        .unwrap_or_default();
    if summary.is_empty() {
        return;
    }
    let code = locate_code(el);
    if code.is_empty() {
        return;
    }

    let base = state.headings.current_path();
    let path = if base.is_empty() {
        summary.clone()
    } else {
        format!("{base}{PATH_SEPARATOR}{summary}")
    };
    state.results.push(Snippet::new(summary, path, code));
}

/// Figure and bare pre/code blocks take their label from the heading path.
fn push_headed(code: String, state: &mut TraversalState) {
    if code.is_empty() {
        return;
    }
    let path = state.headings.current_path();
    let (title, path) = match state.headings.last() {
        Some(last) if !path.is_empty() => (last.to_string(), path),
        _ => (FALLBACK_TITLE.to_string(), FALLBACK_PATH.to_string()),
    };
    state.results.push(Snippet::new(title, path, code));
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

fn has_code_block_class(el: ElementRef) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| format!(" {class} ").contains(&format!(" {CODE_BLOCK_CLASS} ")))
}

fn inside_details(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|parent| parent.name().eq_ignore_ascii_case("details"))
}

impl Snippet {
    fn new(title: String, path: String, code: String) -> Self {
        Self {
            id: slugify(&path),
            title,
            path,
            code,
        }
    }
}
