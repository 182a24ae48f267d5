use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::db::SavedSnippet;

static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<\?php\s*").unwrap());
const CLOSE_TAG: &str = "?>";

fn header(plugin_name: &str) -> String {
    format!(
        "<?php\n/*\nPlugin Name: {plugin_name}\nDescription: Snippets managed by snippet_importer.\nAuthor: Site Admin\n*/\n\n"
    )
}

/// Strip the embedded open/close tags so the body can sit inside one PHP file.
fn clean_code(code: &str) -> String {
    let code = OPEN_TAG_RE.replace(code, "");
    let code = code.replace(CLOSE_TAG, "");
    format!("{}\n", code.trim_end())
}

/// Render every saved snippet into a single PHP file.
pub fn render(plugin_name: &str, snippets: &[SavedSnippet]) -> String {
    let mut out = header(plugin_name);
    for s in snippets.iter().filter(|s| !s.id.is_empty()) {
        out.push_str(&format!(
            "/**\n * Snippet: {}\n * ID: {}\n */\n",
            s.title, s.id
        ));
        out.push_str(&clean_code(&s.code));
        out.push('\n');
    }
    out
}

pub fn write(path: &Path, plugin_name: &str, snippets: &[SavedSnippet]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    let content = render(plugin_name, snippets);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write snippets file {}", path.display()))?;
    info!(path = %path.display(), snippets = snippets.len(), "rebuilt snippets file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(id: &str, title: &str, code: &str) -> SavedSnippet {
        SavedSnippet {
            id: id.into(),
            title: title.into(),
            code: code.into(),
        }
    }

    #[test]
    fn empty_file_is_just_header() {
        let out = render("Custom Snippets", &[]);
        assert!(out.starts_with("<?php\n/*\nPlugin Name: Custom Snippets\n"));
        assert!(out.ends_with("*/\n\n"));
    }

    #[test]
    fn entries_get_comment_headers() {
        let out = render(
            "X",
            &[saved("a", "First", "a();"), saved("b", "Second", "b();\n\n")],
        );
        assert!(out.contains("/**\n * Snippet: First\n * ID: a\n */\na();\n\n"));
        assert!(out.ends_with("/**\n * Snippet: Second\n * ID: b\n */\nb();\n\n"));
    }

    #[test]
    fn strips_php_tags() {
        let out = render("X", &[saved("a", "A", "  <?php\n\nadd_action('x');\n?>\n")]);
        assert!(out.contains(" * ID: a\n */\nadd_action('x');\n\n"));
        assert_eq!(out.matches("<?php").count(), 1);
        assert!(!out.contains("?>"));
    }

    #[test]
    fn open_tag_only_stripped_at_start() {
        assert_eq!(clean_code("echo '<?php';"), "echo '<?php';\n");
    }

    #[test]
    fn skips_snippets_without_id() {
        let out = render("X", &[saved("", "Ghost", "ghost();")]);
        assert!(!out.contains("ghost"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mu-plugins/custom-snippets.php");
        write(&path, "X", &[saved("a", "A", "a();")]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(" * ID: a\n"));
    }
}
