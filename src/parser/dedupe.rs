use std::collections::HashMap;

use super::Snippet;

/// Keep one snippet per path: the one with the longest code, first seen on ties.
/// Output order is the order in which each path first appeared.
pub fn dedupe_by_path(snippets: Vec<Snippet>) -> Vec<Snippet> {
    let mut kept: Vec<Snippet> = Vec::with_capacity(snippets.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for snippet in snippets {
        match index.get(&snippet.path) {
            Some(&pos) => {
                if snippet.code.len() > kept[pos].code.len() {
                    kept[pos] = snippet;
                }
            }
            None => {
                index.insert(snippet.path.clone(), kept.len());
                kept.push(snippet);
            }
        }
    }

    kept
}
