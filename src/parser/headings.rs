pub const PATH_SEPARATOR: &str = " > ";

const MAX_LEVEL: usize = 6;

/// Active heading per level (h1..h6) while walking a document in order.
#[derive(Debug, Default, Clone)]
pub struct HeadingTracker {
    levels: [Option<String>; MAX_LEVEL],
    // Highest level currently set; 0 when empty.
    deepest: usize,
}

impl HeadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading. Entering a level closes every deeper level opened since.
    /// Blank text is ignored, not cleared.
    pub fn observe(&mut self, level: u8, text: &str) {
        let level = level as usize;
        if !(1..=MAX_LEVEL).contains(&level) {
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.levels[level - 1] = Some(text.to_string());
        for slot in &mut self.levels[level..self.deepest.max(level)] {
            *slot = None;
        }
        self.deepest = level;
    }

    pub fn current_path(&self) -> String {
        self.levels
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Deepest active heading, i.e. the final segment of `current_path`.
    pub fn last(&self) -> Option<&str> {
        self.levels[..self.deepest].iter().rev().flatten().next().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.deepest == 0
    }
}
