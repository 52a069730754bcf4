/// Finds every occurrence of a literal pattern within a single line of text.
///
/// Matching is purely positional: no regular expressions, no case folding.
/// Overlapping occurrences are reported, so the search resumes one character
/// past each match start rather than past its end.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
}

impl PatternMatcher {
    /// Creates a new PatternMatcher for the given literal pattern.
    ///
    /// The empty-pattern case is rejected at session configuration, so the
    /// matcher itself assumes a non-empty pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// The literal pattern this matcher searches for
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the 0-based character offset of every occurrence of the
    /// pattern in `line`, in ascending order, including overlapping matches.
    pub fn find_in_line(&self, line: &str) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut from = 0;
        // Characters preceding `from`, carried forward so each match only
        // counts the characters since the previous one.
        let mut chars_before = 0;
        while let Some(found) = line[from..].find(&self.pattern) {
            let at = from + found;
            chars_before += line[from..at].chars().count();
            offsets.push(chars_before);
            // Advance one character, not one pattern length, so that
            // overlapping occurrences are reported too.
            let step = line[at..].chars().next().map_or(1, char::len_utf8);
            from = at + step;
            chars_before += 1;
        }
        offsets
    }
}
