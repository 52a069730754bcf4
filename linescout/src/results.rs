use serde::Serialize;
use std::path::PathBuf;

/// One matched location of the search pattern.
///
/// Occurrences are produced by the scan and never mutated; they have no
/// identity beyond their field values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Occurrence {
    /// The file containing the match
    pub file: PathBuf,
    /// 1-based line number within the file
    pub line: usize,
    /// 0-based character offset of the match start within the line
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrence_creation() {
        let occ = Occurrence {
            file: PathBuf::from("src/main.rs"),
            line: 42,
            offset: 7,
        };

        assert_eq!(occ.file, PathBuf::from("src/main.rs"));
        assert_eq!(occ.line, 42);
        assert_eq!(occ.offset, 7);
    }

    #[test]
    fn test_occurrence_equality() {
        let a = Occurrence {
            file: PathBuf::from("a.txt"),
            line: 1,
            offset: 0,
        };
        let b = a.clone();
        assert_eq!(a, b);

        let c = Occurrence { offset: 1, ..b };
        assert_ne!(a, c);
    }
}
