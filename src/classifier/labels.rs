//! Label table loading.
//!
//! The label file is a CSV with one class per row; the first field of each
//! row is the label. A UTF-8 byte order mark is tolerated and blank rows are
//! skipped.

use std::fs;
use std::path::Path;

use crate::error::{SignError, SignResult};

/// Ordered mapping from model output index to letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Creates a table from labels in class-index order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads the table from a CSV file.
    ///
    /// A missing, unreadable or empty file is a load error.
    pub fn load(path: &Path) -> SignResult<Self> {
        let label_error = |reason: String| SignError::LabelLoad {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(label_error("file not found".to_string()));
        }

        let content = fs::read_to_string(path).map_err(|e| label_error(e.to_string()))?;
        let table = Self::parse(&content).map_err(label_error)?;

        if table.is_empty() {
            return Err(label_error("no labels found".to_string()));
        }

        Ok(table)
    }

    /// Parses CSV content into a table.
    pub fn parse(content: &str) -> Result<Self, String> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let labels = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                first_field(line)
                    .ok_or_else(|| format!("unterminated quote on line {}", number + 1))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { labels })
    }

    /// Returns the label for a class index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the table has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates labels in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Extracts the first CSV field of a row, unquoting if needed.
fn first_field(line: &str) -> Option<String> {
    let line = line.trim_end_matches('\r');

    let Some(quoted) = line.strip_prefix('"') else {
        return Some(line.split(',').next().unwrap_or_default().to_string());
    };

    let mut field = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                return Some(field);
            }
        } else {
            field.push(c);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_single_column() {
        let table = LabelTable::parse("A\nB\nC\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0), Some("A"));
        assert_eq!(table.get(2), Some("C"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn test_parse_strips_bom_and_crlf() {
        let table = LabelTable::parse("\u{feff}A\r\nB\r\n").unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_parse_uses_first_field_only() {
        let table = LabelTable::parse("A,apple\nB,ball\n").unwrap();
        assert_eq!(table.get(1), Some("B"));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let table = LabelTable::parse("\"A, open\",x\n\"say \"\"B\"\"\"\n").unwrap();
        assert_eq!(table.get(0), Some("A, open"));
        assert_eq!(table.get(1), Some("say \"B\""));
    }

    #[test]
    fn test_parse_skips_blank_rows() {
        let table = LabelTable::parse("A\n\n  \nB").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = LabelTable::parse("A\n\"B\n").unwrap_err();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = LabelTable::load(&temp_dir.path().join("label.csv")).unwrap_err();
        assert!(matches!(err, SignError::LabelLoad { .. }));
    }

    #[test]
    fn test_load_empty_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("label.csv");
        fs::write(&path, "\n").unwrap();
        assert!(LabelTable::load(&path).is_err());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("label.csv");
        fs::write(&path, "A\nB\nC\n").unwrap();
        let table = LabelTable::load(&path).unwrap();
        assert_eq!(table, LabelTable::new(["A", "B", "C"]));
    }
}
