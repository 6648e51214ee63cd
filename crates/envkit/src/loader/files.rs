//! Reading a single dotenv file.
//!
//! Values are taken literally: `$NAME` and `${NAME}` are not expanded, so a
//! file never depends on the process environment while it is parsed.
//!
//! Each line is parsed on its own. A line that does not parse is skipped and
//! reported by its 1-based number only, so `.env` secrets cannot leak through
//! logs. Within a file, assignments keep their order of appearance.

use std::path::{Path, PathBuf};

use crate::error::FileLoadError;

pub(super) type Assignments = Vec<(String, String)>;

/// The usable content of one dotenv file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct ParsedFile {
    pub assignments: Assignments,
    /// 1-based numbers of lines that were skipped as malformed.
    pub skipped_lines: Vec<usize>,
}

pub(super) fn parse(content: &str) -> ParsedFile {
    let mut parsed = ParsedFile::default();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match dotenv_parser::parse_dotenv(&format!("{line}\n")) {
            Ok(pairs) if !pairs.is_empty() => parsed.assignments.extend(pairs),
            _ => parsed.skipped_lines.push(index + 1),
        }
    }
    parsed
}

pub(super) fn read_file(path: &Path) -> Result<ParsedFile, FileLoadError> {
    std::fs::read_to_string(path)
        .map(|content| parse(&content))
        .map_err(|source| FileLoadError {
            path: path.to_path_buf(),
            source,
        })
}

/// Async counterpart of [`read_file`]; the read is a tokio suspension point,
/// parsing happens on the buffered content.
pub(super) async fn read_file_async(path: PathBuf) -> Result<ParsedFile, FileLoadError> {
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(parse(&content)),
        Err(source) => Err(FileLoadError { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pairs(parsed: &ParsedFile) -> Vec<(&str, &str)> {
        parsed
            .assignments
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let parsed = parse("# comment\n\nA=1\nB=two\n");
        assert_eq!(pairs(&parsed), vec![("A", "1"), ("B", "two")]);
        assert!(parsed.skipped_lines.is_empty());
    }

    #[test]
    fn test_parse_keeps_dollar_signs_literally() {
        let parsed = parse("PASSWORD=pa$word\nPRICE=5$\nGREETING=\"hi ${HOME}\"\n");
        assert_eq!(
            pairs(&parsed),
            vec![
                ("PASSWORD", "pa$word"),
                ("PRICE", "5$"),
                ("GREETING", "hi ${HOME}"),
            ]
        );
    }

    #[test]
    fn test_parse_skips_malformed_lines_and_keeps_the_rest() {
        let parsed = parse("PORT=3000\nthis line is junk\nHOST=localhost\n");
        assert_eq!(pairs(&parsed), vec![("PORT", "3000"), ("HOST", "localhost")]);
        assert_eq!(parsed.skipped_lines, vec![2]);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let parsed = parse("A=1\nB=2");
        assert_eq!(pairs(&parsed), vec![("A", "1"), ("B", "2")]);
    }

    #[test]
    fn test_read_file_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let failure = read_file(&dir.path().join(".env")).unwrap_err();
        assert!(failure.is_not_found());
    }

    #[tokio::test]
    async fn test_read_file_async_matches_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "A=1\nQUOTED=\"hello world\"\nbroken\n").unwrap();

        let parsed = read_file_async(path.clone()).await.unwrap();
        assert_eq!(parsed, read_file(&path).unwrap());
        assert_eq!(parsed.skipped_lines, vec![3]);
    }

    #[tokio::test]
    async fn test_read_file_async_reports_path_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env.local");

        let failure = read_file_async(path.clone()).await.unwrap_err();
        assert_eq!(failure.path, path);
        assert!(failure.is_not_found());
    }
}
