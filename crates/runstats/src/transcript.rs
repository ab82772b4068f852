//! Line-oriented log transcripts.
//!
//! Terraform logs are mostly UTF-8 but CI runners occasionally mangle
//! output, so files are read as bytes and decoded lossily. A scan never
//! fails because of a stray byte.

use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("ANSI escape pattern is valid")
});

/// The text of a single log artifact (plan, apply or refresh output).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Wrap already-loaded log text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a transcript from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Decode a transcript from raw bytes, replacing invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned())
    }

    /// The full transcript text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines in file order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// Remove ANSI colour and cursor escapes from a line.
pub fn strip_ansi(line: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lines_preserve_order() {
        let transcript = Transcript::new("first\nsecond\r\nthird");
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_read_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Refreshing state...\n\xff\xfe broken\n").unwrap();

        let transcript = Transcript::read(file.path()).unwrap();
        assert!(transcript.text().contains("Refreshing state..."));
        assert_eq!(transcript.lines().count(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let err = Transcript::read(Path::new("/nonexistent/apply.log")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_strip_ansi() {
        let line = "\x1b[0m\x1b[1m\x1b[32mApply complete! Resources: 1 added.\x1b[0m";
        assert_eq!(strip_ansi(line), "Apply complete! Resources: 1 added.");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
