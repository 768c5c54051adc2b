//! Document intake.
//!
//! Only plain-text and markdown files are read inline. Anything else is
//! replaced by a placeholder notice asking the user to paste the text, so an
//! unsupported upload never fails the analysis.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LexplainError, Result};
use crate::trim_text;

/// Extensions whose MIME type is `text/*`, plus markdown.
const INLINE_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "log", "md", "markdown", "csv", "tsv", "htm", "html", "xml", "css", "ics",
    "vtt",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name, `<stdin>`, or whatever label the caller supplied.
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let io_err = |source| LexplainError::Io {
            path: path.to_path_buf(),
            source,
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        fs::metadata(path).map_err(io_err)?;

        if !is_inline_text(path) {
            warn!("Unsupported file type for inline parsing: {}", path.display());
            return Ok(Self::new(name.clone(), unsupported_notice(&name)));
        }

        let bytes = fs::read(path).map_err(io_err)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::new(name, decode_text(&bytes)))
    }

    pub fn from_reader(source: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let source = source.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| LexplainError::Io {
                path: source.clone().into(),
                source: e,
            })?;
        Ok(Self::new(source, decode_text(&bytes)))
    }

    pub fn is_blank(&self) -> bool {
        trim_text(&self.text).is_empty()
    }
}

/// Lossy UTF-8 decode that drops a leading byte-order mark.
fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
}

pub fn is_inline_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            INLINE_TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

pub fn unsupported_notice(file_name: &str) -> String {
    format!("Unsupported file type for inline parsing. Please paste text.\nFile: {file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn reads_markdown_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.md");
        fs::write(&path, "# Lease\nTenant shall pay a late fee.").unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.source, "lease.md");
        assert_eq!(doc.text, "# Lease\nTenant shall pay a late fee.");
    }

    #[test]
    fn unsupported_type_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.pdf");
        fs::write(&path, b"%PDF-1.7 binary").unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(
            doc.text,
            "Unsupported file type for inline parsing. Please paste text.\nFile: contract.pdf"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Document::from_path("/nonexistent/contract.txt").unwrap_err();
        assert!(matches!(err, LexplainError::Io { .. }));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let mut file = tempfile::Builder::new().suffix(".TXT").tempfile().unwrap();
        file.write_all(b"Penalty \xff applies.").unwrap();

        let doc = Document::from_path(file.path()).unwrap();
        assert_eq!(doc.text, "Penalty \u{FFFD} applies.");
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let blank = dir.path().join("blank.txt");
        fs::write(&blank, b"\xEF\xBB\xBF\n").unwrap();
        let doc = Document::from_path(&blank).unwrap();
        assert_eq!(doc.text, "\n");
        assert!(doc.is_blank());

        let lease = dir.path().join("lease.txt");
        fs::write(&lease, b"\xEF\xBB\xBFLiability is capped.").unwrap();
        let doc = Document::from_path(&lease).unwrap();
        assert_eq!(doc.text, "Liability is capped.");
        assert_eq!(crate::analyze(&doc.text).summary, "Liability is capped.");

        let piped = Document::from_reader("<stdin>", &b"\xEF\xBB\xBFRent is due."[..]).unwrap();
        assert_eq!(piped.text, "Rent is due.");
    }

    #[test]
    fn extension_detection() {
        assert!(is_inline_text(Path::new("a.txt")));
        assert!(is_inline_text(Path::new("notes.Markdown")));
        assert!(!is_inline_text(Path::new("a.docx")));
        assert!(!is_inline_text(Path::new("README")));
    }

    #[test]
    fn reader_intake() {
        let doc = Document::from_reader("<stdin>", "  \n ".as_bytes()).unwrap();
        assert_eq!(doc.source, "<stdin>");
        assert!(doc.is_blank());
    }
}
