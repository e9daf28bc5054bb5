//! PDF text extraction and preparation for the cleanup step.

use crate::error::{PdfcastError, Result};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Extract the text of a PDF, truncated to `max_chars` characters.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn extract_text(path: &Path, max_chars: usize) -> Result<String> {
    if !path.exists() {
        return Err(PdfcastError::Pdf(format!("File not found: {}", path.display())));
    }

    let bytes = tokio::fs::read(path).await?;
    if !bytes.starts_with(b"%PDF") {
        return Err(PdfcastError::Pdf(format!(
            "{} is not a PDF file",
            path.display()
        )));
    }

    // pdf-extract is synchronous and may panic on malformed input.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| PdfcastError::Pdf(format!("PDF extraction aborted: {}", e)))?
        .map_err(|e| PdfcastError::Pdf(format!("Failed to extract text: {}", e)))?;

    if text.trim().is_empty() {
        return Err(PdfcastError::Pdf(format!(
            "No extractable text in {} (scanned PDFs are not supported)",
            path.display()
        )));
    }

    let total = text.chars().count();
    debug!("Extracted {} characters", total);

    Ok(truncate_chars(text, max_chars, total))
}

fn truncate_chars(mut text: String, max_chars: usize, total: usize) -> String {
    if total <= max_chars {
        return text;
    }

    warn!(
        "PDF text has {} characters, truncating to {}",
        total, max_chars
    );
    if let Some((end, _)) = text.char_indices().nth(max_chars) {
        text.truncate(end);
    }
    text
}

/// Collapse runs of spaces within lines and runs of blank lines.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push('\n');
            }
            continue;
        }

        blank_run = 0;
        out.push_str(&line);
        out.push('\n');
    }

    out.trim_end().to_string()
}

/// Split text on whitespace into chunks of at most `chunk_size` characters.
///
/// A single word longer than `chunk_size` becomes its own chunk.
pub fn word_bounded_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { word_len + 1 };

        if current_len + needed > chunk_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        let raw = "Title   line\n\n\n\nBody  text\twith   gaps\n   \nEnd\n\n";
        assert_eq!(normalize_text(raw), "Title line\n\nBody text with gaps\n\nEnd");
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = word_bounded_chunks(text, 14);
        assert!(chunks.iter().all(|c| c.chars().count() <= 14));
        assert_eq!(chunks.join(" "), text);
        assert_eq!(chunks[0], "one two three");
    }

    #[test]
    fn test_long_word_gets_own_chunk() {
        let chunks = word_bounded_chunks("a supercalifragilistic b", 5);
        assert_eq!(chunks, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_chunks_of_empty_text() {
        assert!(word_bounded_chunks("   \n ", 100).is_empty());
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let text = "héllo wörld".to_string();
        let total = text.chars().count();
        assert_eq!(truncate_chars(text, 7, total), "héllo w");
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let err = extract_text(Path::new("/nonexistent/paper.pdf"), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfcastError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "just text").unwrap();

        let err = extract_text(&path, 100).await.unwrap_err();
        assert!(err.to_string().contains("not a PDF"));
    }
}
