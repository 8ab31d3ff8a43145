/// File kinds the upload widgets distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Other,
}

/// Detects whether an upload is a PDF from its filename, MIME type or magic bytes.
///
/// # Arguments
///
/// * `filename` - Optional filename to check for extension-based detection
/// * `mime` - Optional MIME type reported by the browser
/// * `head` - The first bytes of the file for magic byte detection (may be empty)
///
/// # Detection Strategy
///
/// 1. Filename extension check (case-insensitive)
/// 2. MIME type check
/// 3. Magic bytes check for PDF (`%PDF` header)
pub fn detect_type(filename: Option<&str>, mime: Option<&str>, head: &[u8]) -> FileKind {
    if let Some(name) = filename {
        if name.to_lowercase().ends_with(".pdf") {
            return FileKind::Pdf;
        }
    }
    if let Some(mime) = mime {
        if mime.trim().eq_ignore_ascii_case("application/pdf") {
            return FileKind::Pdf;
        }
    }
    // fallback: magic
    if head.len() >= 4 && &head[0..4] == b"%PDF" {
        return FileKind::Pdf;
    }
    FileKind::Other
}

/// Filename without its last extension.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf_by_name_mime_or_magic() {
        assert_eq!(detect_type(Some("Form.PDF"), None, b""), FileKind::Pdf);
        assert_eq!(detect_type(None, Some("application/pdf"), b""), FileKind::Pdf);
        assert_eq!(detect_type(Some("scan.bin"), None, b"%PDF-1.7\n"), FileKind::Pdf);
        assert_eq!(detect_type(Some("notes.txt"), Some("text/plain"), b"hello"), FileKind::Other);
    }

    #[test]
    fn stem_drops_last_extension() {
        assert_eq!(file_stem("tax.form.pdf"), "tax.form");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }
}
