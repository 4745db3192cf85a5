//! Media type resolution and the document allow-list.
//!
//! Capture adapters resolve a media type from the file extension and forward
//! it unchecked. The allow-list is enforced in exactly one place, the backend
//! gateway, through [`is_supported_document`].

use std::path::Path;

/// Media type used for any extension missing from the table.
pub const GENERIC_BINARY: &str = "application/octet-stream";

pub const PNG: &str = "image/png";

pub const WEBM_AUDIO: &str = "audio/webm";

/// Static extension → media type table. Extensions are matched lowercase.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("js", "text/javascript"),
    ("py", "text/x-python"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("md", "text/md"),
    ("csv", "text/csv"),
    ("xml", "text/xml"),
    ("rtf", "text/rtf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
];

/// Media types accepted for document understanding.
pub const SUPPORTED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-javascript",
    "text/javascript",
    "application/x-python",
    "text/x-python",
    "text/plain",
    "text/html",
    "text/css",
    "text/md",
    "text/csv",
    "text/xml",
    "text/rtf",
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/tiff",
];

const SUPPORTED_TYPE_NAMES: &str =
    "PDF, JavaScript, Python, TXT, HTML, CSS, Markdown, CSV, XML, RTF, PNG, JPEG, GIF, WEBP, SVG, TIFF";

/// Resolves the media type of `path` from its extension.
///
/// Unknown or missing extensions resolve to [`GENERIC_BINARY`]; rejection is
/// left to the gateway.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
        .unwrap_or(GENERIC_BINARY)
}

/// Returns true if `media_type` is in the document allow-list.
pub fn is_supported_document(media_type: &str) -> bool {
    let media_type = media_type.trim();
    SUPPORTED_DOCUMENT_TYPES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(media_type))
}

/// User-facing text returned when a document type is rejected.
pub fn unsupported_media_type_message(media_type: &str) -> String {
    format!("Unsupported file type: {media_type}. Supported types are: {SUPPORTED_TYPE_NAMES}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_resolves_to_x_python() {
        assert_eq!(media_type_for_path(Path::new("/tmp/script.py")), "text/x-python");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(media_type_for_path(Path::new("Photo.JPEG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("scan.TIF")), "image/tiff");
    }

    #[test]
    fn test_unknown_extension_is_generic_binary() {
        assert_eq!(media_type_for_path(Path::new("archive.zip")), GENERIC_BINARY);
        assert_eq!(media_type_for_path(Path::new("Makefile")), GENERIC_BINARY);
    }

    #[test]
    fn test_every_table_entry_is_supported() {
        for (_, media_type) in EXTENSION_TABLE {
            assert!(is_supported_document(media_type), "{media_type} missing");
        }
    }

    #[test]
    fn test_generic_binary_is_rejected() {
        assert!(!is_supported_document(GENERIC_BINARY));
        assert!(!is_supported_document("audio/webm"));
    }

    #[test]
    fn test_unsupported_message_literal() {
        assert_eq!(
            unsupported_media_type_message("application/zip"),
            "Unsupported file type: application/zip. Supported types are: PDF, JavaScript, Python, TXT, HTML, CSS, Markdown, CSV, XML, RTF, PNG, JPEG, GIF, WEBP, SVG, TIFF"
        );
    }
}
