//! Path normalization + content-kind inference for selected files.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::paths;

/// Fallback MIME type when neither magic bytes nor extension identify the file.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Number of leading bytes read for magic-byte detection.
const SNIFF_LEN: usize = 8192;

/// A file as picked by the user, before validation.
///
/// Carries the MIME-like content kind the selector validates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl RawFile {
    /// Builds a raw file from already-known parts.
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            path,
            name,
            mime: mime.into(),
            size,
        }
    }

    /// Reads metadata and infers the content kind of the file at `path`.
    ///
    /// Magic bytes win over the extension; unknown files are reported as
    /// `application/octet-stream` so validation can reject them.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not a regular file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let mut file = File::open(path)?;
        let mut buffer = vec![0u8; SNIFF_LEN];
        let bytes_read = file.read(&mut buffer)?;

        let mime = sniff_mime(&buffer[..bytes_read])
            .or_else(|| path.to_str().and_then(mime_type_for_extension))
            .unwrap_or(OCTET_STREAM);

        Ok(Self::new(path, mime, metadata.len()))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Detects a MIME type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Normalizes user-provided file paths.
///
/// Handles common drag-and-drop shell escaping (`\ `, `\(`, `\)`), strips
/// surrounding quotes and expands `~/` to the home directory when available.
#[must_use]
pub fn normalize_input_path(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| {
            trimmed
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
        })
        .unwrap_or(trimmed);

    let unescaped = unquoted
        .replace("\\ ", " ")
        .replace("\\(", "(")
        .replace("\\)", ")");

    if let Some(rest) = unescaped.strip_prefix("~/")
        && let Some(home) = paths::home_dir()
    {
        return home.join(rest);
    }

    PathBuf::from(unescaped)
}

/// Returns the MIME type inferred from a file extension for accepted kinds.
#[must_use]
pub fn mime_type_for_extension(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension().and_then(|e| e.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Whether the file picker should offer this path.
#[must_use]
pub fn is_supported_extension(path: &str) -> bool {
    mime_type_for_extension(path).is_some()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_extension_mapping() {
        assert_eq!(mime_type_for_extension("a.PNG"), Some("image/png"));
        assert_eq!(mime_type_for_extension("scan.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_type_for_extension("doc.pdf"), Some("application/pdf"));
        assert_eq!(mime_type_for_extension("notes.txt"), None);
        assert_eq!(mime_type_for_extension("Makefile"), None);
    }

    #[test]
    fn test_supported_extension_filter() {
        assert!(is_supported_extension("dir/photo.webp"));
        assert!(is_supported_extension("report.PDF"));
        assert!(!is_supported_extension("archive.zip"));
    }

    #[test]
    fn test_normalize_unescapes_and_unquotes() {
        assert_eq!(
            normalize_input_path("my\\ scan\\ \\(1\\).png"),
            PathBuf::from("my scan (1).png")
        );
        assert_eq!(
            normalize_input_path("'/tmp/a b.pdf'"),
            PathBuf::from("/tmp/a b.pdf")
        );
    }

    #[test]
    fn test_from_path_prefers_magic_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mislabeled.pdf");
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        fs::write(&path, &bytes).unwrap();

        let raw = RawFile::from_path(&path).unwrap();
        assert_eq!(raw.mime, "image/png");
        assert_eq!(raw.name, "mislabeled.pdf");
        assert_eq!(raw.size, bytes.len() as u64);
    }

    #[test]
    fn test_from_path_detects_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paper");
        fs::write(&path, b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap();

        let raw = RawFile::from_path(&path).unwrap();
        assert_eq!(raw.mime, "application/pdf");
    }

    #[test]
    fn test_from_path_falls_back_to_extension_then_octet_stream() {
        let dir = tempdir().unwrap();

        let jpg = dir.path().join("empty.jpg");
        fs::write(&jpg, b"").unwrap();
        assert_eq!(RawFile::from_path(&jpg).unwrap().mime, "image/jpeg");

        let txt = dir.path().join("notes.txt");
        fs::write(&txt, b"plain words").unwrap();
        assert_eq!(RawFile::from_path(&txt).unwrap().mime, OCTET_STREAM);
    }

    #[test]
    fn test_from_path_rejects_directories_and_missing_files() {
        let dir = tempdir().unwrap();
        assert!(RawFile::from_path(dir.path()).is_err());
        assert!(RawFile::from_path(&dir.path().join("missing.png")).is_err());
    }
}
