//! Attachments and the validated attachment set.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ValidationError;
use crate::files::RawFile;

pub const PDF_MIME: &str = "application/pdf";

/// Kind of an accepted attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Image,
    Pdf,
}

impl ContentKind {
    /// Maps a MIME-like string onto an accepted kind.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        if mime.eq_ignore_ascii_case(PDF_MIME) {
            Some(Self::Pdf)
        } else if mime
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        {
            Some(Self::Image)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One accepted file. Immutable once part of a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    name: String,
    mime: String,
    kind: ContentKind,
    size: u64,
}

impl Attachment {
    fn from_raw(raw: RawFile, kind: ContentKind) -> Self {
        Self {
            path: raw.path,
            name: raw.name,
            mime: raw.mime,
            kind,
            size: raw.size,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_image(&self) -> bool {
        self.kind == ContentKind::Image
    }
}

/// Monotonic counter distinguishing successive attachment sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Validates a raw selection.
///
/// Runs the PDF exclusivity rule on the unfiltered input first, then drops
/// anything that is neither an image nor a PDF. Order is preserved.
///
/// # Errors
/// `MixedPdfBatch` if a PDF comes with any other file, `NoSupportedFiles` if
/// nothing survives the type filter.
pub fn validate_selection(raw: Vec<RawFile>) -> Result<Vec<Attachment>, ValidationError> {
    let has_pdf = raw
        .iter()
        .any(|f| ContentKind::from_mime(&f.mime) == Some(ContentKind::Pdf));
    if has_pdf && raw.len() > 1 {
        return Err(ValidationError::MixedPdfBatch);
    }

    let accepted: Vec<Attachment> = raw
        .into_iter()
        .filter_map(|f| ContentKind::from_mime(&f.mime).map(|kind| Attachment::from_raw(f, kind)))
        .collect();

    if accepted.is_empty() {
        return Err(ValidationError::NoSupportedFiles);
    }
    Ok(accepted)
}

/// Ordered, index-stable attachments of one session lifecycle.
///
/// Either empty, a single PDF, or one-or-more images. Only constructible
/// from a validated selection.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSet {
    items: Vec<Arc<Attachment>>,
    generation: Generation,
}

impl AttachmentSet {
    pub(crate) fn from_validated(items: Vec<Attachment>, generation: Generation) -> Self {
        let set = Self {
            items: items.into_iter().map(Arc::new).collect(),
            generation,
        };
        debug_assert!(set.is_conforming(), "validated set broke the kind rule");
        set
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Attachment>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Attachment>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Arc<Attachment>] {
        &self.items
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the set satisfies the single-PDF / all-images rule.
    pub fn is_conforming(&self) -> bool {
        match self.items.as_slice() {
            [] | [_] => true,
            many => many.iter().all(|a| a.kind == ContentKind::Image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, mime: &str) -> RawFile {
        RawFile::new(name, mime, 10)
    }

    fn names(items: &[Attachment]) -> Vec<&str> {
        items.iter().map(Attachment::name).collect()
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(ContentKind::from_mime("image/png"), Some(ContentKind::Image));
        assert_eq!(ContentKind::from_mime("IMAGE/JPEG"), Some(ContentKind::Image));
        assert_eq!(ContentKind::from_mime("application/pdf"), Some(ContentKind::Pdf));
        assert_eq!(ContentKind::from_mime("text/plain"), None);
        assert_eq!(ContentKind::from_mime("image"), None);
        assert_eq!(ContentKind::from_mime(""), None);
    }

    #[test]
    fn test_pdf_with_anything_else_is_rejected() {
        let cases = vec![
            vec![raw("a.pdf", PDF_MIME), raw("b.png", "image/png")],
            vec![raw("b.png", "image/png"), raw("a.pdf", PDF_MIME)],
            vec![raw("a.pdf", PDF_MIME), raw("b.pdf", PDF_MIME)],
            vec![raw("a.pdf", PDF_MIME), raw("notes.txt", "text/plain")],
        ];
        for case in cases {
            assert_eq!(
                validate_selection(case),
                Err(ValidationError::MixedPdfBatch)
            );
        }
    }

    #[test]
    fn test_single_pdf_is_accepted() {
        let accepted = validate_selection(vec![raw("a.pdf", PDF_MIME)]).unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].kind(), ContentKind::Pdf);
    }

    #[test]
    fn test_images_are_filtered_in_order() {
        let accepted = validate_selection(vec![
            raw("3.png", "image/png"),
            raw("notes.txt", "text/plain"),
            raw("1.jpg", "image/jpeg"),
            raw("blob", "application/octet-stream"),
            raw("2.gif", "image/gif"),
        ])
        .unwrap();
        assert_eq!(names(&accepted), vec!["3.png", "1.jpg", "2.gif"]);
    }

    #[test]
    fn test_nothing_supported_is_rejected() {
        assert_eq!(
            validate_selection(vec![raw("notes.txt", "text/plain")]),
            Err(ValidationError::NoSupportedFiles)
        );
        assert_eq!(validate_selection(Vec::new()), Err(ValidationError::NoSupportedFiles));
    }

    #[test]
    fn test_validated_sets_conform() {
        let set = AttachmentSet::from_validated(
            validate_selection(vec![raw("a.png", "image/png"), raw("b.webp", "image/webp")])
                .unwrap(),
            Generation::default().next(),
        );
        assert!(set.is_conforming());
        assert_eq!(set.len(), 2);
        assert_eq!(set.generation().value(), 1);
        assert!(AttachmentSet::default().is_conforming());
    }
}
