//! Timestamp metadata extraction for media files.
//!
//! The partitioning engine only ever asks one question of a file's contents:
//! "which date-like strings does it carry?". [`MetadataExtractor`] is that
//! seam. [`ExifExtractor`] answers it from EXIF blocks, [`TrackExtractor`]
//! from video container metadata, and [`FirstMatch`] asks several in turn.
//! [`NoMetadata`] never answers, which forces classification down to path
//! hints.

pub mod error;
pub mod models;
mod reader;
mod track;

pub use crate::reader::ExifExtractor;
pub use crate::track::TrackExtractor;
use crate::error::Result;
use crate::models::Metadata;
use std::path::Path;

/// Extracts date-like metadata from a file.
///
/// Implementations are shared by every worker thread, so they must be
/// [`Send`] + [`Sync`].
pub trait MetadataExtractor: Send + Sync {
    /// Returns `Ok(None)` when the file is readable but carries no relevant
    /// field. Corrupt or unsupported input is an `Err`, which callers are
    /// expected to treat exactly like `Ok(None)`.
    fn extract(&self, path: &Path) -> Result<Option<Metadata>>;
}

/// Extractor that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataExtractor for NoMetadata {
    fn extract(&self, _path: &Path) -> Result<Option<Metadata>> {
        Ok(None)
    }
}

/// Asks each extractor in order and keeps the first one that finds anything.
pub struct FirstMatch {
    extractors: Vec<Box<dyn MetadataExtractor>>,
}

impl FirstMatch {
    pub fn new(extractors: Vec<Box<dyn MetadataExtractor>>) -> Self {
        Self { extractors }
    }

    /// EXIF first for photos, then container metadata for videos.
    pub fn media() -> Self {
        Self::new(vec![Box::new(ExifExtractor), Box::new(TrackExtractor)])
    }
}

impl std::fmt::Debug for FirstMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstMatch").field("extractors", &self.extractors.len()).finish()
    }
}

impl MetadataExtractor for FirstMatch {
    /// The last extractor's outcome is returned when none finds anything.
    fn extract(&self, path: &Path) -> Result<Option<Metadata>> {
        let mut outcome = Ok(None);
        for extractor in &self.extractors {
            match extractor.extract(path) {
                Ok(Some(metadata)) => return Ok(Some(metadata)),
                // Every later extractor would fail to open it too.
                Err(err) if err.is_retryable() => return Err(err),
                other => outcome = other,
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::DateField;
    use rstest::rstest;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy, Debug)]
    enum Answer {
        Found(&'static str),
        Nothing,
        Unreadable,
        Broken,
    }

    struct Scripted {
        answer: Answer,
        calls: Arc<AtomicUsize>,
    }

    impl MetadataExtractor for Scripted {
        fn extract(&self, path: &Path) -> Result<Option<Metadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Found(date) => Ok(Some(Metadata::new().with(DateField::Creation, date))),
                Answer::Nothing => Ok(None),
                Answer::Unreadable => Err(ErrorKind::Open(path.to_path_buf()).into()),
                Answer::Broken => Err(ErrorKind::Container("bad".to_string()).into()),
            }
        }
    }

    fn chain(answers: &[Answer]) -> (FirstMatch, Vec<Arc<AtomicUsize>>) {
        let calls: Vec<_> = answers.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let extractors = answers
            .iter()
            .zip(&calls)
            .map(|(answer, calls)| Box::new(Scripted { answer: *answer, calls: calls.clone() }) as Box<dyn MetadataExtractor>)
            .collect();
        (FirstMatch::new(extractors), calls)
    }

    #[rstest]
    #[case(&[Answer::Found("2014"), Answer::Found("2020")], Some("2014"), &[1, 0])]
    #[case(&[Answer::Broken, Answer::Found("2020")], Some("2020"), &[1, 1])]
    #[case(&[Answer::Nothing, Answer::Found("2020")], Some("2020"), &[1, 1])]
    #[case(&[Answer::Nothing, Answer::Nothing], None, &[1, 1])]
    fn test_first_match(#[case] answers: &[Answer], #[case] expected: Option<&str>, #[case] expected_calls: &[usize]) {
        let (extractor, calls) = chain(answers);
        let metadata = extractor.extract(Path::new("/media/clip.mov")).unwrap();
        assert_eq!(metadata.as_ref().and_then(|m| m.get(DateField::Creation)), expected);
        let calls: Vec<usize> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
        assert_eq!(calls, expected_calls);
    }

    #[test]
    fn test_unreadable_file_stops_the_chain() {
        let (extractor, calls) = chain(&[Answer::Unreadable, Answer::Found("2020")]);
        let err = extractor.extract(Path::new("/media/clip.mov")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Open(_)));
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_broken_reports_last_error() {
        let (extractor, _) = chain(&[Answer::Nothing, Answer::Broken]);
        let err = extractor.extract(Path::new("/media/clip.mov")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Container(_)));
    }

    #[test]
    fn test_media_chain_on_missing_file() {
        let err = FirstMatch::media().extract(&PathBuf::from("/nonexistent/clip.mp4")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Open(_)));
    }
}
