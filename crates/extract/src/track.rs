//! Container creation dates for video files via [`nom-exif`](nom_exif).

use crate::MetadataExtractor;
use crate::error::{ErrorKind, Result};
use crate::models::{DateField, Metadata};
use exn::ResultExt;
use nom_exif::{MediaParser, MediaSource, TrackInfo, TrackInfoTag};
use std::fs::File;
use std::path::Path;
use tracing::instrument;

/// Reads the creation date recorded in a video container's track metadata.
///
/// Understands QuickTime/ISO-BMFF (MOV, MP4, M4V, 3GP) and Matroska (MKV, WebM). Files that are not track-based
/// media yield `Ok(None)`; AVI and WMV are not understood and yield an [`ErrorKind::Container`] error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackExtractor;

impl MetadataExtractor for TrackExtractor {
    #[instrument(level = "trace", skip(self), fields(path = %path.display()))]
    fn extract(&self, path: &Path) -> Result<Option<Metadata>> {
        let file = File::open(path).or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
        let source = MediaSource::file(file).map_err(|e| ErrorKind::Container(e.to_string()))?;
        if !source.has_track() {
            return Ok(None);
        }
        let mut parser = MediaParser::new();
        let info: TrackInfo = parser.parse(source).map_err(|e| ErrorKind::Container(e.to_string()))?;
        Ok(info
            .get(TrackInfoTag::CreateDate)
            .map(|value| Metadata::new().with(DateField::Creation, value.to_string().trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = TrackExtractor.extract(Path::new("/nonexistent/clip.mov")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Open(_)));
    }

    #[test]
    fn test_non_media_yields_nothing() {
        let mut file = tempfile::Builder::new().suffix(".mov").tempfile().unwrap();
        file.write_all(b"plain text pretending to be a movie").unwrap();
        file.flush().unwrap();
        assert!(!matches!(TrackExtractor.extract(file.path()), Ok(Some(_))));
    }
}
