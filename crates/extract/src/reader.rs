//! EXIF timestamp extraction via [`kamadak-exif`](exif).

use crate::error::{ErrorKind, Result};
use crate::models::{DateField, Metadata};
use crate::MetadataExtractor;
use exif::{In, Reader, Tag, Value};
use exn::ResultExt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::instrument;

/// EXIF tags carrying timestamps, and the field each one populates.
const DATE_TAGS: [(Tag, DateField); 3] = [
    (Tag::DateTimeOriginal, DateField::Original),
    (Tag::DateTimeDigitized, DateField::Digitized),
    (Tag::DateTime, DateField::Modified),
];

/// Reads EXIF timestamps from any container `kamadak-exif` understands
/// (JPEG, TIFF, HEIF, PNG and WebP).
///
/// Files without an EXIF block, or whose EXIF block has no timestamp tags,
/// yield `Ok(None)`. Video containers are not understood and yield an
/// [`ErrorKind::Container`] error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifExtractor;

impl MetadataExtractor for ExifExtractor {
    #[instrument(level = "trace", skip(self), fields(path = %path.display()))]
    fn extract(&self, path: &Path) -> Result<Option<Metadata>> {
        let file = File::open(path).or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
        let mut reader = BufReader::new(file);
        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(None),
            Err(e) => exn::bail!(ErrorKind::Container(e.to_string())),
        };
        let metadata: Metadata = DATE_TAGS
            .iter()
            .filter_map(|(tag, field)| {
                let value = exif.get_field(*tag, In::PRIMARY)?;
                first_ascii(&value.value).map(|text| (*field, text))
            })
            .collect();
        Ok((!metadata.is_empty()).then_some(metadata))
    }
}

/// EXIF ASCII values are NUL-separated lists; timestamps only ever use the first.
fn first_ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|text| !text.is_empty()),
        _ => None,
    }
}
