//! Year classification.
//!
//! A file's bucket comes from its embedded timestamps when any of them carry a plausible year, otherwise from a
//! directory in its path named after a year, otherwise it is [`BucketId::UNKNOWN`].

use derive_more::Display;
use mediapart_extract::models::{DateField, Metadata};
use regex::Regex;
use serde::Serialize;
use std::ops::RangeInclusive;
use std::path::{MAIN_SEPARATOR_STR, Path};
use std::sync::LazyLock;
use tracing::instrument;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Date-like values such as "2014:03:10 10:00:00", "2014-03-10" or "2014/3/10".
regex!(DATE_REGEX, r"^(\d+)[:/-]\d+[:/-]\d+");
// Greedy prefix, so the deepest year-named directory wins.
regex!(PATH_YEAR_REGEX, &format!(r"(?s)^.*{sep}([12]\d{{3}}){sep}", sep = regex::escape(MAIN_SEPARATOR_STR)));

const PLAUSIBLE_YEARS: RangeInclusive<u16> = 1000..=2999;

/// A year bucket. Displays as the year, or `0` for [`UNKNOWN`](Self::UNKNOWN), which is also the bucket's
/// directory name.
#[derive(Clone, Copy, Debug, Display, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BucketId(u16);

impl BucketId {
    pub const UNKNOWN: Self = Self(0);

    /// Returns `None` for years outside 1000–2999.
    pub fn year(year: u16) -> Option<Self> {
        PLAUSIBLE_YEARS.contains(&year).then_some(Self(year))
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

/// How a bucket was decided.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    #[display("metadata")]
    Metadata,
    #[display("path-hint")]
    PathHint,
    #[display("unknown")]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub bucket: BucketId,
    pub method: Method,
}

/// Decide the bucket for `path`.
///
/// Deterministic and free of shared state; safe to call from any number of threads.
#[instrument(level = "trace", skip_all, fields(path = %path.display()))]
pub fn classify(path: &Path, metadata: Option<&Metadata>) -> Classification {
    if let Some(bucket) = metadata.and_then(year_from_metadata) {
        return Classification { bucket, method: Method::Metadata };
    }
    if let Some(bucket) = year_from_path(path) {
        return Classification { bucket, method: Method::PathHint };
    }
    Classification { bucket: BucketId::UNKNOWN, method: Method::Unknown }
}

fn year_from_metadata(metadata: &Metadata) -> Option<BucketId> {
    DateField::PRIORITY.into_iter().filter_map(|field| metadata.get(field)).find_map(year_from_date)
}

fn year_from_date(value: &str) -> Option<BucketId> {
    let captures = DATE_REGEX.captures(value.trim())?;
    // Digit runs too long for a u16 are not years either.
    let year = captures.get(1)?.as_str().parse().ok()?;
    BucketId::year(year)
}

fn year_from_path(path: &Path) -> Option<BucketId> {
    let path = path.to_string_lossy();
    let captures = PATH_YEAR_REGEX.captures(&path)?;
    BucketId::year(captures.get(1)?.as_str().parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn path(parts: &[&str]) -> PathBuf {
        let mut path = PathBuf::from(MAIN_SEPARATOR_STR);
        path.extend(parts);
        path
    }

    #[rstest]
    #[case("2014:03:10 10:00:00", Some(2014))]
    #[case("  1999-12-31 ", Some(1999))]
    #[case("2001/1/2", Some(2001))]
    #[case("0000:00:00 00:00:00", None)]
    #[case("0999:01:01", None)]
    #[case("3000:01:01", None)]
    #[case("99999:01:01", None)]
    #[case("2014", None)]
    #[case("March 10, 2014", None)]
    #[case("", None)]
    fn test_year_from_date(#[case] value: &str, #[case] expected: Option<u16>) {
        assert_eq!(year_from_date(value).map(|b| b.get()), expected);
    }

    #[test]
    fn test_metadata_wins() {
        let metadata = Metadata::new().with(DateField::Original, "2014:03:10 10:00:00");
        let result = classify(&path(&["photos", "2009", "a.jpg"]), Some(&metadata));
        assert_eq!(result, Classification { bucket: BucketId(2014), method: Method::Metadata });
    }

    #[test]
    fn test_field_priority() {
        let metadata = Metadata::new()
            .with(DateField::Modified, "2020:01:01 00:00:00")
            .with(DateField::Digitized, "2011:01:01 00:00:00")
            .with(DateField::Original, "garbage");
        let result = classify(&path(&["a.jpg"]), Some(&metadata));
        assert_eq!(result.bucket, BucketId(2011));
        assert_eq!(result.method, Method::Metadata);
    }

    #[test]
    fn test_implausible_metadata_falls_through() {
        let metadata = Metadata::new().with(DateField::Original, "0000:00:00 00:00:00");
        let result = classify(&path(&["photos", "2009", "a.jpg"]), Some(&metadata));
        assert_eq!(result, Classification { bucket: BucketId(2009), method: Method::PathHint });
    }

    #[rstest]
    #[case(&["photos", "2009", "a.jpg"], Some(2009))]
    #[case(&["2001", "trip", "2009", "b", "a.jpg"], Some(2009))]
    #[case(&["photos", "20091", "a.jpg"], None)]
    #[case(&["photos", "3009", "a.jpg"], None)]
    #[case(&["photos", "2009.jpg"], None)]
    #[case(&["photos", "trip-2009", "a.jpg"], None)]
    fn test_path_hint(#[case] parts: &[&str], #[case] expected: Option<u16>) {
        assert_eq!(year_from_path(&path(parts)).map(|b| b.get()), expected);
    }

    #[test]
    fn test_unknown() {
        let empty = Metadata::new();
        for metadata in [None, Some(&empty)] {
            let result = classify(&path(&["photos", "misc", "a.jpg"]), metadata);
            assert_eq!(result, Classification { bucket: BucketId::UNKNOWN, method: Method::Unknown });
        }
    }

    #[test]
    fn test_deterministic() {
        let metadata = Metadata::new().with(DateField::Creation, "2016-05-05");
        let input = path(&["x", "2003", "clip.mov"]);
        let first = classify(&input, Some(&metadata));
        assert!((0..10).all(|_| classify(&input, Some(&metadata)) == first));
    }

    #[test]
    fn test_display() {
        assert_eq!(BucketId::UNKNOWN.to_string(), "0");
        assert_eq!(BucketId::year(2014).unwrap().to_string(), "2014");
        assert_eq!(Method::PathHint.to_string(), "path-hint");
        assert!(BucketId::year(999).is_none());
    }
}
