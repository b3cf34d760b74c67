use derive_more::Display;

/// A named timestamp exposed by a metadata extractor.
///
/// Variants are declared in classification priority order, so the derived
/// [`Ord`] doubles as the order fields are tried in: capture time first,
/// generic modification time last.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateField {
    /// When the picture was taken (EXIF `DateTimeOriginal`).
    #[display("original")]
    Original,
    /// When the picture was stored as digital data (EXIF `DateTimeDigitized`).
    #[display("digitized")]
    Digitized,
    /// Container-level creation date (video and non-EXIF formats).
    #[display("creation")]
    Creation,
    /// Last time the file was changed by editing software (EXIF `DateTime`).
    #[display("modified")]
    Modified,
}
impl DateField {
    /// Every field, highest priority first.
    pub const PRIORITY: [DateField; 4] = [Self::Original, Self::Digitized, Self::Creation, Self::Modified];
}
