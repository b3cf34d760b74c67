mod field;
mod metadata;

pub use self::field::DateField;
pub use self::metadata::Metadata;
