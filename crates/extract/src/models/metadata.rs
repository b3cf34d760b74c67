use super::DateField;
use std::collections::BTreeMap;

/// Date-like strings extracted from a single file.
///
/// Values are kept verbatim (e.g. `"2014:03:10 10:00:00"`); interpreting them
/// is the classifier's job. Iteration always follows [`DateField`] priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    dates: BTreeMap<DateField, String>,
}
impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: DateField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: DateField, value: impl Into<String>) {
        self.dates.insert(field, value.into());
    }

    pub fn get(&self, field: DateField) -> Option<&str> {
        self.dates.get(&field).map(String::as_str)
    }

    /// All present fields, highest priority first.
    pub fn dates(&self) -> impl Iterator<Item = (DateField, &str)> {
        self.dates.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
}
impl FromIterator<(DateField, String)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (DateField, String)>>(iter: T) -> Self {
        Self { dates: iter.into_iter().collect() }
    }
}
