//! Field mapping declared by a catalog's header section.
//!
//! The catalog body only carries short positional tags. The header lists
//! each tag once, with the semantic field name as its text:
//!
//! ```xml
//! <Feldinfo><a>Sender</a><b>Titel</b><c>Datum</c></Feldinfo>
//! ```
//!
//! A [`FieldMappingBuilder`] collects these pairs while the header is open
//! and is consumed into an immutable [`FieldMapping`] when it closes.

use std::collections::HashMap;

use crate::types::Field;

/// Collects tag → name pairs while the header section is open.
#[derive(Debug, Clone, Default)]
pub struct FieldMappingBuilder {
    names: HashMap<String, String>,
}

impl FieldMappingBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tag. A repeated declaration starts over with an empty name.
    pub fn declare(&mut self, tag: &str) {
        self.names.insert(tag.to_string(), String::new());
    }

    /// Append a chunk of the semantic name of a declared tag.
    pub fn append(&mut self, tag: &str, text: &str) {
        if let Some(name) = self.names.get_mut(tag) {
            name.push_str(text);
        }
    }

    /// Freeze the mapping.
    #[must_use]
    pub fn build(self) -> FieldMapping {
        FieldMapping { names: self.names }
    }
}

/// Immutable tag → semantic name lookup for one catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    names: HashMap<String, String>,
}

impl FieldMapping {
    /// Semantic name declared for a tag.
    #[must_use]
    pub fn name(&self, tag: &str) -> Option<&str> {
        self.names.get(tag).map(String::as_str)
    }

    /// Field a tag maps to, if that field is kept in the output.
    ///
    /// # Examples
    /// ```
    /// use mediathek_harvester::catalog::FieldMapping;
    /// use mediathek_harvester::types::Field;
    ///
    /// let mapping: FieldMapping = [("A", "Titel"), ("B", "Thema")].into_iter().collect();
    /// assert_eq!(mapping.resolve("A"), Some(Field::Titel));
    /// assert_eq!(mapping.resolve("B"), None);
    /// assert_eq!(mapping.resolve("Z"), None);
    /// ```
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<Field> {
        self.name(tag).and_then(Field::from_name)
    }

    /// Number of declared tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<T: Into<String>, N: Into<String>> FromIterator<(T, N)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (T, N)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(tag, name)| (tag.into(), name.into()))
                .collect(),
        }
    }
}
