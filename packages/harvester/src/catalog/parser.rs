//! Catalog record builder.
//!
//! Consumes reader events for a catalog document in two phases. While the
//! header (`FELDINFO`) is open, its children are collected into a
//! [`FieldMappingBuilder`]. Once it closes the mapping is frozen and every
//! entry (`X`) is assembled into a [`RawRecord`], normalized and either kept
//! or dropped by the retention predicate.

use std::mem;

use crate::catalog::mapping::{FieldMapping, FieldMappingBuilder};
use crate::config::RETENTION_MIN_AGE_SECS;
use crate::types::{Field, Filmliste, RawRecord};
use crate::xml::{Attribute, XmlHandler};

/// Element enclosing the field declarations.
pub const HEADER_ELEMENT: &str = "FELDINFO";

/// Element enclosing one broadcast entry.
pub const ENTRY_ELEMENT: &str = "X";

/// Whether an entry with this timestamp is kept.
///
/// Entries are kept only when they are more than thirty days old at `now`.
/// An unknown timestamp (`0`) is always old enough.
///
/// # Examples
/// ```
/// use mediathek_harvester::catalog::is_retained;
///
/// let now = 1_700_000_000;
/// assert!(is_retained(now - 40 * 86_400, now));
/// assert!(!is_retained(now - 10 * 86_400, now));
/// assert!(is_retained(0, now));
/// ```
#[must_use]
pub fn is_retained(timestamp: i64, now: i64) -> bool {
    now.saturating_sub(timestamp) > RETENTION_MIN_AGE_SECS
}

/// What happens to text inside an entry's child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildSlot {
    /// Text belongs to a kept field.
    Capture(Field),
    /// Unmapped tag or a field outside the filter set.
    Discard,
}

/// An entry being assembled.
#[derive(Debug)]
struct OpenEntry {
    record: RawRecord,
    child: Option<ChildSlot>,
}

impl OpenEntry {
    fn new() -> Self {
        Self {
            record: RawRecord::new(),
            child: None,
        }
    }
}

#[derive(Debug)]
enum CatalogState {
    /// Nothing relevant seen yet.
    Preamble,
    /// Header open; `field` is the tag currently being declared.
    Header {
        builder: FieldMappingBuilder,
        field: Option<String>,
    },
    /// Mapping frozen; entries are assembled one at a time.
    Body {
        mapping: FieldMapping,
        entry: Option<OpenEntry>,
    },
}

/// Event handler building the output collection from a catalog document.
#[derive(Debug)]
pub struct CatalogParser {
    state: CatalogState,
    now: i64,
    liste: Filmliste,
}

impl CatalogParser {
    /// Create a parser judging entry age against `now` (epoch seconds).
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self {
            state: CatalogState::Preamble,
            now,
            liste: Filmliste::new(),
        }
    }

    /// The frozen field mapping, once the body phase has started.
    #[must_use]
    pub fn mapping(&self) -> Option<&FieldMapping> {
        match &self.state {
            CatalogState::Body { mapping, .. } => Some(mapping),
            _ => None,
        }
    }

    /// Finish parsing and hand out the collection.
    #[must_use]
    pub fn finish(self) -> Filmliste {
        self.liste
    }

    /// Leave the header phase. The mapping cannot change afterwards.
    fn freeze_mapping(&mut self, entry: Option<OpenEntry>) {
        let mapping = match mem::replace(&mut self.state, CatalogState::Preamble) {
            CatalogState::Header { builder, .. } => builder.build(),
            CatalogState::Body { mapping, .. } => mapping,
            CatalogState::Preamble => FieldMapping::default(),
        };
        tracing::debug!(tags = mapping.len(), "Field mapping frozen");
        self.state = CatalogState::Body { mapping, entry };
    }

    fn close_entry(&mut self, entry: OpenEntry) {
        let broadcast = entry.record.normalize();
        if is_retained(broadcast.timestamp, self.now) {
            self.liste.push(broadcast);
        } else {
            self.liste.record_dropped();
        }
    }
}

impl XmlHandler for CatalogParser {
    fn start_element(&mut self, name: &str, _attributes: &[Attribute]) {
        match &mut self.state {
            CatalogState::Preamble => {
                if name == HEADER_ELEMENT {
                    self.state = CatalogState::Header {
                        builder: FieldMappingBuilder::new(),
                        field: None,
                    };
                } else if name == ENTRY_ELEMENT {
                    // No header before the first entry: nothing maps.
                    self.freeze_mapping(Some(OpenEntry::new()));
                }
            }
            CatalogState::Header { builder, field } => {
                if field.is_none() {
                    builder.declare(name);
                    *field = Some(name.to_string());
                }
            }
            CatalogState::Body { mapping, entry } => {
                if let Some(open) = entry.as_mut() {
                    if open.child.is_none() {
                        open.child = Some(match mapping.resolve(name) {
                            Some(field) => ChildSlot::Capture(field),
                            None => ChildSlot::Discard,
                        });
                    }
                } else if name == ENTRY_ELEMENT {
                    *entry = Some(OpenEntry::new());
                }
            }
        }
    }

    fn end_element(&mut self, name: &str) {
        match &mut self.state {
            CatalogState::Preamble => {}
            CatalogState::Header { field, .. } => {
                if field.is_some() {
                    *field = None;
                } else if name == HEADER_ELEMENT {
                    self.freeze_mapping(None);
                }
            }
            CatalogState::Body { entry, .. } => {
                let Some(open) = entry.as_mut() else {
                    return;
                };
                if open.child.is_some() {
                    open.child = None;
                } else if name == ENTRY_ELEMENT {
                    if let Some(closed) = entry.take() {
                        self.close_entry(closed);
                    }
                }
            }
        }
    }

    fn characters(&mut self, text: &str) {
        match &mut self.state {
            CatalogState::Header {
                builder,
                field: Some(tag),
            } => builder.append(tag, text),
            CatalogState::Body {
                entry:
                    Some(OpenEntry {
                        record,
                        child: Some(ChildSlot::Capture(field)),
                    }),
                ..
            } => record.append(*field, text),
            _ => {}
        }
    }
}
