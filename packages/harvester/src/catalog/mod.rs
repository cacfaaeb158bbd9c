//! Catalog document parsing.
//!
//! A catalog declares its field mapping once in a header section and then
//! lists broadcast entries whose children use the declared tags. Parsing is
//! a single streaming pass; see [`CatalogParser`] for the state machine.

mod mapping;
mod parser;

use std::io::Read;

use reqwest::blocking::Client;

use crate::error::{HarvesterError, Result};
use crate::source::open_document;
use crate::types::Filmliste;
use crate::xml::read_events;

pub use mapping::{FieldMapping, FieldMappingBuilder};
pub use parser::{is_retained, CatalogParser, ENTRY_ELEMENT, HEADER_ELEMENT};

/// Parse a catalog document from a byte stream.
///
/// # Arguments
/// * `source` - Catalog XML
/// * `now` - Reference time in epoch seconds for the retention predicate
///
/// # Returns
/// The retained broadcasts in document order. A malformed document fails
/// the whole parse; nothing collected before the error is returned.
pub fn parse_catalog<R: Read>(source: R, now: i64) -> Result<Filmliste> {
    let mut parser = CatalogParser::new(now);
    read_events(source, &mut parser)?;
    Ok(parser.finish())
}

/// Fetch and parse a catalog from a URL or file path.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `location` - Catalog location, optionally `.bz2`/`.gz` compressed
/// * `now` - Reference time in epoch seconds
pub fn download_catalog(client: &Client, location: &str, now: i64) -> Result<Filmliste> {
    let stream = open_document(client, location).map_err(|e| {
        if let HarvesterError::Http(source) = e {
            HarvesterError::CatalogDownload {
                url: location.to_string(),
                source,
            }
        } else {
            e
        }
    })?;

    let liste = parse_catalog(stream, now)?;
    tracing::info!(
        location = %location,
        retained = liste.len(),
        dropped = liste.dropped(),
        "Parsed catalog"
    );
    Ok(liste)
}
