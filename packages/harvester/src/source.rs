//! Opening documents as byte streams.
//!
//! A location is either an http(s) URL or a local file path. Locations
//! ending in `.bz2` or `.gz` are decompressed on the fly, so the parsers
//! always see plain XML.

use std::fs::File;
use std::io::Read;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use reqwest::blocking::Client;

use crate::config::{is_remote, validate_location, Compression};
use crate::error::Result;
use crate::http::open_stream;

/// A document body ready to be fed to the event reader.
pub type DocumentStream = Box<dyn Read + Send>;

/// Open a document for streaming.
///
/// # Arguments
/// * `client` - HTTP client, used for remote locations only
/// * `location` - http(s) URL or file path
pub fn open_document(client: &Client, location: &str) -> Result<DocumentStream> {
    validate_location(location)?;

    let raw: DocumentStream = if is_remote(location) {
        tracing::debug!(url = %location, "Opening remote document");
        Box::new(open_stream(client, location)?)
    } else {
        tracing::debug!(path = %location, "Opening local document");
        Box::new(File::open(location)?)
    };

    Ok(decompress(raw, Compression::from_location(location)))
}

/// Wrap a raw stream in the decoder for its compression.
pub fn decompress(raw: DocumentStream, compression: Compression) -> DocumentStream {
    match compression {
        Compression::None => raw,
        Compression::Gzip => Box::new(MultiGzDecoder::new(raw)),
        Compression::Bzip2 => Box::new(MultiBzDecoder::new(raw)),
    }
}
