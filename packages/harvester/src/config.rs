//! Configuration constants and validation functions for the harvester.

use chrono_tz::Tz;

use crate::error::{HarvesterError, Result};

/// Well-known location of the control document listing catalog mirrors.
pub const CONTROL_DOCUMENT_URL: &str = "http://zdfmediathk.sourceforge.net/update.xml";

/// HTTP connect timeout in seconds.
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP timeout for a whole request in seconds.
///
/// The catalog body is streamed, so this has to cover the complete transfer
/// of a large compressed file over a slow mirror.
pub const HTTP_TIMEOUT_SECS: u64 = 30 * 60;

/// Maximum number of attempts for transient HTTP failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Size of the chunks pulled from the byte stream while parsing.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Entries younger than this (in seconds) are dropped from the output.
pub const RETENTION_MIN_AGE_SECS: i64 = 3600 * 24 * 30;

/// Default output file for the JSON collection.
pub const DEFAULT_OUTPUT_FILE: &str = "filmliste.json";

/// Time zone the catalog's civil dates and times are expressed in.
pub const CATALOG_TIME_ZONE: Tz = chrono_tz::Europe::Berlin;

/// Compression applied to a document, derived from its location suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain XML.
    None,
    /// `.gz`
    Gzip,
    /// `.bz2`
    Bzip2,
}

impl Compression {
    /// Detect compression from a location's suffix.
    ///
    /// # Examples
    /// ```
    /// use mediathek_harvester::config::Compression;
    ///
    /// assert_eq!(Compression::from_location("Filmliste-akt.bz2"), Compression::Bzip2);
    /// assert_eq!(Compression::from_location("/tmp/liste.xml.gz"), Compression::Gzip);
    /// assert_eq!(Compression::from_location("liste.xml"), Compression::None);
    /// ```
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        if location.ends_with(".bz2") {
            Self::Bzip2
        } else if location.ends_with(".gz") {
            Self::Gzip
        } else {
            Self::None
        }
    }
}

/// Whether a location names a remote document.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Validate a document location before any I/O happens.
///
/// Accepts `http://` and `https://` URLs and plain file paths. Rejects empty
/// locations and other URL schemes (`ftp://`, `file://`, ...).
///
/// # Examples
/// ```
/// use mediathek_harvester::config::validate_location;
///
/// assert!(validate_location("http://example.org/Filmliste-akt.bz2").is_ok());
/// assert!(validate_location("./filmliste.xml").is_ok());
/// assert!(validate_location("").is_err());
/// assert!(validate_location("ftp://example.org/liste.xml").is_err());
/// ```
pub fn validate_location(location: &str) -> Result<()> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(HarvesterError::InvalidLocation(location.to_string()));
    }
    if trimmed.contains("://") && !is_remote(trimmed) {
        return Err(HarvesterError::InvalidLocation(location.to_string()));
    }
    Ok(())
}
