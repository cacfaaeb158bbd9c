//! Mediathek Harvester - Build a broadcast list from the MediathekView catalog.
//!
//! This crate resolves the current catalog mirror from a small control
//! document, stream-parses the (large, usually compressed) catalog and
//! writes the retained broadcasts as JSON.
//!
//! # Example
//!
//! ```
//! use mediathek_harvester::catalog::parse_catalog;
//!
//! let xml = "<Filmliste>\
//!              <Feldinfo><a>Sender</a><b>Titel</b></Feldinfo>\
//!              <X><a>ARD</a><b>Tagesschau</b></X>\
//!            </Filmliste>";
//! let liste = parse_catalog(xml.as_bytes(), 1_700_000_000).unwrap();
//! assert_eq!(liste.broadcasts()[0].titel.as_deref(), Some("Tagesschau"));
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants and location validation
//! - [`types`]: Core data types (MirrorCandidate, Broadcast, Filmliste)
//! - [`error`]: Error types and Result alias
//! - [`temporal`]: Date, time and duration normalization
//! - [`xml`]: Streaming event reader
//! - [`mirror`]: Mirror selection from the control document
//! - [`catalog`]: Field mapping and record building for the catalog
//! - [`http`]: HTTP client with retries
//! - [`source`]: Opening local or remote, optionally compressed documents
//! - [`json`]: JSON output generation
//! - [`cli`]: Command-line interface
//! - [`harvester`]: Main harvester service

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod harvester;
pub mod http;
pub mod json;
pub mod mirror;
pub mod source;
pub mod temporal;
pub mod types;
pub mod xml;

// Re-export main functions
pub use catalog::{download_catalog, parse_catalog};
pub use harvester::{harvest, harvest_with, Harvest};
pub use mirror::{resolve_mirror, select_mirror};

// Re-export commonly used items
pub use config::validate_location;
pub use error::{HarvesterError, Result};
pub use types::{Broadcast, Field, Filmliste, MirrorCandidate};
