//! Mirror selection from the control document.
//!
//! The control document lists one `SERVER` block per mirror:
//!
//! ```xml
//! <Mediathek>
//!   <Server>
//!     <URL>http://mirror.example/Filmliste-akt.bz2</URL>
//!     <Datum>14.10.2026</Datum>
//!     <Zeit>06:30:00</Zeit>
//!     <Prio>1</Prio>
//!   </Server>
//! </Mediathek>
//! ```
//!
//! The best mirror is the one with the highest priority, ties broken by
//! the freshest copy, further ties by document order.

use std::io::Read;

use reqwest::blocking::Client;

use crate::error::{HarvesterError, Result};
use crate::source::open_document;
use crate::temporal::{coerce_int, parse_timestamp};
use crate::types::MirrorCandidate;
use crate::xml::{read_events, Attribute, XmlHandler};

/// Element enclosing one mirror candidate.
pub const SERVER_ELEMENT: &str = "SERVER";

/// Which candidate field character data currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MirrorState {
    Idle,
    InUrl,
    InDate,
    InTime,
    InPriority,
}

impl MirrorState {
    fn for_element(name: &str) -> Option<Self> {
        match name {
            "URL" => Some(Self::InUrl),
            "DATUM" => Some(Self::InDate),
            "ZEIT" => Some(Self::InTime),
            "PRIO" => Some(Self::InPriority),
            _ => None,
        }
    }
}

/// Raw text of the candidate currently being read.
#[derive(Debug, Default)]
struct CandidateText {
    url: String,
    date: String,
    time: String,
    priority: String,
}

impl CandidateText {
    fn buffer(&mut self, state: MirrorState) -> Option<&mut String> {
        match state {
            MirrorState::Idle => None,
            MirrorState::InUrl => Some(&mut self.url),
            MirrorState::InDate => Some(&mut self.date),
            MirrorState::InTime => Some(&mut self.time),
            MirrorState::InPriority => Some(&mut self.priority),
        }
    }

    fn into_candidate(self) -> MirrorCandidate {
        MirrorCandidate {
            url: self.url.trim().to_string(),
            priority: coerce_int(&self.priority),
            timestamp: parse_timestamp(&self.date, &self.time),
        }
    }
}

/// Event handler picking the best mirror from a control document.
#[derive(Debug)]
pub struct MirrorSelector {
    state: MirrorState,
    current: CandidateText,
    best: MirrorCandidate,
}

impl Default for MirrorSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorSelector {
    /// Create a selector starting from the empty candidate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: MirrorState::Idle,
            current: CandidateText::default(),
            best: MirrorCandidate::default(),
        }
    }

    /// Best candidate seen so far.
    #[must_use]
    pub fn best(&self) -> &MirrorCandidate {
        &self.best
    }

    /// URL of the best candidate, empty if none beat the initial state.
    #[must_use]
    pub fn into_url(self) -> String {
        self.best.url
    }

    fn close_candidate(&mut self) {
        let candidate = std::mem::take(&mut self.current).into_candidate();
        if candidate.beats(&self.best) {
            tracing::debug!(
                url = %candidate.url,
                priority = candidate.priority,
                timestamp = candidate.timestamp,
                "New best mirror"
            );
            self.best = candidate;
        } else {
            tracing::trace!(url = %candidate.url, "Mirror candidate not better");
        }
        self.state = MirrorState::Idle;
    }
}

impl XmlHandler for MirrorSelector {
    fn start_element(&mut self, name: &str, _attributes: &[Attribute]) {
        if let Some(state) = MirrorState::for_element(name) {
            self.state = state;
            if let Some(buffer) = self.current.buffer(state) {
                buffer.clear();
            }
        }
    }

    fn end_element(&mut self, name: &str) {
        if name == SERVER_ELEMENT {
            self.close_candidate();
        } else if MirrorState::for_element(name).is_some() {
            self.state = MirrorState::Idle;
        }
    }

    fn characters(&mut self, text: &str) {
        if let Some(buffer) = self.current.buffer(self.state) {
            buffer.push_str(text);
        }
    }
}

/// Pick the best mirror from a control document stream.
///
/// # Returns
/// The winning candidate; its URL is empty when no block beat the initial
/// state.
pub fn select_mirror<R: Read>(source: R) -> Result<MirrorCandidate> {
    let mut selector = MirrorSelector::new();
    read_events(source, &mut selector)?;
    Ok(selector.best)
}

/// Fetch a control document and resolve the catalog URL it points to.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `control_url` - Location of the control document
///
/// # Returns
/// The best mirror's catalog URL, never empty
pub fn resolve_mirror(client: &Client, control_url: &str) -> Result<String> {
    let stream = open_document(client, control_url).map_err(|e| {
        if let HarvesterError::Http(source) = e {
            HarvesterError::ControlDownload {
                url: control_url.to_string(),
                source,
            }
        } else {
            e
        }
    })?;

    let best = select_mirror(stream)?;
    if best.url.is_empty() {
        return Err(HarvesterError::NoMirrorResolved {
            control_url: control_url.to_string(),
        });
    }

    tracing::info!(
        url = %best.url,
        priority = best.priority,
        timestamp = best.timestamp,
        "Resolved catalog mirror"
    );
    Ok(best.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn server(url: &str, date: &str, time: &str, prio: &str) -> String {
        format!(
            "<Server><URL>{url}</URL><Datum>{date}</Datum><Zeit>{time}</Zeit><Prio>{prio}</Prio></Server>"
        )
    }

    fn select(servers: &[String]) -> MirrorCandidate {
        let xml = format!("<Mediathek>{}</Mediathek>", servers.concat());
        select_mirror(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_highest_priority_wins_regardless_of_order_or_age() {
        let low = server("http://low", "14.10.2026", "06:00:00", "1");
        let high = server("http://high", "1.1.2010", "06:00:00", "2");

        assert_eq!(select(&[low.clone(), high.clone()]).url, "http://high");
        assert_eq!(select(&[high, low]).url, "http://high");
    }

    #[test]
    fn test_tie_broken_by_freshness() {
        let older = server("http://older", "13.10.2026", "06:00:00", "1");
        let newer = server("http://newer", "14.10.2026", "06:00:00", "1");
        assert_eq!(select(&[older.clone(), newer.clone()]).url, "http://newer");
        assert_eq!(select(&[newer, older]).url, "http://newer");
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let first = server("http://first", "14.10.2026", "06:00:00", "1");
        let second = server("http://second", "14.10.2026", "06:00:00", "1");
        assert_eq!(select(&[first, second]).url, "http://first");
    }

    #[test]
    fn test_best_carries_resolved_metadata() {
        let best = select(&[server("http://a", "1.1.2000", "10:00:00", "3")]);
        assert_eq!(best.priority, 3);
        assert_eq!(best.timestamp, 946_717_200);
    }

    #[test]
    fn test_url_is_trimmed() {
        let best = select(&[server("\n  http://a/liste.bz2  \n", "1.1.2000", "", "1")]);
        assert_eq!(best.url, "http://a/liste.bz2");
    }

    #[test]
    fn test_zero_priority_unknown_date_never_selected() {
        let best = select(&[server("http://a", "", "", "0")]);
        assert_eq!(best, MirrorCandidate::default());
    }

    #[test]
    fn test_buffers_reset_between_blocks() {
        let first = server("http://first", "1.1.2000", "", "1");
        // Second block has no PRIO, so its priority is 0 and it loses.
        let second = "<Server><URL>http://second</URL><Datum>2.1.2000</Datum></Server>".to_string();
        assert_eq!(select(&[first, second]).url, "http://first");
    }

    #[test]
    fn test_text_outside_fields_ignored() {
        let xml = "<Mediathek>noise<Server>more<URL>http://a</URL>tail<Prio>1</Prio></Server></Mediathek>";
        assert_eq!(select_mirror(xml.as_bytes()).unwrap().url, "http://a");
    }

    #[test]
    fn test_lenient_priority() {
        let best = select(&[server("http://a", "", "", " 5 (fast)")]);
        assert_eq!(best.priority, 5);
    }

    #[test]
    fn test_empty_document_yields_empty_url() {
        let mut selector = MirrorSelector::new();
        read_events(&b"<Mediathek/>"[..], &mut selector).unwrap();
        assert_eq!(selector.into_url(), "");
    }

    #[test]
    fn test_malformed_control_document() {
        let xml = "<Mediathek>\n<Server><URL>http://a</Server>\n</Mediathek>";
        match select_mirror(xml.as_bytes()) {
            Err(HarvesterError::MalformedDocument { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed document, got {other:?}"),
        }
    }
}
