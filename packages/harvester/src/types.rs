//! Core data types for the harvester.
//!
//! These types represent mirror candidates from the control document and
//! broadcast entries from the catalog document, from raw accumulated text
//! to the normalized records that end up in the output.

use serde::{Deserialize, Serialize};

use crate::temporal::{parse_duration, parse_timestamp};

/// Semantic catalog fields that are kept in the output.
///
/// The catalog may declare more fields in its header; those are read but
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Broadcasting station.
    Sender,
    /// Title of the broadcast.
    Titel,
    /// Broadcast date (`day.month.year`).
    Datum,
    /// Broadcast time (`HH:MM:SS`).
    Zeit,
    /// Running time (`H:MM:SS`).
    Dauer,
    /// Location of the video.
    Url,
}

impl Field {
    /// The fixed filter set, in output order.
    pub const ALL: [Self; 6] = [
        Self::Sender,
        Self::Titel,
        Self::Datum,
        Self::Zeit,
        Self::Dauer,
        Self::Url,
    ];

    /// Semantic name as declared in a catalog header.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "Sender",
            Self::Titel => "Titel",
            Self::Datum => "Datum",
            Self::Zeit => "Zeit",
            Self::Dauer => "Dauer",
            Self::Url => "Url",
        }
    }

    /// Look up a semantic name from a catalog header.
    ///
    /// Names match exactly; anything outside the filter set is `None`.
    ///
    /// # Examples
    /// ```
    /// use mediathek_harvester::types::Field;
    ///
    /// assert_eq!(Field::from_name("Titel"), Some(Field::Titel));
    /// assert_eq!(Field::from_name("Thema"), None);
    /// assert_eq!(Field::from_name("titel"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

/// A catalog mirror named by the control document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorCandidate {
    /// Location of the catalog on this mirror.
    pub url: String,

    /// Declared priority, higher is better.
    pub priority: i64,

    /// Freshness of the mirror's copy in epoch seconds (`0` if unknown).
    pub timestamp: i64,
}

impl MirrorCandidate {
    /// Whether this candidate should replace `best`.
    ///
    /// Strictly higher priority wins; on equal priority a strictly newer
    /// timestamp wins. Equal candidates keep the earlier one.
    #[must_use]
    pub fn beats(&self, best: &Self) -> bool {
        (self.priority, self.timestamp) > (best.priority, best.timestamp)
    }
}

/// Raw text accumulated for one catalog entry.
///
/// `Datum`, `Zeit` and `Dauer` always exist (empty until text arrives) so
/// normalization never has to deal with a missing value. The other fields
/// only exist once the entry carried text for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    sender: Option<String>,
    titel: Option<String>,
    url: Option<String>,
    datum: String,
    zeit: String,
    dauer: String,
}

impl RawRecord {
    /// Create an empty record with the always-present fields seeded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of text to a field. Chunks concatenate.
    pub fn append(&mut self, field: Field, text: &str) {
        match field {
            Field::Sender => self.sender.get_or_insert_with(String::new).push_str(text),
            Field::Titel => self.titel.get_or_insert_with(String::new).push_str(text),
            Field::Url => self.url.get_or_insert_with(String::new).push_str(text),
            Field::Datum => self.datum.push_str(text),
            Field::Zeit => self.zeit.push_str(text),
            Field::Dauer => self.dauer.push_str(text),
        }
    }

    /// Current raw text of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Sender => self.sender.as_deref(),
            Field::Titel => self.titel.as_deref(),
            Field::Url => self.url.as_deref(),
            Field::Datum => Some(&self.datum),
            Field::Zeit => Some(&self.zeit),
            Field::Dauer => Some(&self.dauer),
        }
    }

    /// Derive the timestamp and numeric duration.
    #[must_use]
    pub fn normalize(self) -> Broadcast {
        let timestamp = parse_timestamp(&self.datum, &self.zeit);
        let dauer = parse_duration(&self.dauer);

        Broadcast {
            sender: self.sender,
            titel: self.titel,
            datum: self.datum,
            zeit: self.zeit,
            dauer,
            url: self.url,
            timestamp,
        }
    }
}

/// A normalized broadcast entry, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    #[serde(rename = "Sender", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    #[serde(rename = "Titel", default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,

    /// Raw broadcast date.
    #[serde(rename = "Datum")]
    pub datum: String,

    /// Raw broadcast time.
    #[serde(rename = "Zeit")]
    pub zeit: String,

    /// Running time in seconds (`0` if malformed).
    #[serde(rename = "Dauer")]
    pub dauer: i64,

    #[serde(rename = "Url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Broadcast start in epoch seconds (`0` if unknown).
    pub timestamp: i64,
}

/// The output collection: retained broadcasts in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filmliste {
    broadcasts: Vec<Broadcast>,
    dropped: usize,
}

impl Filmliste {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a retained broadcast.
    pub fn push(&mut self, broadcast: Broadcast) {
        self.broadcasts.push(broadcast);
    }

    /// Count an entry rejected by the retention predicate.
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Retained broadcasts in document order.
    #[must_use]
    pub fn broadcasts(&self) -> &[Broadcast] {
        &self.broadcasts
    }

    /// Consume the collection, yielding the retained broadcasts.
    #[must_use]
    pub fn into_broadcasts(self) -> Vec<Broadcast> {
        self.broadcasts
    }

    /// Number of retained broadcasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.broadcasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.broadcasts.is_empty()
    }

    /// Number of entries dropped by the retention predicate.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of entries seen in the catalog.
    #[must_use]
    pub fn seen(&self) -> usize {
        self.broadcasts.len() + self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_roundtrip_names() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.as_str()), Some(field));
        }
        assert_eq!(Field::from_name("Beschreibung"), None);
        assert_eq!(Field::from_name(""), None);
    }

    #[test]
    fn test_candidate_priority_wins_over_freshness() {
        let best = MirrorCandidate {
            url: "http://old".to_string(),
            priority: 1,
            timestamp: 2_000,
        };
        let candidate = MirrorCandidate {
            url: "http://new".to_string(),
            priority: 2,
            timestamp: 1_000,
        };
        assert!(candidate.beats(&best));
        assert!(!best.beats(&candidate));
    }

    #[test]
    fn test_candidate_tie_broken_by_timestamp() {
        let best = MirrorCandidate {
            url: "http://a".to_string(),
            priority: 1,
            timestamp: 1_000,
        };
        let newer = MirrorCandidate {
            timestamp: 1_001,
            ..best.clone()
        };
        assert!(newer.beats(&best));
        assert!(!best.clone().beats(&best));
    }

    #[test]
    fn test_candidate_against_initial_state() {
        let initial = MirrorCandidate::default();
        let unknown = MirrorCandidate {
            url: "http://x".to_string(),
            priority: 0,
            timestamp: 0,
        };
        assert!(!unknown.beats(&initial));
    }

    #[test]
    fn test_raw_record_seeded_fields() {
        let record = RawRecord::new();
        assert_eq!(record.get(Field::Datum), Some(""));
        assert_eq!(record.get(Field::Zeit), Some(""));
        assert_eq!(record.get(Field::Dauer), Some(""));
        assert_eq!(record.get(Field::Titel), None);
    }

    #[test]
    fn test_raw_record_append_concatenates() {
        let mut record = RawRecord::new();
        record.append(Field::Titel, "Tatort: ");
        record.append(Field::Titel, "Der Fall");
        record.append(Field::Datum, "1.1.");
        record.append(Field::Datum, "2000");
        assert_eq!(record.get(Field::Titel), Some("Tatort: Der Fall"));
        assert_eq!(record.get(Field::Datum), Some("1.1.2000"));
    }

    #[test]
    fn test_normalize_derives_fields() {
        let mut record = RawRecord::new();
        record.append(Field::Titel, "Show");
        record.append(Field::Datum, "1.1.2000");
        record.append(Field::Zeit, "10:00:00");
        record.append(Field::Dauer, "1:00:00");

        let broadcast = record.normalize();
        assert_eq!(broadcast.titel.as_deref(), Some("Show"));
        assert_eq!(broadcast.dauer, 3600);
        assert_eq!(broadcast.timestamp, 946_717_200);
        assert_eq!(broadcast.datum, "1.1.2000");
        assert_eq!(broadcast.sender, None);
    }

    #[test]
    fn test_broadcast_json_shape() {
        let broadcast = Broadcast {
            sender: Some("ARD".to_string()),
            titel: None,
            datum: String::new(),
            zeit: String::new(),
            dauer: 0,
            url: None,
            timestamp: 0,
        };
        let json = serde_json::to_value(&broadcast).unwrap();
        assert_eq!(json["Sender"], "ARD");
        assert_eq!(json["Datum"], "");
        assert_eq!(json["Dauer"], 0);
        assert_eq!(json["timestamp"], 0);
        assert!(json.get("Titel").is_none());
        assert!(json.get("Url").is_none());
    }

    #[test]
    fn test_filmliste_counts() {
        let mut liste = Filmliste::new();
        assert!(liste.is_empty());
        liste.push(RawRecord::new().normalize());
        liste.record_dropped();
        liste.record_dropped();
        assert_eq!(liste.len(), 1);
        assert_eq!(liste.dropped(), 2);
        assert_eq!(liste.seen(), 3);
    }
}
