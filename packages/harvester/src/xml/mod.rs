//! Streaming XML event reader shared by the control and catalog parsers.

mod reader;

pub use reader::{read_events, read_events_with, Attribute, ReaderOptions, XmlHandler};
