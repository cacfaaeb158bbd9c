//! Event-driven XML reading on top of `quick-xml`.
//!
//! The reader pulls bytes from the source in bounded chunks and pushes
//! start, end and character-data events into an [`XmlHandler`]. It never
//! holds more than one event's worth of the document in memory.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::READ_CHUNK_SIZE;
use crate::error::{HarvesterError, Result};

/// An attribute of an element start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Receiver of document events, in document order.
///
/// Self-closing elements produce a start event immediately followed by an
/// end event. Character data may be split over several calls.
pub trait XmlHandler {
    /// An element was opened.
    fn start_element(&mut self, name: &str, attributes: &[Attribute]);

    /// An element was closed.
    fn end_element(&mut self, name: &str);

    /// Character data (text or CDATA) with entities resolved.
    fn characters(&mut self, text: &str);
}

/// Options controlling how events are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Fold element and attribute names to ASCII upper case.
    pub case_folding: bool,
    /// Size of the chunks pulled from the underlying stream.
    pub chunk_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            case_folding: true,
            chunk_size: READ_CHUNK_SIZE,
        }
    }
}

/// Stream a document into `handler` with default options.
///
/// # Errors
/// Returns [`HarvesterError::MalformedDocument`] for the first
/// well-formedness violation, with the line it was found on, and
/// [`HarvesterError::Io`] when the stream itself fails. Events delivered
/// before the failure are not rolled back.
pub fn read_events<R: Read, H: XmlHandler>(source: R, handler: &mut H) -> Result<()> {
    read_events_with(source, handler, ReaderOptions::default())
}

/// Stream a document into `handler`.
///
/// # Errors
/// See [`read_events`].
pub fn read_events_with<R: Read, H: XmlHandler>(
    source: R,
    handler: &mut H,
    options: ReaderOptions,
) -> Result<()> {
    let buffered = BufReader::with_capacity(options.chunk_size.max(1), source);
    let mut reader = Reader::from_reader(LineTracker::new(buffered));
    let mut buf = Vec::new();
    let mut open_elements: Vec<String> = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(quick_xml::Error::Io(err)) => return Err(HarvesterError::Io(unshare_io(err))),
            Err(err) => return Err(syntax_error(&reader, err.to_string())),
        };

        match event {
            Event::Start(start) => {
                let (name, attributes) = element_parts(&reader, &start, options)?;
                handler.start_element(&name, &attributes);
                open_elements.push(name);
            }
            Event::Empty(start) => {
                let (name, attributes) = element_parts(&reader, &start, options)?;
                handler.start_element(&name, &attributes);
                handler.end_element(&name);
            }
            Event::End(end) => {
                let name = fold_name(&reader, end.name().as_ref(), options)?;
                handler.end_element(&name);
                open_elements.pop();
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| syntax_error(&reader, err.to_string()))?;
                if !text.is_empty() {
                    handler.characters(&text);
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|err| syntax_error(&reader, format!("invalid UTF-8 in CDATA: {err}")))?;
                if !text.is_empty() {
                    handler.characters(text);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
        buf.clear();
    }

    if let Some(name) = open_elements.last() {
        return Err(syntax_error(
            &reader,
            format!("unexpected end of document, <{name}> is not closed"),
        ));
    }

    Ok(())
}

/// Decode an element's name and attributes.
fn element_parts<R: BufRead>(
    reader: &Reader<LineTracker<R>>,
    start: &BytesStart<'_>,
    options: ReaderOptions,
) -> Result<(String, Vec<Attribute>)> {
    let name = fold_name(reader, start.name().as_ref(), options)?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| syntax_error(reader, err.to_string()))?;
        let attr_name = fold_name(reader, attr.key.as_ref(), options)?;
        let value = attr
            .unescape_value()
            .map_err(|err| syntax_error(reader, err.to_string()))?;
        attributes.push(Attribute {
            name: attr_name,
            value: value.into_owned(),
        });
    }

    Ok((name, attributes))
}

fn fold_name<R: BufRead>(
    reader: &Reader<LineTracker<R>>,
    raw: &[u8],
    options: ReaderOptions,
) -> Result<String> {
    let name = std::str::from_utf8(raw)
        .map_err(|err| syntax_error(reader, format!("invalid UTF-8 in name: {err}")))?;
    Ok(if options.case_folding {
        name.to_ascii_uppercase()
    } else {
        name.to_string()
    })
}

fn syntax_error<R: BufRead>(reader: &Reader<LineTracker<R>>, message: String) -> HarvesterError {
    HarvesterError::MalformedDocument {
        message,
        line: reader.get_ref().line(),
    }
}

/// quick-xml shares I/O errors behind an `Arc`.
fn unshare_io(err: Arc<io::Error>) -> io::Error {
    Arc::try_unwrap(err).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string()))
}

/// Buffered reader that counts the newlines handed to the parser.
struct LineTracker<R> {
    inner: R,
    newlines: u64,
}

impl<R: BufRead> LineTracker<R> {
    fn new(inner: R) -> Self {
        Self { inner, newlines: 0 }
    }

    /// 1-based line of the parser's current position.
    fn line(&self) -> u64 {
        self.newlines + 1
    }
}

impl<R: BufRead> Read for LineTracker<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(out.len());
            out[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for LineTracker<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        // Data handed out by fill_buf is still buffered, so this does no I/O.
        if let Ok(pending) = self.inner.fill_buf() {
            let end = amt.min(pending.len());
            let newlines = pending[..end].iter().filter(|&&b| b == b'\n').count();
            self.newlines += newlines as u64;
        }
        self.inner.consume(amt);
    }
}
