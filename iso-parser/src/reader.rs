//! Forward-only, namespace-aware XML cursor
//!
//! [`XmlCursor`] turns a byte stream into start / end / text events with
//! namespaces resolved. Insignificant whitespace, comments, processing
//! instructions and the XML declaration are dropped; DOCTYPE declarations
//! are rejected so no entity expansion can happen.
//!
//! A [`Subregion`] restricts reading to the children of one element and
//! reports end-of-input at that element's end tag, leaving following
//! siblings untouched for the parent.

use crate::config::ParserConfig;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::io::BufRead;

/// Attribute of a start tag (namespace declarations excluded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// Element start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Local name without prefix
    pub local_name: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    /// Value of the attribute with the given local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// Cursor event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element start; empty elements produce a start followed by an end
    Start(StartElement),
    /// Element end, with the local name
    End(String),
    /// Non-whitespace character data
    Text(String),
    /// End of input (or of a subregion)
    Eof,
}

/// Forward-only XML cursor over a buffered source
pub struct XmlCursor<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    depth: usize,
    max_depth: usize,
    pending_end: Option<String>,
}

impl<R> std::fmt::Debug for XmlCursor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlCursor")
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> XmlCursor<R> {
    /// Create a cursor with default limits
    pub fn new(source: R) -> Self {
        Self::with_config(source, &ParserConfig::default())
    }

    /// Create a cursor using the configured depth limit and buffer size
    pub fn with_config(source: R, config: &ParserConfig) -> Self {
        Self {
            reader: NsReader::from_reader(source),
            buf: Vec::with_capacity(config.buffer_capacity),
            depth: 0,
            max_depth: config.max_depth,
            pending_end: None,
        }
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Byte offset of the tokenizer in the source
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Read the next event
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        if let Some(name) = self.pending_end.take() {
            self.depth -= 1;
            return Ok(XmlEvent::End(name));
        }

        loop {
            let position = self.position();
            self.buf.clear();
            let (resolved, event) = self
                .reader
                .read_resolved_event_into(&mut self.buf)
                .map_err(|e| malformed(position, e))?;

            match event {
                Event::Start(start) => {
                    let element = start_element(resolved, &start, position)?;
                    descend(&mut self.depth, self.max_depth, position)?;
                    return Ok(XmlEvent::Start(element));
                }
                Event::Empty(start) => {
                    let element = start_element(resolved, &start, position)?;
                    descend(&mut self.depth, self.max_depth, position)?;
                    self.pending_end = Some(element.local_name.clone());
                    return Ok(XmlEvent::Start(element));
                }
                Event::End(end) => {
                    let name = utf8(end.local_name().as_ref(), position)?.to_string();
                    if self.depth == 0 {
                        return Err(malformed(position, format!("unmatched end tag </{}>", name)));
                    }
                    self.depth -= 1;
                    return Ok(XmlEvent::End(name));
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| malformed(position, e))?;
                    if value.trim().is_empty() {
                        continue;
                    }
                    return Ok(XmlEvent::Text(value.into_owned()));
                }
                Event::CData(cdata) => {
                    let value = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| malformed(position, e))?;
                    return Ok(XmlEvent::Text(value));
                }
                Event::DocType(_) => return Err(Error::DtdNotAllowed),
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(malformed(
                            position,
                            format!("unexpected end of input with {} open elements", self.depth),
                        ));
                    }
                    return Ok(XmlEvent::Eof);
                }
                // Declaration, comments, processing instructions
                _ => {}
            }
        }
    }

    /// Skip ahead to the next element start at any depth
    pub fn next_start(&mut self) -> Result<Option<StartElement>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) => return Ok(Some(element)),
                XmlEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Region covering the children of the element just started
    pub fn subregion(&mut self) -> Subregion<'_, R> {
        let depth = self.depth;
        Subregion::resume(self, depth)
    }

    /// Text content of the element just started
    pub fn read_text(&mut self) -> Result<String> {
        self.subregion().text()
    }

    /// Skip the rest of the element just started
    pub fn skip(&mut self) -> Result<()> {
        self.subregion().finish()
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

/// View of one element's descendants.
///
/// Ends (reports [`XmlEvent::Eof`]) after consuming the element's end tag.
/// Dropping a region early is allowed: the parent's [`Subregion::next_child`]
/// skips whatever the child left unread.
pub struct Subregion<'a, R> {
    cursor: &'a mut XmlCursor<R>,
    depth: usize,
    done: bool,
}

impl<'a, R> std::fmt::Debug for Subregion<'a, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subregion")
            .field("depth", &self.depth)
            .field("done", &self.done)
            .finish()
    }
}

impl<'a, R: BufRead> Subregion<'a, R> {
    /// Re-open a region at a known depth.
    ///
    /// Used by iterators that decode one child per call; the element at
    /// `depth` must still be open.
    pub(crate) fn resume(cursor: &'a mut XmlCursor<R>, depth: usize) -> Self {
        Self {
            cursor,
            depth,
            done: false,
        }
    }

    /// Depth of the element this region covers
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the end tag has been consumed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Byte offset of the underlying cursor
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Next event inside the region
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        if self.done {
            return Ok(XmlEvent::Eof);
        }

        match self.cursor.next_event()? {
            XmlEvent::End(_) if self.cursor.depth < self.depth => {
                self.done = true;
                Ok(XmlEvent::Eof)
            }
            XmlEvent::Eof => {
                self.done = true;
                Ok(XmlEvent::Eof)
            }
            event => Ok(event),
        }
    }

    /// Next direct child element, skipping text and deeper descendants
    pub fn next_child(&mut self) -> Result<Option<StartElement>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) if self.cursor.depth == self.depth + 1 => {
                    return Ok(Some(element))
                }
                XmlEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Region covering the child just returned by [`Self::next_child`]
    pub fn subregion(&mut self) -> Subregion<'_, R> {
        let depth = self.cursor.depth;
        Subregion::resume(&mut *self.cursor, depth)
    }

    /// Text content of the child just returned by [`Self::next_child`]
    pub fn read_text(&mut self) -> Result<String> {
        self.subregion().text()
    }

    /// Skip the child just returned by [`Self::next_child`]
    pub fn skip(&mut self) -> Result<()> {
        self.subregion().finish()
    }

    /// Consume the rest of this region
    pub fn finish(&mut self) -> Result<()> {
        while self.next_event()? != XmlEvent::Eof {}
        Ok(())
    }

    /// Consume the region as trimmed text; child elements are an error
    pub fn text(mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Text(chunk) => text.push_str(&chunk),
                XmlEvent::Start(element) => {
                    return Err(malformed(
                        self.cursor.position(),
                        format!("unexpected element <{}> in text content", element.local_name),
                    ))
                }
                XmlEvent::End(_) => {}
                XmlEvent::Eof => break,
            }
        }
        Ok(text.trim().to_string())
    }
}

fn descend(depth: &mut usize, max_depth: usize, position: u64) -> Result<()> {
    if *depth >= max_depth {
        return Err(malformed(
            position,
            format!("element nesting exceeds {} levels", max_depth),
        ));
    }
    *depth += 1;
    Ok(())
}

fn start_element(
    resolved: ResolveResult<'_>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<StartElement> {
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(utf8(ns.as_ref(), position)?.to_string()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(malformed(
                position,
                format!(
                    "unknown namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                ),
            ))
        }
    };

    let local_name = utf8(start.local_name().as_ref(), position)?.to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(position, e))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let name = utf8(attr.key.local_name().as_ref(), position)?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(position, e))?
            .into_owned();
        attributes.push(Attribute { name, value });
    }

    Ok(StartElement {
        local_name,
        namespace,
        attributes,
    })
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| malformed(position, e))
}

pub(crate) fn malformed(position: u64, message: impl std::fmt::Display) -> Error {
    Error::MalformedInput {
        position,
        message: message.to_string(),
    }
}
