//! Generic XML document: quick-xml events to and from a `RawElement` tree
//!
//! Whitespace-only text is dropped on read and the output is re-indented on write.
//! Other text is kept exactly, including its leading and trailing whitespace.

use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use tracing::trace;

use crate::domain::{RawElement, RawNode};

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {source}")]
    Malformed {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid document at byte {position}: {message}")]
    Invalid { position: usize, message: String },

    #[error("XML write failed: {0}")]
    Write(#[from] quick_xml::Error),

    #[error("serialized XML is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `<?xml ...?>` header fields, kept so the rewritten file carries the same header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            encoding: None,
            standalone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    pub doctype: Option<String>,
    /// Comments before the root element
    pub prolog: Vec<RawNode>,
    pub root: RawElement,
}

impl XmlDocument {
    pub fn new(root: RawElement) -> Self {
        Self {
            declaration: Some(XmlDeclaration::default()),
            doctype: None,
            prolog: Vec::new(),
            root,
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<XmlDeclaration, quick_xml::Error> {
    Ok(XmlDeclaration {
        version: lossy(&decl.version()?),
        encoding: decl.encoding().transpose()?.map(|e| lossy(&e)),
        standalone: decl.standalone().transpose()?.map(|s| lossy(&s)),
    })
}

fn read_start(start: &BytesStart<'_>) -> Result<RawElement, quick_xml::Error> {
    let mut element = RawElement::new(lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        element
            .attributes
            .push((lossy(attr.key.as_ref()), attr.unescape_value()?.into_owned()));
    }
    Ok(element)
}

/// Parse a complete document with exactly one root element.
pub fn parse_document(content: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(content);

    let mut declaration = None;
    let mut doctype = None;
    let mut prolog = Vec::new();
    let mut root: Option<RawElement> = None;
    let mut stack: Vec<RawElement> = Vec::new();

    let invalid = |position: usize, message: &str| XmlError::Invalid {
        position,
        message: message.to_string(),
    };

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|source| XmlError::Malformed { position, source })?;
        let malformed = |source: quick_xml::Error| XmlError::Malformed { position, source };

        // Elements closed here are attached to their parent, or become the root.
        let closed = match event {
            Event::Decl(decl) => {
                declaration = Some(read_declaration(&decl).map_err(malformed)?);
                None
            }
            Event::DocType(text) => {
                doctype = Some(lossy(&text).trim().to_string());
                None
            }
            Event::Start(start) => {
                stack.push(read_start(&start).map_err(malformed)?);
                None
            }
            Event::Empty(start) => Some(read_start(&start).map_err(malformed)?),
            Event::End(_) => Some(
                stack
                    .pop()
                    .ok_or_else(|| invalid(position, "closing tag without opening tag"))?,
            ),
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => None,
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?.into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(RawNode::Text(text)),
                    None => return Err(invalid(position, "text outside the root element")),
                }
                None
            }
            Event::CData(data) => {
                let data = lossy(&data.into_inner());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(RawNode::CData(data)),
                    None => return Err(invalid(position, "CDATA outside the root element")),
                }
                None
            }
            Event::Comment(text) => {
                let comment = RawNode::Comment(lossy(&text));
                match stack.last_mut() {
                    Some(parent) => parent.children.push(comment),
                    None if root.is_none() => prolog.push(comment),
                    None => trace!("parse_document: dropping comment after root"),
                }
                None
            }
            Event::PI(_) => {
                trace!("parse_document: skipping processing instruction");
                None
            }
            Event::Eof => break,
        };

        if let Some(element) = closed {
            match stack.last_mut() {
                Some(parent) => parent.children.push(RawNode::Element(element)),
                None if root.is_none() => root = Some(element),
                None => return Err(invalid(position, "more than one root element")),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid(
            reader.buffer_position(),
            &format!("unclosed element <{}>", open.name),
        ));
    }
    let root = root.ok_or_else(|| invalid(reader.buffer_position(), "no root element"))?;

    Ok(XmlDocument {
        declaration,
        doctype,
        prolog,
        root,
    })
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &RawNode) -> Result<(), XmlError> {
    match node {
        RawNode::Element(element) => write_element(writer, element)?,
        RawNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        RawNode::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        RawNode::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &RawElement) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Serialize with two-space indentation and a trailing newline.
pub fn write_document(document: &XmlDocument) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    if let Some(decl) = &document.declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
    }
    if let Some(doctype) = &document.doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
    }
    for node in &document.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}
