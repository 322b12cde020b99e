//! Owned XML element tree for XML-mode responses.
//!
//! XML-mode endpoints hand their handler the parsed document root rather
//! than raw text. The tree is built eagerly from a `quick-xml` event walk
//! so it owns its data and can outlive the response body.

use crate::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A single XML element: name, attributes, text content, and child elements.
///
/// # Examples
///
/// ```
/// use tinyclient::xml::Element;
///
/// let root = Element::parse("<song genre=\"pop\"><title>First</title></song>").unwrap();
/// assert_eq!(root.name, "song");
/// assert_eq!(root.attr("genre"), Some("pop"));
/// assert_eq!(root.find("title").unwrap().text, "First");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// The tag name.
    pub name: String,
    /// Attribute name/value pairs in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content directly inside this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Parses an XML document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] for malformed documents, including documents
    /// with no root element at all.
    pub fn parse(input: &str) -> Result<Element> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::Xml(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let unescaped =
                            text.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        top.text.push_str(&unescaped);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Eof => {
                    let message = if stack.is_empty() {
                        "no root element"
                    } else {
                        "unexpected end of document"
                    };
                    return Err(Error::Xml(message.to_string()));
                }
                _ => {}
            }
        }
    }

    /// Returns the first direct child with the given tag name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns all direct children with the given tag name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Returns an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}
