//! Minimal XML element model for declarative configuration
//!
//! Configuration documents are small, so the event stream from `quick-xml`
//! is assembled into an owned element tree that the parser can walk. Names
//! are matched by local name; namespace prefixes and `xmlns` declarations
//! are dropped.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ConfigError, ConfigResult};

/// A parsed XML element: local name, attributes, children, and text.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    name: String,
    attributes: HashMap<String, String>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Create an empty element, mainly useful for assembling test input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child element, builder style.
    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a document and return its root element.
    pub fn parse_document(xml: &str) -> ConfigResult<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(Self::from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e)?;
                    Self::attach(element, &mut stack, &mut root)?;
                }
                Ok(Event::Text(t)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t.unescape().map_err(|e| ConfigError::xml(e.to_string()))?;
                        parent.text.push_str(&text);
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ConfigError::xml("unbalanced end tag"))?;
                    Self::attach(element, &mut stack, &mut root)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ConfigError::xml(e.to_string())),
            }
        }

        if !stack.is_empty() {
            return Err(ConfigError::xml("unclosed element"));
        }
        root.ok_or_else(|| ConfigError::xml("document contains no element"))
    }

    fn attach(
        element: XmlElement,
        stack: &mut Vec<XmlElement>,
        root: &mut Option<XmlElement>,
    ) -> ConfigResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(ConfigError::xml("multiple root elements")),
        }
        Ok(())
    }

    fn from_start(start: &BytesStart<'_>) -> ConfigResult<XmlElement> {
        let local = start.local_name();
        let name = std::str::from_utf8(local.as_ref())
            .map_err(|e| ConfigError::xml(e.to_string()))?
            .to_string();

        let mut attributes = HashMap::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| ConfigError::xml(e.to_string()))?;

            let raw_key = attribute.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }

            let key = std::str::from_utf8(attribute.key.local_name().as_ref())
                .map_err(|e| ConfigError::xml(e.to_string()))?
                .to_string();
            let value = attribute
                .unescape_value()
                .map_err(|e| ConfigError::xml(e.to_string()))?
                .to_string();
            attributes.insert(key, value);
        }

        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Get the local element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the accumulated text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the child elements.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Look up an attribute value.
    ///
    /// An attribute that is present but blank counts as absent.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Look up an attribute value, falling back to a default.
    pub fn string_attribute(&self, name: &str, default: &str) -> String {
        self.attribute(name).unwrap_or(default).to_string()
    }

    /// Look up and parse an attribute value, falling back to a default.
    ///
    /// A present-but-unparsable value is an error, not a default.
    pub fn parsed_attribute<T>(&self, name: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.attribute(name) {
            None => Ok(default),
            Some(value) => {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidAttribute {
                        name: name.to_string(),
                        value: value.to_string(),
                        message: e.to_string(),
                    })
            }
        }
    }

    /// Find the first child with the given local name.
    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }
}
