//! Owned XML element tree and the extraction primitives built on it.
//!
//! quick-xml is an event parser; the feeds are small, so each response is
//! materialized into an owned tree that the response models can navigate
//! freely. The primitives encode the feed's field policies in one place:
//! optional children yield `None`, required containers and record fields
//! are structural errors.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;

/// One element of a parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    name: String,
    /// Attributes in document order.
    attributes: Vec<(String, String)>,
    /// Direct children in document order.
    children: Vec<Element>,
    /// Trimmed text content, `None` when empty.
    text: Option<String>,
}

impl Element {
    /// Parses a complete XML document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not well-formed XML or contains no
    /// root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            match reader.read_event().context("malformed XML")? {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let content = text.decode().context("malformed XML text")?;
                    if let Some(parent) = stack.last_mut() {
                        parent.append_text(&content);
                    }
                }
                Event::CData(data) => {
                    let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.append_text(&content);
                    }
                }
                Event::GeneralRef(reference) => {
                    let content = Self::resolve_reference(&reference)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.append_text(&content);
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().context("unbalanced closing tag")?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            bail!("unclosed element: <{}>", open.name);
        }
        root.context("document has no root element")
    }

    /// Builds an element shell (no children or text yet) from a start tag.
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute
                .with_context(|| format!("malformed attribute on <{name}>"))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .with_context(|| format!("malformed {key} attribute on <{name}>"))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        })
    }

    /// Resolves an entity reference event into its text.
    fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
        if let Some(resolved) = reference
            .resolve_char_ref()
            .context("malformed character reference")?
        {
            return Ok(resolved.to_string());
        }
        let name: &[u8] = reference;
        let resolved = match name {
            b"amp" => "&",
            b"lt" => "<",
            b"gt" => ">",
            b"apos" => "'",
            b"quot" => "\"",
            other => bail!(
                "unknown entity reference: &{};",
                String::from_utf8_lossy(other)
            ),
        };
        Ok(String::from(resolved))
    }

    /// Hands a finished element to its parent, or makes it the root.
    /// Accumulated text is trimmed here so indentation never counts.
    fn attach(stack: &mut Vec<Self>, root: &mut Option<Self>, mut element: Self) -> Result<()> {
        element.text = element.text.take().and_then(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(String::from(trimmed))
            }
        });

        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        } else if root.is_some() {
            bail!("multiple root elements");
        } else {
            *root = Some(element);
        }
        Ok(())
    }

    fn append_text(&mut self, content: &str) {
        match &mut self.text {
            Some(text) => text.push_str(content),
            None => self.text = Some(String::from(content)),
        }
    }

    /// Tag name of this element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct children in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Text content of this element, `None` when empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Raw attribute value; a missing attribute is `None`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Converted attribute value. A missing attribute is `Ok(None)`; a value
    /// that is present but fails to convert is an error, with the raw value
    /// still reachable through [`Element::attr`].
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute is present but does not convert.
    pub fn attr_parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => match raw.parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(e) => bail!("invalid {name} attribute {raw:?} on <{}>: {e}", self.name),
            },
        }
    }

    /// Required attribute value.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute is missing.
    pub fn required_attr(&self, name: &str) -> Result<&str> {
        self.attr(name)
            .with_context(|| format!("missing {name} attribute on <{}>", self.name))
    }

    /// First direct child with the given tag name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Like [`Element::child`], but a missing child is a structural error.
    ///
    /// # Errors
    ///
    /// Returns an error if no direct child has the given tag name.
    pub fn required_child(&self, name: &str) -> Result<&Self> {
        self.child(name)
            .with_context(|| format!("missing <{name}> under <{}>", self.name))
    }

    /// Text of a direct child. A missing child or empty text is `None`,
    /// never an error.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Self::text)
    }

    /// Owned variant of [`Element::child_text`].
    #[must_use]
    pub fn child_string(&self, name: &str) -> Option<String> {
        self.child_text(name).map(String::from)
    }

    /// Converted text of a direct child. Missing, empty, or unconvertible
    /// values are all `None`, unlike the attribute policy, which keeps
    /// conversion failures visible.
    #[must_use]
    pub fn child_parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        self.child_text(name).and_then(|raw| raw.parse().ok())
    }

    /// Converted text of every direct child of the named container, in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is missing or any entry fails to
    /// convert.
    pub fn child_list<T>(&self, name: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let container = self.required_child(name)?;
        let mut values = Vec::with_capacity(container.children.len());
        for item in &container.children {
            let raw = item.text().unwrap_or_default();
            let value = raw
                .parse::<T>()
                .map_err(|e| anyhow!("invalid <{}> entry {raw:?}: {e}", item.name))?;
            values.push(value);
        }
        Ok(values)
    }

    /// Keyed mapping over the direct children of the named container: each
    /// child contributes its `key_attr` attribute as key and its text as
    /// value. Children without the key attribute are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is missing.
    pub fn child_dict(
        &self,
        name: &str,
        key_attr: &str,
    ) -> Result<HashMap<String, Option<String>>> {
        let container = self.required_child(name)?;
        let mut entries = HashMap::with_capacity(container.children.len());
        for item in &container.children {
            if let Some(key) = item.attr(key_attr) {
                entries.insert(String::from(key), item.text().map(String::from));
            }
        }
        Ok(entries)
    }

    /// One field of a fixed-shape record: the named child must exist, its
    /// text may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the child element is missing.
    pub fn record_field(&self, name: &str) -> Result<Option<String>> {
        Ok(self.required_child(name)?.text().map(String::from))
    }

    /// Child element and text content both required.
    ///
    /// # Errors
    ///
    /// Returns an error if the child is missing or has no text.
    pub fn required_text(&self, name: &str) -> Result<String> {
        let child = self.required_child(name)?;
        child
            .text()
            .map(String::from)
            .with_context(|| format!("empty <{name}> under <{}>", self.name))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_simple_document() {
        // Arrange
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Results>
    <show>
        <name>Foo</name>
    </show>
</Results>"#;

        // Act
        let root = Element::parse(xml).unwrap();

        // Assert
        assert_eq!(root.name(), "Results");
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].child_text("name"), Some("Foo"));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        // Arrange & Act
        let result = Element::parse("<a><b></a>");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        // Arrange & Act
        let result = Element::parse("");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_resolves_entities() {
        // Arrange
        let xml = "<show><name>Mork &amp; Mindy</name></show>";

        // Act
        let root = Element::parse(xml).unwrap();

        // Assert
        assert_eq!(root.child_text("name"), Some("Mork & Mindy"));
    }

    #[test]
    fn test_parse_resolves_character_references() {
        // Arrange
        let xml = "<show><name>&#65;&#x42;</name></show>";

        // Act
        let root = Element::parse(xml).unwrap();

        // Assert
        assert_eq!(root.child_text("name"), Some("AB"));
    }

    #[test]
    fn test_parse_keeps_cdata() {
        // Arrange
        let xml = "<show><summary><![CDATA[a <b> c]]></summary></show>";

        // Act
        let root = Element::parse(xml).unwrap();

        // Assert
        assert_eq!(root.child_text("summary"), Some("a <b> c"));
    }

    #[test]
    fn test_empty_element_has_no_text() {
        // Arrange
        let xml = "<show><link/><title></title></show>";

        // Act
        let root = Element::parse(xml).unwrap();

        // Assert
        assert_eq!(root.child_text("link"), None);
        assert_eq!(root.child_text("title"), None);
    }

    #[test]
    fn test_attr_missing_is_none() {
        // Arrange
        let root = Element::parse(r#"<Season no="3"/>"#).unwrap();

        // Act & Assert
        assert_eq!(root.attr("no"), Some("3"));
        assert_eq!(root.attr("missing"), None);
    }

    #[test]
    fn test_attr_parsed_missing_is_none() {
        // Arrange
        let root = Element::parse("<Season/>").unwrap();

        // Act
        let no: Option<u32> = root.attr_parsed("no").unwrap();

        // Assert
        assert_eq!(no, None);
    }

    #[test]
    fn test_attr_parsed_invalid_is_error() {
        // Arrange
        let root = Element::parse(r#"<Season no="three"/>"#).unwrap();

        // Act
        let result: Result<Option<u32>> = root.attr_parsed("no");

        // Assert: conversion failures on present attributes stay visible,
        // with the raw value still reachable
        assert!(result.is_err());
        assert_eq!(root.attr("no"), Some("three"));
    }

    #[test]
    fn test_child_parsed_invalid_is_none() {
        // Arrange
        let root = Element::parse("<show><seasons>seven</seasons></show>").unwrap();

        // Act
        let seasons: Option<u32> = root.child_parsed("seasons");

        // Assert
        assert_eq!(seasons, None);
    }

    #[test]
    fn test_child_list_preserves_document_order() {
        // Arrange
        let xml = "<show><genres><genre>Drama</genre><genre>Action</genre></genres></show>";
        let root = Element::parse(xml).unwrap();

        // Act
        let genres: Vec<String> = root.child_list("genres").unwrap();

        // Assert
        assert_eq!(genres, vec!["Drama", "Action"]);
    }

    #[test]
    fn test_child_list_missing_container_is_error() {
        // Arrange
        let root = Element::parse("<show><name>Foo</name></show>").unwrap();

        // Act
        let result: Result<Vec<String>> = root.child_list("genres");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_child_dict_keys_by_attribute() {
        // Arrange
        let xml = r#"<show><akas><aka country="DE">Foo DE</aka><aka country="FR">Foo FR</aka><aka>no key</aka></akas></show>"#;
        let root = Element::parse(xml).unwrap();

        // Act
        let akas = root.child_dict("akas", "country").unwrap();

        // Assert: the keyless child is skipped
        assert_eq!(akas.len(), 2);
        assert_eq!(akas["DE"].as_deref(), Some("Foo DE"));
        assert_eq!(akas["FR"].as_deref(), Some("Foo FR"));
    }

    #[test]
    fn test_child_dict_missing_container_is_error() {
        // Arrange
        let root = Element::parse("<show/>").unwrap();

        // Act & Assert
        assert!(root.child_dict("network", "country").is_err());
    }

    #[test]
    fn test_record_field_requires_element_but_not_text() {
        // Arrange
        let root = Element::parse("<ep><title>Chosen</title><link/></ep>").unwrap();

        // Act & Assert
        assert_eq!(root.record_field("title").unwrap().as_deref(), Some("Chosen"));
        assert_eq!(root.record_field("link").unwrap(), None);
        assert!(root.record_field("epnum").is_err());
    }

    #[test]
    fn test_required_text_rejects_empty() {
        // Arrange
        let root = Element::parse("<ep><airdate></airdate></ep>").unwrap();

        // Act & Assert
        assert!(root.required_text("airdate").is_err());
        assert!(root.required_text("missing").is_err());
    }

    #[test]
    fn test_required_attr() {
        // Arrange
        let root = Element::parse(r#"<country name="US"/>"#).unwrap();

        // Act & Assert
        assert_eq!(root.required_attr("name").unwrap(), "US");
        assert!(root.required_attr("code").is_err());
    }
}
