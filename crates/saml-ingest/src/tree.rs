//! Generic document tree.
//!
//! Converts an arbitrary XML document into a uniform [`DocumentNode`] tree
//! whose attributes and children are addressed by lower-cased name, so
//! protocol logic can navigate a request without a schema.
//!
//! # Known limitation
//!
//! Children are keyed by lower-cased local name. When an element has several
//! children with the same name, the last one wins and earlier siblings are
//! discarded.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::{IngestError, IngestResult};

/// One element of a parsed request document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
    /// Local name of the element, case preserved.
    pub tag: String,
    /// Attributes keyed by lower-cased local name.
    pub attributes: BTreeMap<String, String>,
    /// Text preceding the first child node, if not blank.
    pub text: Option<String>,
    /// Child elements keyed by lower-cased local name.
    pub children: BTreeMap<String, DocumentNode>,
}

impl DocumentNode {
    /// Parses `xml` and builds the tree rooted at its document element.
    pub fn build(xml: &str) -> IngestResult<Self> {
        let root = TreeBuilder::new(xml).run()?;
        tracing::debug!(root = %root.tag, "built document tree");
        Ok(root)
    }

    /// Looks up an attribute, case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Looks up a child element, case-insensitively.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&DocumentNode> {
        self.children.get(&name.to_lowercase())
    }

    /// Follows a path of child names from this node.
    #[must_use]
    pub fn find(&self, path: &[&str]) -> Option<&DocumentNode> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// The element text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

struct Frame {
    node: DocumentNode,
    text: String,
    /// Set by the first child node (element, comment or PI); text after it
    /// is a tail, not element text.
    text_closed: bool,
}

impl Frame {
    fn finish(self) -> DocumentNode {
        let mut node = self.node;
        if !self.text.trim().is_empty() {
            node.text = Some(self.text);
        }
        node
    }
}

struct TreeBuilder<'a> {
    reader: Reader<&'a [u8]>,
    stack: Vec<Frame>,
    root: Option<DocumentNode>,
}

impl<'a> TreeBuilder<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);
        Self {
            reader,
            stack: Vec::new(),
            root: None,
        }
    }

    fn run(mut self) -> IngestResult<DocumentNode> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    let node = self.open(&e)?;
                    self.stack.push(Frame {
                        node,
                        text: String::new(),
                        text_closed: false,
                    });
                }
                Event::Empty(e) => {
                    let node = self.open(&e)?;
                    self.close(node)?;
                }
                Event::End(_) => {
                    let frame = self
                        .stack
                        .pop()
                        .ok_or_else(|| self.syntax("unexpected closing tag"))?;
                    self.close(frame.finish())?;
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    self.push_text(&text)?;
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|_| self.syntax("CDATA section is not valid UTF-8"))?;
                    self.push_text(text)?;
                }
                Event::DocType(_) => return Err(self.syntax("DOCTYPE declarations are not allowed")),
                Event::Eof => break,
                Event::Comment(_) | Event::PI(_) => self.close_text(),
                Event::Decl(_) => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(self.syntax("unexpected end of document, unclosed element"));
        }
        self.root
            .ok_or_else(|| IngestError::XmlSyntax("document has no root element".to_string()))
    }

    fn open(&mut self, start: &BytesStart<'_>) -> IngestResult<DocumentNode> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(self.syntax("content after the root element"));
        }
        self.close_text();

        let tag = utf8(start.local_name().as_ref())?.to_string();
        let mut attributes = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let name = utf8(attr.key.local_name().as_ref())?.to_lowercase();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(name, value);
        }

        Ok(DocumentNode {
            tag,
            attributes,
            text: None,
            children: BTreeMap::new(),
        })
    }

    fn close(&mut self, node: DocumentNode) -> IngestResult<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.node.children.insert(node.tag.to_lowercase(), node);
            }
            None => self.root = Some(node),
        }
        Ok(())
    }

    fn close_text(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.text_closed = true;
        }
    }

    fn push_text(&mut self, text: &str) -> IngestResult<()> {
        match self.stack.last_mut() {
            Some(frame) if !frame.text_closed => frame.text.push_str(text),
            Some(_) => {}
            None if text.trim().is_empty() => {}
            None => return Err(self.syntax("text outside the root element")),
        }
        Ok(())
    }

    fn syntax(&self, message: &str) -> IngestError {
        IngestError::XmlSyntax(format!(
            "{message} at position {}",
            self.reader.buffer_position()
        ))
    }
}

fn utf8(bytes: &[u8]) -> IngestResult<&str> {
    std::str::from_utf8(bytes)
        .map_err(|_| IngestError::XmlSyntax("name is not valid UTF-8".to_string()))
}
