//! Event-based writers.
//!
//! [`Document::write_to`] walks a subtree and reports it to a
//! [`MarkupWriter`] as start/end/text events carrying logical (decoded)
//! values. Two writers are provided: [`TextMarkupWriter`] renders the events
//! to a string, and [`DomWriter`] builds nodes from them, which lets one
//! document (or any other event source) be copied into another.

use std::sync::Arc;

use crate::attribute::Attribute;
use crate::document::Document;
use crate::entities::{decode_entities, encode_text};
use crate::error::DomError;
use crate::node::{ElementKind, NodeId, NodeKind};
use crate::options::{HtmlOptions, ReadFlags, WriteFlags};

/// Receiver of markup events.
///
/// Text and attribute values are logical strings; implementations escape
/// them as their output format requires. [`MarkupWriter::raw`] carries
/// markup that must not be escaped, such as script content.
pub trait MarkupWriter {
    /// Error produced by the sink.
    type Error;

    /// Open an element.
    fn start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<(), Self::Error>;

    /// Add an attribute to the element opened last. `None` is a bare
    /// attribute.
    fn attribute(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
        value: Option<&str>,
    ) -> Result<(), Self::Error>;

    /// Close the innermost open element.
    fn end_element(&mut self) -> Result<(), Self::Error>;

    /// Character data.
    fn text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Markup passed through untouched.
    fn raw(&mut self, markup: &str) -> Result<(), Self::Error>;

    /// A CDATA section.
    fn cdata(&mut self, text: &str) -> Result<(), Self::Error>;

    /// A comment.
    fn comment(&mut self, text: &str) -> Result<(), Self::Error>;

    /// A processing instruction.
    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Self::Error>;
}

enum Step {
    Enter(NodeId),
    Exit,
}

impl Document {
    /// Report the subtree at `id` to `writer`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `writer`.
    pub fn write_to<W: MarkupWriter>(&self, id: NodeId, writer: &mut W) -> Result<(), W::Error> {
        let mut steps = vec![Step::Enter(id)];
        while let Some(step) = steps.pop() {
            let node_id = match step {
                Step::Exit => {
                    writer.end_element()?;
                    continue;
                }
                Step::Enter(node_id) => node_id,
            };
            let Some(node) = self.get(node_id) else {
                continue;
            };
            let mut descend = true;
            match node.kind() {
                NodeKind::Document => {}
                NodeKind::Element(element) => match element.kind() {
                    ElementKind::Normal => {
                        let name = element.name();
                        writer.start_element(
                            name.prefix(),
                            name.local_name(),
                            self.namespace_uri(node_id),
                        )?;
                        for attr in element.attributes() {
                            let value = attr.raw_value().map(|_| attr.value());
                            writer.attribute(
                                attr.name().prefix(),
                                attr.name().local_name(),
                                self.attribute_namespace_uri(node_id, attr),
                                value.as_deref(),
                            )?;
                        }
                        steps.push(Step::Exit);
                    }
                    ElementKind::ProcessingInstruction => {
                        let mut data = String::new();
                        self.write_attributes(&mut data, element);
                        writer.processing_instruction(
                            &element.name().to_string(),
                            data.trim_start(),
                        )?;
                        descend = false;
                    }
                    ElementKind::Declaration => {
                        writer.raw(self.outer_html(node_id))?;
                        descend = false;
                    }
                },
                NodeKind::Text(text) if text.cdata => writer.cdata(&text.text)?,
                NodeKind::Text(text) if self.in_raw_text(node_id) => writer.raw(&text.text)?,
                NodeKind::Text(text) => writer.text(&decode_entities(&text.text))?,
                NodeKind::Comment(data) => writer.comment(data)?,
                NodeKind::QueryResult(value) => writer.text(value)?,
            }
            if descend {
                steps.extend(self.children(node_id).iter().rev().map(|c| Step::Enter(*c)));
            }
        }
        Ok(())
    }

    fn in_raw_text(&self, id: NodeId) -> bool {
        self.parent(id)
            .and_then(|p| self.name(p))
            .is_some_and(|name| {
                self.options()
                    .read_flags(&name.to_string())
                    .contains(ReadFlags::RAW_TEXT)
            })
    }
}

fn qualified(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local_name}"),
        _ => local_name.to_string(),
    }
}

/// Renders markup events to a string.
#[derive(Debug, Clone)]
pub struct TextMarkupWriter {
    out: String,
    open: Vec<String>,
    start_tag_open: bool,
    options: Arc<HtmlOptions>,
    xhtml: bool,
}

impl Default for TextMarkupWriter {
    fn default() -> Self {
        Self::new(HtmlOptions::shared_default())
    }
}

impl TextMarkupWriter {
    /// A writer consulting `options` for void elements.
    #[must_use]
    pub const fn new(options: Arc<HtmlOptions>) -> Self {
        Self {
            out: String::new(),
            open: Vec::new(),
            start_tag_open: false,
            options,
            xhtml: false,
        }
    }

    /// Write empty void elements as `<br/>`.
    #[must_use]
    pub const fn with_xhtml(mut self, xhtml: bool) -> Self {
        self.xhtml = xhtml;
        self
    }

    /// Markup written so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// The finished markup. Elements still open are left unclosed.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.close_start_tag();
        self.out
    }

    fn close_start_tag(&mut self) {
        if self.start_tag_open {
            self.out.push('>');
            self.start_tag_open = false;
        }
    }
}

impl MarkupWriter for TextMarkupWriter {
    type Error = DomError;

    fn start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        _namespace: Option<&str>,
    ) -> Result<(), DomError> {
        if local_name.is_empty() {
            return Err(DomError::InvalidName(String::new()));
        }
        self.close_start_tag();
        let name = qualified(prefix, local_name);
        self.out.push('<');
        self.out.push_str(&name);
        self.open.push(name);
        self.start_tag_open = true;
        Ok(())
    }

    fn attribute(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        _namespace: Option<&str>,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        if !self.start_tag_open {
            return Err(DomError::NoOpenElement);
        }
        self.out.push(' ');
        self.out.push_str(&qualified(prefix, local_name));
        if let Some(value) = value {
            self.out.push_str("=\"");
            self.out
                .push_str(&encode_text(value).replace('"', "&quot;"));
            self.out.push('"');
        }
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), DomError> {
        let name = self.open.pop().ok_or(DomError::NoOpenElement)?;
        if self.start_tag_open {
            self.start_tag_open = false;
            if self
                .options
                .write_flags(&name)
                .contains(WriteFlags::NO_CHILDREN)
            {
                self.out.push_str(if self.xhtml { "/>" } else { ">" });
                return Ok(());
            }
            self.out.push('>');
        }
        self.out.push_str("</");
        self.out.push_str(&name);
        self.out.push('>');
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DomError> {
        self.close_start_tag();
        self.out.push_str(&encode_text(text));
        Ok(())
    }

    fn raw(&mut self, markup: &str) -> Result<(), DomError> {
        self.close_start_tag();
        self.out.push_str(markup);
        Ok(())
    }

    fn cdata(&mut self, text: &str) -> Result<(), DomError> {
        self.close_start_tag();
        self.out.push_str("<![CDATA[");
        self.out.push_str(text);
        self.out.push_str("]]>");
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), DomError> {
        self.close_start_tag();
        self.out.push_str("<!--");
        self.out.push_str(text);
        self.out.push_str("-->");
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        self.close_start_tag();
        self.out.push_str("<?");
        self.out.push_str(target);
        if !data.is_empty() {
            self.out.push(' ');
            self.out.push_str(data);
        }
        self.out.push_str("?>");
        Ok(())
    }
}

/// Builds nodes from markup events, appending them under a parent node.
///
/// Text is escaped into raw form on the way in, so the resulting nodes
/// serialize the same way parsed ones do. Processing-instruction data is
/// kept verbatim as a single valueless attribute.
#[derive(Debug)]
pub struct DomWriter<'a> {
    doc: &'a mut Document,
    parent: NodeId,
    open: Vec<NodeId>,
    written: Vec<NodeId>,
}

impl<'a> DomWriter<'a> {
    /// A writer appending under `parent`.
    pub const fn new(doc: &'a mut Document, parent: NodeId) -> Self {
        Self {
            doc,
            parent,
            open: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Top-level nodes created so far.
    #[must_use]
    pub fn written(&self) -> &[NodeId] {
        &self.written
    }

    fn target(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.parent)
    }

    fn attach(&mut self, node: NodeId) -> Result<(), DomError> {
        let target = self.target();
        self.doc.append_child(target, node)?;
        if self.open.is_empty() {
            self.written.push(node);
        }
        Ok(())
    }
}

impl MarkupWriter for DomWriter<'_> {
    type Error = DomError;

    fn start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<(), DomError> {
        let element = self.doc.create_element(&qualified(prefix, local_name))?;
        self.attach(element)?;
        if let Some(uri) = namespace {
            let resolved = match prefix {
                Some(p) => self.doc.lookup_namespace(element, p),
                None => self.doc.namespace_uri(element),
            };
            if resolved != Some(uri) && !self.doc.options().is_empty_namespace(uri) {
                let declaration = qualified(prefix.map(|_| "xmlns"), prefix.unwrap_or("xmlns"));
                let _ = self
                    .doc
                    .set_attribute(element, &declaration, Some(&*encode_text(uri)))?;
            }
        }
        self.open.push(element);
        Ok(())
    }

    fn attribute(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        _namespace: Option<&str>,
        value: Option<&str>,
    ) -> Result<(), DomError> {
        let element = *self.open.last().ok_or(DomError::NoOpenElement)?;
        let value = value.map(encode_text);
        let _ = self.doc.set_attribute(
            element,
            &qualified(prefix, local_name),
            value.as_deref(),
        )?;
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), DomError> {
        let _ = self.open.pop().ok_or(DomError::NoOpenElement)?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DomError> {
        let node = self.doc.create_text(&encode_text(text));
        self.attach(node)
    }

    fn raw(&mut self, markup: &str) -> Result<(), DomError> {
        let node = self.doc.create_text(markup);
        self.attach(node)
    }

    fn cdata(&mut self, text: &str) -> Result<(), DomError> {
        let node = self.doc.create_cdata(text);
        self.attach(node)
    }

    fn comment(&mut self, text: &str) -> Result<(), DomError> {
        let node = self.doc.create_comment(text);
        self.attach(node)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        let node = self.doc.create_processing_instruction(target)?;
        if !data.is_empty() {
            let _ = self.doc.put_attribute(node, Attribute::new(data, None))?;
        }
        self.attach(node)
    }
}
