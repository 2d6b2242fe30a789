//! Tree construction from reader fragments.
//!
//! The builder keeps a single insertion pointer. Opening tags descend into
//! the new element, close tags climb back to the matching ancestor, and
//! everything else is appended where the pointer stands. There are no
//! insertion modes: the tree mirrors the markup as written.

use std::sync::Arc;

use bramble_common::{MAX_NESTING_DEPTH, MAX_TREE_DEPTH, warn_once};
use bramble_dom::{
    Attribute, Closing, Document, ElementKind, HtmlOptions, Node, NodeId, ParseError, ParseErrorKind,
    ReadFlags, SourcePosition,
};
use encoding_rs::Encoding;

use super::hooks::{BuildContext, BuildHook, HookFlow};
use super::meta::meta_charset;
use crate::tokenizer::{FragmentKind, HtmlTokenizer, ReaderState};

/// Why [`DocumentBuilder::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSignal {
    /// The reader is exhausted.
    Finished,
    /// The document declared an encoding in a `<meta>` element. Building
    /// can resume with another call to `run`.
    EncodingDetected {
        /// The declared encoding.
        encoding: &'static Encoding,
        /// The declaring `<meta>` element.
        node: NodeId,
    },
    /// A hook cancelled the build.
    Cancelled,
}

/// Builds a [`Document`] from reader fragments.
pub struct DocumentBuilder {
    document: Document,
    /// Insertion point.
    current: NodeId,
    /// Depth of `current` below the document root.
    depth: usize,
    current_attribute: Option<usize>,
    /// Node created by the last fragment, for attaching reader errors.
    last_created: Option<NodeId>,
    detected: Option<&'static Encoding>,
    hooks: Vec<Box<dyn BuildHook>>,
}

impl DocumentBuilder {
    /// A builder producing a document that uses `options`.
    #[must_use]
    pub fn new(options: Arc<HtmlOptions>) -> Self {
        let document = Document::with_options(options);
        let current = document.root();
        Self {
            document,
            current,
            depth: 0,
            current_attribute: None,
            last_created: None,
            detected: None,
            hooks: Vec::new(),
        }
    }

    /// Add a hook. Hooks run in the order they were added.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn BuildHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Add several hooks at once.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Vec<Box<dyn BuildHook>>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Current insertion point.
    #[must_use]
    pub const fn current(&self) -> NodeId {
        self.current
    }

    /// Record an error found outside the reader (by the loader).
    pub fn record_error(&mut self, error: ParseError) {
        self.document.add_error(error);
    }

    /// Give back the installed hooks, dropping the document.
    #[must_use]
    pub fn into_hooks(self) -> Vec<Box<dyn BuildHook>> {
        self.hooks
    }

    /// Drain `tokenizer` into the document until it is exhausted, a hook
    /// cancels, or an encoding declaration is found.
    pub fn run<I: Iterator<Item = char>>(&mut self, tokenizer: &mut HtmlTokenizer<I>) -> BuildSignal {
        while let Some(fragment) = tokenizer.next() {
            let reader_errors = tokenizer.take_errors();
            let signal = self.process(&fragment);
            for error in reader_errors {
                let error = match self.last_created {
                    Some(node) if error.position == fragment.position() => error.on_node(node),
                    _ => error,
                };
                self.document.add_error(error);
            }
            if signal != BuildSignal::Finished {
                return signal;
            }
        }
        BuildSignal::Finished
    }

    /// Apply one fragment, running the hooks around it. Returns
    /// [`BuildSignal::Finished`] when building may simply go on.
    pub fn process(&mut self, fragment: &ReaderState) -> BuildSignal {
        self.last_created = None;

        let mut context = self.context();
        for hook in &mut self.hooks {
            match hook.before_fragment(&self.document, fragment, context) {
                HookFlow::Continue(next) => context = next,
                HookFlow::Skip => return BuildSignal::Finished,
                HookFlow::Cancel => return BuildSignal::Cancelled,
            }
        }
        self.apply_context(context);

        let signal = self.apply(fragment);

        let mut context = self.context();
        for hook in &mut self.hooks {
            match hook.after_fragment(&self.document, fragment, context) {
                HookFlow::Continue(next) => context = next,
                HookFlow::Skip => {}
                HookFlow::Cancel => return BuildSignal::Cancelled,
            }
        }
        self.apply_context(context);
        signal
    }

    /// Close whatever is still open and hand over the document.
    #[must_use]
    pub fn finish(mut self) -> Document {
        let open: Vec<NodeId> = self
            .document
            .ancestors(self.current)
            .take(MAX_TREE_DEPTH)
            .collect();
        for id in std::iter::once(self.current).chain(open) {
            self.report_unclosed(id, None);
        }
        self.document
    }

    fn context(&self) -> BuildContext {
        BuildContext {
            current_node: self.current,
            current_attribute: self.current_attribute,
            detected_encoding: self.detected.map(Encoding::name),
        }
    }

    fn apply_context(&mut self, context: BuildContext) {
        if context.current_node != self.current {
            if self.document.get(context.current_node).is_some() {
                self.current = context.current_node;
                self.depth = self.document.depth(self.current);
            } else {
                warn_once("HTML Builder", "hook moved the insertion point to an unknown node");
            }
        }
        self.current_attribute = context.current_attribute;
    }

    // =========================================================================
    // Fragment handling
    // =========================================================================

    fn apply(&mut self, fragment: &ReaderState) -> BuildSignal {
        let position = fragment.position();
        let raw = fragment.raw().unwrap_or_default();
        match fragment.kind() {
            FragmentKind::Text => {
                let id = self.document.create_text_at(raw, false, position);
                self.append(id);
            }
            FragmentKind::CDataText => {
                let id = self.document.create_text_at(raw, true, position);
                self.append(id);
            }
            FragmentKind::Comment => {
                let id = self.document.create_comment_at(raw, position);
                self.append(id);
            }
            FragmentKind::TagOpen => {
                self.open_element(raw, fragment.value().unwrap_or_default(), position);
            }
            FragmentKind::AttrName => self.add_attribute(raw, fragment.quote(), position),
            FragmentKind::AttrValue => {
                if let Some(index) = self.current_attribute.take() {
                    let _ = self.document.set_attribute_value_at(
                        self.current,
                        index,
                        fragment.raw(),
                        fragment.quote(),
                    );
                }
            }
            FragmentKind::TagEnd => return self.end_opening_tag(false),
            FragmentKind::SelfClose => return self.end_opening_tag(true),
            FragmentKind::TagClose => {
                self.close_element(fragment.value().unwrap_or_default(), raw, position);
            }
        }
        BuildSignal::Finished
    }

    fn append(&mut self, id: NodeId) {
        if self.document.append_child(self.current, id).is_ok() {
            self.last_created = Some(id);
        }
    }

    fn open_element(&mut self, raw: &str, name: &str, position: SourcePosition) {
        let kind = match raw.chars().next() {
            Some('?') => ElementKind::ProcessingInstruction,
            Some('!') => ElementKind::Declaration,
            _ => ElementKind::Normal,
        };

        if kind == ElementKind::Normal
            && self.document.options().read_flags(name).contains(ReadFlags::CLOSES_SIBLING)
            && self
                .document
                .element(self.current)
                .is_some_and(|el| el.name().matches(name))
        {
            let _ = self.pop();
        }

        let Ok(id) = self.document.create_element_at(name, kind, position) else {
            let text = self.document.create_text_at(raw, false, position);
            self.append(text);
            return;
        };
        self.append(id);
        self.current = id;
        self.depth += 1;
        self.current_attribute = None;
    }

    fn add_attribute(&mut self, name: &str, quote: Option<char>, position: SourcePosition) {
        self.current_attribute = None;
        if self.document.element(self.current).is_none() {
            return;
        }
        let attribute = Attribute::new(name, None)
            .with_name_quote(quote)
            .at(position);
        match self.document.put_attribute(self.current, attribute) {
            Ok(slot) => {
                if slot.replaced.is_some() {
                    self.document.add_error(
                        ParseError::new(
                            ParseErrorKind::DuplicateAttribute,
                            position,
                            format!("attribute `{name}` appears more than once; the last value wins"),
                        )
                        .on_node(self.current),
                    );
                }
                self.current_attribute = Some(slot.index);
            }
            Err(_) => warn_once("HTML Builder", "dropped an attribute with an empty name"),
        }
    }

    /// Handle `>` or `/>` of the element at the insertion point.
    fn end_opening_tag(&mut self, self_closed: bool) -> BuildSignal {
        self.current_attribute = None;
        let element = self.current;
        let Some(data) = self.document.element(element) else {
            return BuildSignal::Finished;
        };
        let is_meta = data.kind() == ElementKind::Normal && data.name().matches("meta");
        let is_void = data.is_void();

        if self_closed {
            let _ = self.document.set_closing(element, Closing::SelfClosed);
            let _ = self.pop();
        } else if is_void {
            let _ = self.pop();
        } else if self.depth > MAX_NESTING_DEPTH {
            warn_once(
                "HTML Builder",
                &format!("nesting deeper than {MAX_NESTING_DEPTH} levels; flattening"),
            );
            let _ = self.pop();
        }

        if is_meta
            && self.detected.is_none()
            && let Some(encoding) = meta_charset(&self.document, element)
        {
            self.detected = Some(encoding);
            self.document.set_declared_encoding(Some(encoding.name()));
            return BuildSignal::EncodingDetected {
                encoding,
                node: element,
            };
        }
        BuildSignal::Finished
    }

    /// Handle `</name>`: climb to the nearest open element of that name.
    fn close_element(&mut self, name: &str, raw: &str, position: SourcePosition) {
        let target = std::iter::once(self.current)
            .chain(self.document.ancestors(self.current))
            .take(MAX_TREE_DEPTH)
            .find(|&id| {
                self.document
                    .element(id)
                    .is_some_and(|el| el.kind() == ElementKind::Normal && el.name().matches(name))
            });

        let Some(target) = target else {
            let text = self.document.create_text_at(raw, false, position);
            self.append(text);
            self.document.add_error(
                ParseError::new(
                    ParseErrorKind::TagNotOpened,
                    position,
                    format!("close tag `{raw}` has no open element"),
                )
                .on_node(text),
            );
            return;
        };

        while self.current != target {
            self.report_unclosed(self.current, Some(name));
            if !self.pop() {
                break;
            }
        }
        let _ = self.document.set_closing(target, Closing::EndTag);
        let _ = self.pop();
    }

    /// Record `TagNotClosed` for an element that is closed implicitly
    /// although its tag does not allow it.
    fn report_unclosed(&mut self, id: NodeId, closed_by: Option<&str>) {
        let Some(data) = self.document.element(id) else {
            return;
        };
        if data.kind() != ElementKind::Normal
            || data.closing() != Closing::Implicit
            || self
                .document
                .options()
                .read_flags(data.name().local_name())
                .contains(ReadFlags::AUTO_CLOSE)
        {
            return;
        }
        let message = match closed_by {
            Some(parent) => format!("`{}` was not closed before `</{parent}>`", data.name()),
            None => format!("`{}` was not closed before end of input", data.name()),
        };
        let position = self.document.get(id).map(Node::position).unwrap_or_default();
        self.document.add_error(
            ParseError::new(ParseErrorKind::TagNotClosed, position, message).on_node(id),
        );
    }

    /// Move the insertion point to its parent. Returns `false` at the root.
    fn pop(&mut self) -> bool {
        match self.document.parent(self.current) {
            Some(parent) => {
                self.current = parent;
                self.depth = self.depth.saturating_sub(1);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for DocumentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBuilder")
            .field("current", &self.current)
            .field("depth", &self.depth)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}
