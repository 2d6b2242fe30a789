//! The reader state machine.
//!
//! [`HtmlTokenizer`] pulls characters from any `Iterator<Item = char>` and
//! turns them into [`ReaderState`] fragments. It never fails: markup that
//! cannot be read as a tag is handed back as text, with a `TagNotClosed`
//! error recorded at the tag's start.
//!
//! Fragments that belong to an opening tag are held back until the tag's
//! `>` is seen, so a tag interrupted by `<` or end of input can be re-emitted
//! as a single text fragment.

use std::collections::VecDeque;
use std::sync::Arc;

use bramble_common::text::is_html_whitespace;
use bramble_dom::{HtmlOptions, ParseError, SourcePosition};
use strum_macros::Display;

use super::fragment::{FragmentKind, ReaderState};
use super::hooks::{CharAction, CharHook};

/// Reader states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenizerState {
    /// Character data.
    Text,
    /// Inside an opening tag's name, after `<`.
    TagName,
    /// Between attributes.
    BeforeAttributeName,
    /// Inside an unquoted attribute name.
    AttributeName,
    /// Inside a quoted attribute name (doctype identifiers).
    QuotedAttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// After `=`, before the value.
    BeforeAttributeValue,
    /// Inside a quoted attribute value.
    QuotedAttributeValue,
    /// Inside an unquoted attribute value.
    UnquotedAttributeValue,
    /// Inside a close tag, after `</`.
    CloseTag,
    /// Inside `<!-- ... -->`.
    Comment,
    /// Inside `<![CDATA[ ... ]]>`.
    CData,
    /// Content of a raw-text element such as `<script>`.
    RawText,
}

impl TokenizerState {
    /// Whether the state is part of a tag whose text is buffered for
    /// re-emission.
    #[must_use]
    pub const fn is_in_tag(self) -> bool {
        matches!(
            self,
            Self::TagName
                | Self::BeforeAttributeName
                | Self::AttributeName
                | Self::QuotedAttributeName
                | Self::AfterAttributeName
                | Self::BeforeAttributeValue
                | Self::QuotedAttributeValue
                | Self::UnquotedAttributeValue
                | Self::CloseTag
        )
    }
}

/// The tag currently being read.
#[derive(Debug, Clone, Default)]
pub(super) struct PendingTag {
    /// Position of the `<`.
    pub(super) start: SourcePosition,
    /// Every character since (and including) the `<`.
    pub(super) raw: String,
    /// Fragments held back until the tag ends.
    pub(super) fragments: Vec<ReaderState>,
    /// Tag name as written, including a leading `?` or `!`.
    pub(super) name: String,
    /// Name of the attribute read last.
    pub(super) last_attribute: String,
    /// Value of a `type` attribute on a `<script>` tag.
    pub(super) script_type: Option<String>,
}

impl PendingTag {
    pub(super) fn starting_at(start: SourcePosition) -> Self {
        Self {
            start,
            raw: String::from("<"),
            ..Self::default()
        }
    }

    pub(super) fn is_processing_instruction(&self) -> bool {
        self.name.starts_with('?')
    }
}

/// Pull-based HTML reader.
///
/// Call [`read`](Self::read) until it returns `false` and inspect
/// [`state`](Self::state) after each call, or use the tokenizer as an
/// iterator of [`ReaderState`] values.
pub struct HtmlTokenizer<I: Iterator<Item = char>> {
    pub(super) input: I,
    pub(super) lookahead: VecDeque<char>,
    /// Position of the next character to be consumed.
    pub(super) position: SourcePosition,
    pub(super) options: Arc<HtmlOptions>,
    pub(super) state: TokenizerState,
    /// Text, name or value being collected.
    pub(super) buffer: String,
    pub(super) buffer_start: SourcePosition,
    pub(super) quote: Option<char>,
    pub(super) tag: PendingTag,
    /// Name of the raw-text element whose content is being copied.
    pub(super) raw_text_end: Option<String>,
    pub(super) ready: VecDeque<ReaderState>,
    pub(super) current: Option<ReaderState>,
    pub(super) errors: Vec<ParseError>,
    pub(super) hook: Option<Box<dyn CharHook>>,
    pub(super) finished: bool,
}

impl<I: Iterator<Item = char>> HtmlTokenizer<I> {
    /// A reader over `input` using `options` for raw-text elements.
    pub fn new(input: I, options: Arc<HtmlOptions>) -> Self {
        Self {
            input,
            lookahead: VecDeque::new(),
            position: SourcePosition::default(),
            options,
            state: TokenizerState::Text,
            buffer: String::new(),
            buffer_start: SourcePosition::default(),
            quote: None,
            tag: PendingTag::default(),
            raw_text_end: None,
            ready: VecDeque::new(),
            current: None,
            errors: Vec::new(),
            hook: None,
            finished: false,
        }
    }

    /// Install a character hook, replacing any previous one.
    #[must_use]
    pub fn with_hook(mut self, hook: Box<dyn CharHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Remove and return the character hook.
    pub fn take_hook(&mut self) -> Option<Box<dyn CharHook>> {
        self.hook.take()
    }

    /// Advance to the next fragment. Returns `false` at end of input.
    pub fn read(&mut self) -> bool {
        self.current = self.next();
        self.current.is_some()
    }

    /// The fragment produced by the last [`read`](Self::read).
    #[must_use]
    pub const fn state(&self) -> Option<&ReaderState> {
        self.current.as_ref()
    }

    /// The state the machine is in.
    #[must_use]
    pub const fn tokenizer_state(&self) -> TokenizerState {
        self.state
    }

    /// Position of the next character to be read.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        self.position
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Remove and return the errors recorded so far.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// The underlying character source.
    pub const fn input(&self) -> &I {
        &self.input
    }

    /// Mutable access to the underlying character source.
    pub const fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Consume the tokenizer, returning its character source.
    pub fn into_input(self) -> I {
        self.input
    }

    /// Consume one input character and run it through the machine.
    fn step(&mut self) {
        let Some((mut c, at)) = self.advance() else {
            self.flush_at_end();
            return;
        };

        if let Some(hook) = self.hook.as_mut() {
            match hook.before_char(c, self.state, at) {
                CharAction::Continue => {}
                CharAction::Replace(replacement) => c = replacement,
                CharAction::Switch(state) => self.switch_to(state),
                CharAction::Cancel => {
                    self.flush_at_end();
                    return;
                }
            }
        }

        if self.state.is_in_tag() {
            self.tag.raw.push(c);
        }
        self.process(c, at);
    }

    /// Handle `c` in the current state.
    pub(super) fn process(&mut self, c: char, at: SourcePosition) {
        match self.state {
            TokenizerState::Text => self.handle_text(c, at),
            TokenizerState::TagName => self.handle_tag_name(c, at),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name(c, at),
            TokenizerState::AttributeName => self.handle_attribute_name(c, at),
            TokenizerState::QuotedAttributeName => self.handle_quoted_attribute_name(c),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name(c, at),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value(c, at),
            TokenizerState::QuotedAttributeValue => self.handle_quoted_attribute_value(c),
            TokenizerState::UnquotedAttributeValue => self.handle_unquoted_attribute_value(c, at),
            TokenizerState::CloseTag => self.handle_close_tag(c, at),
            TokenizerState::Comment => self.handle_comment(c),
            TokenizerState::CData => self.handle_cdata(c),
            TokenizerState::RawText => self.handle_raw_text(c, at),
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    fn handle_text(&mut self, c: char, at: SourcePosition) {
        if c != '<' {
            self.push_text(c, at);
            return;
        }
        match self.peek(0) {
            Some(n) if n.is_ascii_alphabetic() => self.start_tag(at),
            Some('?' | '!') if self.peek(1).is_some_and(|n| n.is_ascii_alphabetic()) => {
                self.start_tag(at);
            }
            Some('/') if self.peek(1).is_some_and(|n| n.is_ascii_alphabetic()) => {
                self.start_close_tag(at);
            }
            Some('!') if self.next_chars_are("!--", false) => {
                self.flush_text();
                self.consume_following(3);
                self.buffer_start = at;
                self.switch_to(TokenizerState::Comment);
            }
            Some('!') if self.next_chars_are("![CDATA[", false) => {
                self.flush_text();
                self.consume_following(8);
                self.buffer_start = at;
                self.switch_to(TokenizerState::CData);
            }
            _ => self.push_text(c, at),
        }
    }

    fn handle_raw_text(&mut self, c: char, at: SourcePosition) {
        if c == '<' && self.at_raw_text_end() {
            self.start_close_tag(at);
        } else {
            self.push_text(c, at);
        }
    }

    /// Whether `</name` followed by whitespace, `>` or `/` comes next.
    fn at_raw_text_end(&mut self) -> bool {
        let Some(name) = self.raw_text_end.clone() else {
            return false;
        };
        if self.peek(0) != Some('/') || !self.next_chars_are_at(1, &name, true) {
            return false;
        }
        let after = name.chars().count() + 1;
        match self.peek(after) {
            Some(c) => is_html_whitespace(c) || c == '>' || c == '/',
            None => true,
        }
    }

    // =========================================================================
    // Opening tags
    // =========================================================================

    fn handle_tag_name(&mut self, c: char, at: SourcePosition) {
        match c {
            c if is_html_whitespace(c) => {
                self.end_tag_name();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            '>' => {
                self.end_tag_name();
                self.finish_tag(FragmentKind::TagEnd, ">", at);
            }
            '/' if self.peek(0) == Some('>') => {
                self.end_tag_name();
                self.consume_following(1);
                self.finish_tag(FragmentKind::SelfClose, "/>", at);
            }
            '?' if self.buffer.starts_with('?') && self.peek(0) == Some('>') => {
                self.end_tag_name();
                self.consume_following(1);
                self.finish_tag(FragmentKind::TagEnd, "?>", at);
            }
            '<' => self.abort_tag_at(c, at),
            '/' => {
                self.end_tag_name();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            _ => self.buffer.push(c),
        }
    }

    fn handle_before_attribute_name(&mut self, c: char, at: SourcePosition) {
        if self.try_end_tag(c, at) {
            return;
        }
        match c {
            c if is_html_whitespace(c) || c == '/' => {}
            '<' => self.abort_tag_at(c, at),
            '"' | '\'' => {
                self.quote = Some(c);
                self.start_buffer(at);
                self.switch_to(TokenizerState::QuotedAttributeName);
            }
            _ => {
                self.start_buffer(at);
                self.buffer.push(c);
                self.switch_to(TokenizerState::AttributeName);
            }
        }
    }

    fn handle_attribute_name(&mut self, c: char, at: SourcePosition) {
        match c {
            c if is_html_whitespace(c) => {
                self.emit_attribute_name();
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            '=' => {
                self.emit_attribute_name();
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            '<' => self.abort_tag_at(c, at),
            _ if self.is_tag_end(c) => {
                self.emit_attribute_name();
                self.emit_attribute_value(None, None, at);
                let _ = self.try_end_tag(c, at);
            }
            _ => self.buffer.push(c),
        }
    }

    fn handle_quoted_attribute_name(&mut self, c: char) {
        if Some(c) != self.quote {
            self.buffer.push(c);
        } else if self.peek(0) == Some(c) {
            self.consume_following(1);
            self.buffer.push(c);
        } else {
            self.emit_attribute_name();
            self.switch_to(TokenizerState::AfterAttributeName);
        }
    }

    fn handle_after_attribute_name(&mut self, c: char, at: SourcePosition) {
        match c {
            c if is_html_whitespace(c) || (c == '/' && self.peek(0) != Some('>')) => {}
            '=' => self.switch_to(TokenizerState::BeforeAttributeValue),
            '<' => self.abort_tag_at(c, at),
            _ => {
                self.emit_attribute_value(None, None, at);
                if !self.try_end_tag(c, at) {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                    self.process(c, at);
                }
            }
        }
    }

    fn handle_before_attribute_value(&mut self, c: char, at: SourcePosition) {
        match c {
            c if is_html_whitespace(c) => {}
            '"' | '\'' => {
                self.quote = Some(c);
                self.start_buffer(at);
                self.switch_to(TokenizerState::QuotedAttributeValue);
            }
            '>' => {
                self.emit_attribute_value(Some(String::new()), None, at);
                self.finish_tag(FragmentKind::TagEnd, ">", at);
            }
            _ => {
                self.start_buffer(at);
                self.buffer.push(c);
                self.switch_to(TokenizerState::UnquotedAttributeValue);
            }
        }
    }

    fn handle_quoted_attribute_value(&mut self, c: char) {
        if Some(c) != self.quote {
            self.buffer.push(c);
        } else if self.peek(0) == Some(c) {
            self.consume_following(1);
            self.buffer.push(c);
        } else {
            let value = std::mem::take(&mut self.buffer);
            let (quote, start) = (self.quote.take(), self.buffer_start);
            self.emit_attribute_value(Some(value), quote, start);
            self.switch_to(TokenizerState::BeforeAttributeName);
        }
    }

    fn handle_unquoted_attribute_value(&mut self, c: char, at: SourcePosition) {
        if is_html_whitespace(c) || c == '>' || (c == '/' && self.peek(0) == Some('>')) {
            let value = std::mem::take(&mut self.buffer);
            let start = self.buffer_start;
            self.emit_attribute_value(Some(value), None, start);
            if !self.try_end_tag(c, at) {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
        } else {
            self.buffer.push(c);
        }
    }

    /// Whether `c` (with lookahead) ends the opening tag.
    fn is_tag_end(&mut self, c: char) -> bool {
        match c {
            '>' => true,
            '/' => self.peek(0) == Some('>'),
            '?' => self.tag.is_processing_instruction() && self.peek(0) == Some('>'),
            _ => false,
        }
    }

    /// End the opening tag if `c` is `>`, `/>` or a processing
    /// instruction's `?>`.
    fn try_end_tag(&mut self, c: char, at: SourcePosition) -> bool {
        if !self.is_tag_end(c) {
            return false;
        }
        match c {
            '>' => self.finish_tag(FragmentKind::TagEnd, ">", at),
            '/' => {
                self.consume_following(1);
                self.finish_tag(FragmentKind::SelfClose, "/>", at);
            }
            _ => {
                self.consume_following(1);
                self.finish_tag(FragmentKind::TagEnd, "?>", at);
            }
        }
        true
    }

    // =========================================================================
    // Close tags, comments, CDATA
    // =========================================================================

    fn handle_close_tag(&mut self, c: char, at: SourcePosition) {
        match c {
            '>' => {
                let raw = std::mem::take(&mut self.tag.raw);
                self.emit(ReaderState::new(FragmentKind::TagClose, Some(raw), self.tag.start));
                self.switch_to(TokenizerState::Text);
            }
            '<' => self.abort_tag_at(c, at),
            _ => {}
        }
    }

    fn handle_comment(&mut self, c: char) {
        if c == '>' && self.buffer.ends_with("--") {
            self.buffer.truncate(self.buffer.len() - 2);
            let text = std::mem::take(&mut self.buffer);
            self.emit(ReaderState::new(FragmentKind::Comment, Some(text), self.buffer_start));
            self.switch_to(TokenizerState::Text);
        } else {
            self.buffer.push(c);
        }
    }

    fn handle_cdata(&mut self, c: char) {
        if c == '>' && self.buffer.ends_with("]]") {
            self.buffer.truncate(self.buffer.len() - 2);
            let text = std::mem::take(&mut self.buffer);
            self.emit(ReaderState::new(FragmentKind::CDataText, Some(text), self.buffer_start));
            self.switch_to(TokenizerState::Text);
        } else {
            self.buffer.push(c);
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for HtmlTokenizer<I> {
    type Item = ReaderState;

    fn next(&mut self) -> Option<ReaderState> {
        while self.ready.is_empty() && !self.finished {
            self.step();
        }
        self.ready.pop_front()
    }
}

impl<I: Iterator<Item = char>> std::fmt::Debug for HtmlTokenizer<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlTokenizer")
            .field("state", &self.state)
            .field("position", &self.position)
            .field("ready", &self.ready.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
