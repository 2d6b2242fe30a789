//! Helper methods for the reader state machine.
//!
//! - State transitions
//! - Input handling (consume, lookahead)
//! - Fragment emission, including holding back and re-emitting tag text

use std::mem;

use bramble_common::warn_once;
use bramble_dom::{ParseError, ParseErrorKind, ReadFlags, SourcePosition};

use super::core::{HtmlTokenizer, PendingTag, TokenizerState};
use super::fragment::{FragmentKind, ReaderState};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl<I: Iterator<Item = char>> HtmlTokenizer<I> {
    pub(super) const fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    pub(super) fn start_buffer(&mut self, at: SourcePosition) {
        self.buffer.clear();
        self.buffer_start = at;
    }

    pub(super) fn start_tag(&mut self, at: SourcePosition) {
        self.flush_text();
        self.tag = PendingTag::starting_at(at);
        self.start_buffer(at);
        self.switch_to(TokenizerState::TagName);
    }

    pub(super) fn start_close_tag(&mut self, at: SourcePosition) {
        self.flush_text();
        self.tag = PendingTag::starting_at(at);
        self.switch_to(TokenizerState::CloseTag);
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl<I: Iterator<Item = char>> HtmlTokenizer<I> {
    /// Consume the next character and its position.
    pub(super) fn advance(&mut self) -> Option<(char, SourcePosition)> {
        let c = self.lookahead.pop_front().or_else(|| self.input.next())?;
        let at = self.position;
        self.position = at.advance(c);
        Some((c, at))
    }

    /// Look `offset` characters past the one just consumed.
    pub(super) fn peek(&mut self, offset: usize) -> Option<char> {
        while self.lookahead.len() <= offset {
            let c = self.input.next()?;
            self.lookahead.push_back(c);
        }
        self.lookahead.get(offset).copied()
    }

    /// Whether the upcoming characters spell `target`.
    pub(super) fn next_chars_are(&mut self, target: &str, ignore_case: bool) -> bool {
        self.next_chars_are_at(0, target, ignore_case)
    }

    /// Whether the characters starting `offset` ahead spell `target`.
    pub(super) fn next_chars_are_at(&mut self, offset: usize, target: &str, ignore_case: bool) -> bool {
        target.chars().enumerate().all(|(i, expected)| {
            self.peek(offset + i).is_some_and(|actual| {
                if ignore_case {
                    actual.eq_ignore_ascii_case(&expected)
                } else {
                    actual == expected
                }
            })
        })
    }

    /// Consume `count` characters already inspected through lookahead,
    /// keeping the tag's raw text complete.
    pub(super) fn consume_following(&mut self, count: usize) {
        for _ in 0..count {
            let Some((c, _)) = self.advance() else {
                return;
            };
            if self.state.is_in_tag() {
                self.tag.raw.push(c);
            }
        }
    }
}

// =============================================================================
// Emission Helpers
// =============================================================================

impl<I: Iterator<Item = char>> HtmlTokenizer<I> {
    pub(super) fn emit(&mut self, fragment: ReaderState) {
        self.ready.push_back(fragment);
    }

    pub(super) fn push_text(&mut self, c: char, at: SourcePosition) {
        if self.buffer.is_empty() {
            self.buffer_start = at;
        }
        self.buffer.push(c);
    }

    pub(super) fn flush_text(&mut self) {
        if !self.buffer.is_empty() {
            let text = mem::take(&mut self.buffer);
            self.emit(ReaderState::new(FragmentKind::Text, Some(text), self.buffer_start));
        }
    }

    /// Hold a fragment of the current tag until the tag ends.
    fn hold(&mut self, fragment: ReaderState) {
        self.tag.fragments.push(fragment);
    }

    pub(super) fn end_tag_name(&mut self) {
        let name = mem::take(&mut self.buffer);
        self.tag.name.clone_from(&name);
        let start = self.tag.start;
        self.hold(ReaderState::new(FragmentKind::TagOpen, Some(name), start));
    }

    pub(super) fn emit_attribute_name(&mut self) {
        let name = mem::take(&mut self.buffer);
        self.tag.last_attribute.clone_from(&name);
        let fragment = ReaderState::new(FragmentKind::AttrName, Some(name), self.buffer_start)
            .with_quote(self.quote.take());
        self.hold(fragment);
    }

    pub(super) fn emit_attribute_value(
        &mut self,
        value: Option<String>,
        quote: Option<char>,
        at: SourcePosition,
    ) {
        if self.tag.name.eq_ignore_ascii_case("script")
            && self.tag.last_attribute.eq_ignore_ascii_case("type")
        {
            self.tag.script_type.clone_from(&value);
        }
        self.hold(ReaderState::new(FragmentKind::AttrValue, value, at).with_quote(quote));
    }

    /// Release the held tag fragments followed by the tag's end marker, and
    /// pick the state that follows the tag.
    pub(super) fn finish_tag(&mut self, kind: FragmentKind, marker: &str, at: SourcePosition) {
        let held = mem::take(&mut self.tag.fragments);
        self.ready.extend(held);
        self.emit(ReaderState::new(kind, Some(marker.to_string()), at));
        self.tag.raw.clear();
        self.buffer.clear();
        self.quote = None;

        let name = &self.tag.name;
        let raw_text = kind == FragmentKind::TagEnd
            && !name.starts_with(['?', '!'])
            && self.options.read_flags(name).contains(ReadFlags::RAW_TEXT)
            && !self.is_parsed_script();
        if raw_text {
            self.raw_text_end = Some(name.clone());
            self.switch_to(TokenizerState::RawText);
        } else {
            self.raw_text_end = None;
            self.switch_to(TokenizerState::Text);
        }
    }

    fn is_parsed_script(&self) -> bool {
        self.tag.name.eq_ignore_ascii_case("script")
            && self
                .tag
                .script_type
                .as_deref()
                .is_some_and(|t| self.options.is_parsed_script_type(t))
    }

    /// Give up on the current tag: its text so far becomes a text fragment
    /// and a `TagNotClosed` error is recorded at its start.
    pub(super) fn abort_tag(&mut self) {
        let raw = mem::take(&mut self.tag.raw);
        self.tag.fragments.clear();
        let start = self.tag.start;
        let shown: String = raw.chars().take(32).collect();
        self.errors.push(ParseError::new(
            ParseErrorKind::TagNotClosed,
            start,
            format!("tag `{shown}` was not closed; kept as text"),
        ));
        self.buffer.clear();
        self.quote = None;
        self.emit(ReaderState::new(FragmentKind::Text, Some(raw), start));
        self.switch_to(TokenizerState::Text);
    }

    /// Abort the current tag because `c` (a `<`) interrupted it, then read
    /// `c` again as text.
    pub(super) fn abort_tag_at(&mut self, c: char, at: SourcePosition) {
        let _ = self.tag.raw.pop();
        self.abort_tag();
        self.process(c, at);
    }

    /// End of input (or cancellation): flush whatever is pending.
    pub(super) fn flush_at_end(&mut self) {
        match self.state {
            TokenizerState::Text | TokenizerState::RawText => self.flush_text(),
            TokenizerState::Comment | TokenizerState::CData => {
                let kind = if self.state == TokenizerState::Comment {
                    FragmentKind::Comment
                } else {
                    FragmentKind::CDataText
                };
                warn_once("HTML Reader", "input ended inside a comment or CDATA section");
                self.errors.push(ParseError::new(
                    ParseErrorKind::TagNotClosed,
                    self.buffer_start,
                    format!("{kind} section was not closed"),
                ));
                let text = mem::take(&mut self.buffer);
                self.emit(ReaderState::new(kind, Some(text), self.buffer_start));
            }
            _ => self.abort_tag(),
        }
        self.switch_to(TokenizerState::Text);
        self.finished = true;
    }
}
