//! Character-level interception.

use bramble_dom::SourcePosition;

use super::core::TokenizerState;

/// What to do with a character before the state machine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharAction {
    /// Process the character normally.
    Continue,
    /// Process this character instead.
    Replace(char),
    /// Switch to the given state, then process the character in it.
    Switch(TokenizerState),
    /// Stop reading. Pending fragments are flushed as at end of input.
    Cancel,
}

/// Observer called for every character consumed by the main loop.
///
/// Characters taken as lookahead (the `>` of `/>`, the `--` of `<!--`) are
/// consumed together with the character that triggered them and are not
/// reported separately.
pub trait CharHook {
    /// Inspect `c`, read at `position` while in `state`.
    fn before_char(
        &mut self,
        c: char,
        state: TokenizerState,
        position: SourcePosition,
    ) -> CharAction;
}

impl<F> CharHook for F
where
    F: FnMut(char, TokenizerState, SourcePosition) -> CharAction,
{
    fn before_char(
        &mut self,
        c: char,
        state: TokenizerState,
        position: SourcePosition,
    ) -> CharAction {
        self(c, state, position)
    }
}
