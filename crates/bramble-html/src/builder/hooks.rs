//! Fragment-level hooks for the tree builder.
//!
//! A hook sees every fragment before and after the builder applies it. It
//! receives the builder's position as a [`BuildContext`] value and hands back
//! a (possibly changed) context, or asks the builder to skip the fragment or
//! stop altogether.

use bramble_dom::{Document, NodeId};

use crate::tokenizer::ReaderState;

/// The builder's insertion state as seen by hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Node that receives new children, or the element whose opening tag
    /// is being read.
    pub current_node: NodeId,
    /// Index of the attribute that the next attribute value applies to.
    pub current_attribute: Option<usize>,
    /// Name of the encoding declared by the document, once seen.
    pub detected_encoding: Option<&'static str>,
}

/// What a hook wants done with a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlow {
    /// Go on with this context.
    Continue(BuildContext),
    /// Drop the fragment (only meaningful before it is applied).
    Skip,
    /// Stop building. The tree built so far is kept.
    Cancel,
}

/// Observer of the tree builder.
///
/// Both methods default to passing the context through unchanged. A
/// `current_node` that does not exist in the document is ignored.
pub trait BuildHook {
    /// Called before `fragment` is applied.
    fn before_fragment(
        &mut self,
        _document: &Document,
        _fragment: &ReaderState,
        context: BuildContext,
    ) -> HookFlow {
        HookFlow::Continue(context)
    }

    /// Called after `fragment` has been applied.
    fn after_fragment(
        &mut self,
        _document: &Document,
        _fragment: &ReaderState,
        context: BuildContext,
    ) -> HookFlow {
        HookFlow::Continue(context)
    }
}
