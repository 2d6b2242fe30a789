//! Depth guards.
//!
//! Every walk up or down the tree is bounded so that pathological input
//! degrades into a flattened tree instead of a stack overflow or a hang.

/// Maximum number of open elements the builder will nest before it stops
/// descending and attaches further elements to the deepest allowed parent.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Upper bound on any ancestor walk (cache invalidation, close-tag search,
/// namespace lookup). Larger than [`MAX_NESTING_DEPTH`] so that trees built
/// through the mutation API can still be a little deeper than parsed ones.
pub const MAX_TREE_DEPTH: usize = 4096;
