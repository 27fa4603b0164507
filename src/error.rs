//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PigmentError {
    /// The paint id does not name an interned key.
    #[error("invalid paint id {0}")]
    InvalidPaintId(u32),

    /// The key's records do not form a well-shaped forest.
    #[error("malformed paint key")]
    MalformedKey,

    /// A key record names a snippet id outside every registered range.
    #[error("unknown snippet id {0}")]
    UnknownSnippet(i32),

    /// A runtime-effect node has no live effect registered for assembly.
    #[error("no runtime effect registered for snippet id {0}")]
    MissingRuntimeEffect(i32),
}
