//! Markup decoding for storefront review pages
//!
//! The storefront answers review requests with a deeply nested XML document
//! describing its own view hierarchy. This module turns that payload into a
//! small owned [`Element`] tree and offers fallible, step-by-step path
//! lookups over it. It knows nothing about reviews.

mod decode;
mod tree;

pub use decode::{Decoder, XmlDecoder};
pub use tree::{Element, Node, PathError, Step};

use thiserror::Error;

/// Errors raised while turning a payload into an element tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("document contains no elements")]
    Empty,
}
