//! Foundation types shared by every other module.
//!
//! - [`FileId`] - handle for one Go source file of a checked program
//! - [`Pos`] - a byte position inside a file
//! - [`Span`] - the `[start, end]` byte pair written into graph output
//! - [`TextRange`], [`TextSize`] - re-exported from `text-size`
//!
//! This module has NO dependencies on other gograph modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{Pos, Span, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
