//! Stencil IR - shared source-level types for the Stencil template engine.
//!
//! Every document and expression node carries a [`SourceLocation`] so that
//! evaluation errors can point back at the template text that produced them.

mod location;

pub use location::SourceLocation;
