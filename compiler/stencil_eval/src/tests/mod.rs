//! Tests that exercise several modules together: documents assembled with
//! the tree builder, post-processed, then rendered.

mod inheritance_tests;
