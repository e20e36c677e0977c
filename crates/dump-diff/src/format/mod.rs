//! Output formats for comparison results.

pub mod unified;
