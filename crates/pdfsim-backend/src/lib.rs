//! PDF extraction backends and the comparison engine for pdfsim.
//!
//! Pure-Rust extraction on top of `lopdf`: [`text::extract_text`]
//! reconstructs a page's reading order from text-positioning operators,
//! [`images::extract_images`] decodes embedded raster XObjects, and
//! [`comparer::Comparer`] drives pairwise comparison with per-document
//! memoization.

pub mod comparer;
pub mod images;
pub mod text;

pub use comparer::{CompareOptions, Comparer, MissingImagePolicy};
pub use images::extract_images;
pub use text::extract_text;
