//! Similarity metrics.
//!
//! Two independent metrics, both returning a percentage in `[0, 100]`
//! with two-decimal precision: a character-level Ratcliff/Obershelp
//! ratio for extracted text, and a mean-of-best-matches SSIM score for
//! embedded image sets. The two scores are never averaged together.

mod image;
mod text;

pub use self::image::image_similarity;
pub use self::text::text_similarity;
