//! Comparison orchestration.
//!
//! Enumerates document pairs, drives extraction and the metrics, and
//! streams result rows to a caller-supplied sink. Extracted
//! representations are memoized per document path for the lifetime of
//! the [`Comparer`], so a document participating in many pairs is
//! parsed exactly once.

use crate::images::extract_images;
use crate::text::extract_text;
use image::RgbImage;
use pdfsim_core::similarity::{image_similarity, text_similarity};
use pdfsim_core::{PdfSimError, ProgressSink, Result, ResultRow};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to do when image comparison is requested for a pair where one
/// side has no embedded images.
///
/// The metric itself always rejects empty sets; this policy decides
/// whether the orchestrator lets that error abort the run or records
/// the pair without an image score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingImagePolicy {
    /// Propagate [`PdfSimError::InvalidComparison`] and abort the run.
    #[default]
    Fail,
    /// Leave the pair's image score empty and continue.
    Skip,
}

/// Per-run comparison options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Compute the image similarity column. When false the image
    /// extractor and metric are never invoked.
    pub with_images: bool,
    /// Empty-image-set handling; only consulted when `with_images`.
    pub missing_images: MissingImagePolicy,
}

/// Extracted representations of one document, shared across pairs.
#[derive(Debug)]
struct DocumentRepr {
    text: String,
    /// Populated only when the run computes image similarity.
    images: Option<Vec<RgbImage>>,
}

/// Pairwise comparison engine with a per-document extraction cache.
///
/// Deterministic: given an order-stable candidate list and unchanged
/// files on disk, both enumeration order and every score are identical
/// across runs.
pub struct Comparer {
    options: CompareOptions,
    cache: HashMap<PathBuf, Arc<DocumentRepr>>,
}

impl Comparer {
    /// Create a comparer for one orchestration run.
    #[must_use]
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            cache: HashMap::new(),
        }
    }

    /// Compare every unordered pair of distinct candidates exactly once.
    ///
    /// Pairs are enumerated `i < j` over the candidate list. Two listed
    /// paths sharing a base filename are never compared (defensive rule
    /// against accidental self-duplicates); a dedup set keyed by the
    /// sorted path pair guards against repeated list entries.
    ///
    /// One row is pushed to `sink` per compared pair, and the progress
    /// sink advances once per pair.
    pub fn compare_all(
        &mut self,
        candidates: &[PathBuf],
        progress: &mut dyn ProgressSink,
        mut sink: impl FnMut(ResultRow) -> Result<()>,
    ) -> Result<()> {
        let total = candidates.len() * candidates.len().saturating_sub(1) / 2;
        progress.start(total as u64);

        let mut compared: HashSet<(PathBuf, PathBuf)> = HashSet::new();
        for (i, doc_a) in candidates.iter().enumerate() {
            for doc_b in &candidates[i + 1..] {
                if doc_a.file_name() == doc_b.file_name() {
                    log::debug!(
                        "skipping basename collision: {} / {}",
                        doc_a.display(),
                        doc_b.display()
                    );
                    continue;
                }
                if !compared.insert(pair_key(doc_a, doc_b)) {
                    continue;
                }
                let row = self.compare_pair(doc_a, doc_b)?;
                sink(row)?;
                progress.advance();
            }
        }

        progress.finish();
        Ok(())
    }

    /// Compare one target document against every other candidate, in
    /// candidate order.
    ///
    /// Candidates resolving to the target itself are skipped, so a
    /// candidate list containing the target yields `N - 1` rows.
    pub fn compare_with_target(
        &mut self,
        target: &Path,
        candidates: &[PathBuf],
        progress: &mut dyn ProgressSink,
        mut sink: impl FnMut(ResultRow) -> Result<()>,
    ) -> Result<()> {
        if !target.is_file() {
            return Err(PdfSimError::Configuration(format!(
                "target file not found: {}",
                target.display()
            )));
        }

        let target_canonical = canonical(target);
        let others: Vec<&PathBuf> = candidates
            .iter()
            .filter(|candidate| canonical(candidate) != target_canonical)
            .collect();
        progress.start(others.len() as u64);

        for candidate in others {
            let row = self.compare_pair(target, candidate)?;
            sink(row)?;
            progress.advance();
        }

        progress.finish();
        Ok(())
    }

    /// Extract (or fetch memoized) representations and score one pair.
    fn compare_pair(&mut self, doc_a: &Path, doc_b: &Path) -> Result<ResultRow> {
        let repr_a = self.representation(doc_a)?;
        let repr_b = self.representation(doc_b)?;

        let text_score = text_similarity(&repr_a.text, &repr_b.text);

        let image_score = if self.options.with_images {
            let images_a = repr_a.images.as_deref().unwrap_or(&[]);
            let images_b = repr_b.images.as_deref().unwrap_or(&[]);
            let missing = images_a.is_empty() || images_b.is_empty();
            if missing && self.options.missing_images == MissingImagePolicy::Skip {
                log::debug!(
                    "no image comparison for {} / {}: empty image set",
                    doc_a.display(),
                    doc_b.display()
                );
                None
            } else {
                Some(image_similarity(images_a, images_b)?)
            }
        } else {
            None
        };

        Ok(ResultRow::new(doc_a, doc_b, text_score, image_score))
    }

    fn representation(&mut self, path: &Path) -> Result<Arc<DocumentRepr>> {
        if let Some(repr) = self.cache.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(repr));
        }

        let text = extract_text(path)?;
        let images = if self.options.with_images {
            Some(extract_images(path)?)
        } else {
            None
        };
        let repr = Arc::new(DocumentRepr { text, images });
        self.cache.insert(path.to_path_buf(), Arc::clone(&repr));
        Ok(repr)
    }
}

/// Canonical unordered-pair identity: the sorted path pair.
fn pair_key(doc_a: &Path, doc_b: &Path) -> (PathBuf, PathBuf) {
    if doc_a <= doc_b {
        (doc_a.to_path_buf(), doc_b.to_path_buf())
    } else {
        (doc_b.to_path_buf(), doc_a.to_path_buf())
    }
}

/// Resolved path identity for target self-exclusion; falls back to the
/// path as given when resolution fails.
fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
