//! Error types for the similarity pipeline.
//!
//! Every fallible operation in the workspace returns [`PdfSimError`].
//! The taxonomy is deliberately small: extraction failures are fatal for
//! the whole run, invalid metric invocations are surfaced rather than
//! coerced, and configuration problems are reported before any work
//! starts.

use thiserror::Error;

/// Error conditions raised by extraction, comparison and reporting.
///
/// # Examples
///
/// ```
/// use pdfsim_core::PdfSimError;
///
/// let err = PdfSimError::Extraction("broken.pdf: invalid xref".to_string());
/// assert_eq!(
///     err.to_string(),
///     "extraction error: broken.pdf: invalid xref"
/// );
/// ```
#[derive(Error, Debug)]
pub enum PdfSimError {
    /// A document could not be opened or its structure could not be
    /// decoded. Fatal for every pair involving the document; the
    /// orchestrator aborts the run rather than skipping pairs.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The image similarity metric was invoked on an empty image set.
    /// The mean over zero best-match scores is undefined, so this is
    /// surfaced instead of silently returning 0 or 100.
    #[error("invalid comparison: {0}")]
    InvalidComparison(String),

    /// Contradictory or missing arguments: no mode selected, both modes
    /// selected, target file not found, or zero candidate documents.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// File I/O failure while reading documents or writing the report.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure writing a row to the CSV report sink.
    #[error("report error: {0}")]
    Csv(#[from] csv::Error),
}

/// Type alias for [`Result<T, PdfSimError>`].
pub type Result<T> = std::result::Result<T, PdfSimError>;
