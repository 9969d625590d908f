//! Core types and metrics for pdfsim, a pairwise PDF similarity
//! reporter.
//!
//! This crate holds everything that is independent of how documents are
//! parsed: the error taxonomy, the two similarity metrics (text and
//! image), the progress-reporting seam, and the CSV report model.
//! Extraction and orchestration live in `pdfsim-backend`; the command
//! line lives in `pdfsim-cli`.

pub mod error;
pub mod progress;
pub mod report;
pub mod similarity;

pub use error::{PdfSimError, Result};
pub use progress::{NoopProgress, ProgressSink};
pub use report::{ReportMode, ReportWriter, ResultRow};
