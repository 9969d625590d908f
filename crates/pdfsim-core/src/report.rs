//! Result rows and the CSV report sink.
//!
//! One row is produced per comparison pair and streamed to the writer
//! in pair-enumeration order. Scores are written as plain decimals with
//! two fractional digits (`87.42`), never with a percent sign.

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Which comparison mode produced the report.
///
/// The mode only affects the header labels; row layout is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Every unordered pair of distinct candidates, compared once.
    AllPairs,
    /// One designated target compared against every other candidate.
    Target,
}

impl ReportMode {
    /// Header labels for this mode.
    #[must_use]
    pub fn headers(self, with_images: bool) -> Vec<&'static str> {
        let mut headers = match self {
            Self::AllPairs => vec!["PDF 1", "PDF 2", "Text Similarity Percentage"],
            Self::Target => vec!["Source PDF", "Compared PDF", "Text Similarity Percentage"],
        };
        if with_images {
            headers.push("Image Similarity Percentage");
        }
        headers
    }
}

/// One comparison result: a document pair and its similarity scores.
///
/// `image_score` is `None` when image comparison is disabled for the
/// run, or when the configured missing-image policy skipped the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// First document of the pair (the target, in target mode).
    pub doc_a: PathBuf,
    /// Second document of the pair.
    pub doc_b: PathBuf,
    /// Text similarity percentage in `[0, 100]`, two-decimal precision.
    pub text_score: f64,
    /// Image similarity percentage, if computed.
    pub image_score: Option<f64>,
}

impl ResultRow {
    /// Create a row for a compared pair.
    #[must_use]
    pub fn new(doc_a: &Path, doc_b: &Path, text_score: f64, image_score: Option<f64>) -> Self {
        Self {
            doc_a: doc_a.to_path_buf(),
            doc_b: doc_b.to_path_buf(),
            text_score,
            image_score,
        }
    }
}

/// Streaming CSV writer for comparison results.
///
/// Writes the mode-dependent header on construction, then one record
/// per [`ResultRow`]. Rows are flushed on [`finish`](ReportWriter::finish);
/// rows already flushed survive external termination of a long run.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    with_images: bool,
}

impl ReportWriter<std::fs::File> {
    /// Create a report file at `path` and write the header row.
    pub fn create(path: &Path, mode: ReportMode, with_images: bool) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Self::from_csv_writer(writer, mode, with_images)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wrap an arbitrary writer and emit the header row.
    pub fn new(inner: W, mode: ReportMode, with_images: bool) -> Result<Self> {
        Self::from_csv_writer(csv::Writer::from_writer(inner), mode, with_images)
    }

    fn from_csv_writer(
        mut writer: csv::Writer<W>,
        mode: ReportMode,
        with_images: bool,
    ) -> Result<Self> {
        writer.write_record(mode.headers(with_images))?;
        Ok(Self { writer, with_images })
    }

    /// Append one result row.
    pub fn write_row(&mut self, row: &ResultRow) -> Result<()> {
        let mut record = vec![
            row.doc_a.display().to_string(),
            row.doc_b.display().to_string(),
            format!("{:.2}", row.text_score),
        ];
        if self.with_images {
            record.push(
                row.image_score
                    .map(|score| format!("{score:.2}"))
                    .unwrap_or_default(),
            );
        }
        self.writer.write_record(&record)?;
        Ok(())
    }

    /// Flush buffered rows to the underlying writer.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
