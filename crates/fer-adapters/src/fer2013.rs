//! FER-2013 CSV dataset adapter.
//!
//! The file has a header row and the columns `emotion,pixels[,Usage]`:
//! `emotion` is the class index, `pixels` holds 2304 space-separated 0-255
//! gray levels in row-major order, `Usage` names the split
//! (`Training`, `PublicTest`, `PrivateTest`).

use anyhow::{Context, Result};
use fer_core::model::IMAGE_SIZE;
use fer_core::{normalize_pixels, Emotion, LabeledSample};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Filters applied while reading the dataset.
#[derive(Debug, Clone, Default)]
pub struct Fer2013Options {
    /// Stop after this many samples.
    pub limit: Option<usize>,
    /// Only keep rows whose `Usage` column equals this (case-insensitive).
    pub usage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    emotion: String,
    pixels: String,
    #[serde(rename = "Usage", default)]
    usage: Option<String>,
}

/// Iterator over the valid samples of a FER-2013 file.
///
/// Malformed rows are logged and skipped.
pub struct Fer2013Samples<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, Row>,
    options: Fer2013Options,
    line: u64,
    yielded: usize,
    skipped: usize,
}

impl Fer2013Samples<File> {
    /// Opens a dataset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or lacks the
    /// `emotion` and `pixels` columns.
    pub fn open(path: impl AsRef<Path>, options: Fer2013Options) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening FER-2013 dataset {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file, options)
            .with_context(|| format!("Invalid dataset: {}", path.display()))
    }
}

impl<R: Read> Fer2013Samples<R> {
    /// Reads a dataset from any byte source.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read or lacks the
    /// `emotion` and `pixels` columns.
    pub fn from_reader(reader: R, options: Fer2013Options) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?;
        for column in ["emotion", "pixels"] {
            if !headers.iter().any(|h| h == column) {
                anyhow::bail!("Missing '{column}' column");
            }
        }

        Ok(Self {
            rows: rdr.into_deserialize(),
            options,
            line: 1,
            yielded: 0,
            skipped: 0,
        })
    }

    /// Rows skipped so far because they were malformed.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    fn keeps(&self, row: &Row) -> bool {
        match (&self.options.usage, &row.usage) {
            (None, _) => true,
            (Some(wanted), Some(usage)) => usage.eq_ignore_ascii_case(wanted),
            (Some(_), None) => false,
        }
    }
}

impl<R: Read> Iterator for Fer2013Samples<R> {
    type Item = LabeledSample;

    fn next(&mut self) -> Option<LabeledSample> {
        if self.options.limit.is_some_and(|limit| self.yielded >= limit) {
            return None;
        }

        loop {
            let row = self.rows.next()?;
            self.line += 1;

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping line {}: {e}", self.line);
                    self.skipped += 1;
                    continue;
                }
            };

            if !self.keeps(&row) {
                continue;
            }

            match parse_row(&row) {
                Ok(sample) => {
                    self.yielded += 1;
                    return Some(sample);
                }
                Err(e) => {
                    warn!("Skipping line {}: {e:#}", self.line);
                    self.skipped += 1;
                }
            }
        }
    }
}

fn parse_row(row: &Row) -> Result<LabeledSample> {
    let index: usize = row
        .emotion
        .parse()
        .with_context(|| format!("Invalid emotion '{}'", row.emotion))?;
    let emotion =
        Emotion::try_from(index).map_err(|i| anyhow::anyhow!("Emotion {i} out of range"))?;

    let pixels = row
        .pixels
        .split_whitespace()
        .map(str::parse::<u8>)
        .collect::<Result<Vec<u8>, _>>()
        .context("Invalid pixel value")?;

    if pixels.len() != IMAGE_SIZE * IMAGE_SIZE {
        anyhow::bail!(
            "Expected {} pixels, found {}",
            IMAGE_SIZE * IMAGE_SIZE,
            pixels.len()
        );
    }

    Ok(LabeledSample {
        emotion,
        image: normalize_pixels(&pixels)?,
    })
}
