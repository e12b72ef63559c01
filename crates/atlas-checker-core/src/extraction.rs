use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tiff::decoder::{Decoder, DecodingResult};

use crate::catalog::LabelValue;
use crate::error::{Error, Result};

/// Recognized label image extension, case-sensitive.
pub const LABEL_IMAGE_EXT: &str = "tif";

/// Outcome of processing a single label image file.
///
/// Outcomes are values collected per file rather than errors raised and
/// caught; the aggregator continues iterating regardless of individual
/// results.
#[derive(Debug)]
pub enum FileOutcome {
    /// Every page decoded; `skipped` counts samples rejected by coercion.
    Decoded {
        path: PathBuf,
        sample_count: u64,
        skipped: u64,
    },

    /// The file could not be decoded. Sibling files still contribute.
    Failed { path: PathBuf, reason: String },
}

/// Values extracted from one label directory, with per-file outcomes.
#[derive(Debug, Default)]
pub struct DirectoryExtraction {
    /// Distinct coerced sample values across all decodable files
    pub values: HashSet<LabelValue>,

    /// One entry per `.tif` file visited, in file name order
    pub outcomes: Vec<FileOutcome>,
}

/// Decode every `.tif` file directly inside `dir` and union the coerced
/// sample values into one set.
///
/// Subdirectories and other extensions (including `.TIF` and `.tiff`) are
/// ignored. A file that fails to decode is logged and recorded as a
/// [`FileOutcome::Failed`]; the remaining files still contribute. The only
/// error this returns is a listing failure for the directory itself, which
/// the pipeline driver recovers from by omitting the directory.
pub fn extract_directory_values(dir: &Path) -> Result<DirectoryExtraction> {
    let listing = fs::read_dir(dir).map_err(|source| Error::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|source| Error::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_label_image(&path) {
            files.push(path);
        }
    }
    // Visit in name order so warnings and outcomes are reproducible
    files.sort();

    let mut extraction = DirectoryExtraction::default();
    for path in files {
        match decode_file_values(&path, &mut extraction.values) {
            Ok((sample_count, skipped)) => {
                if skipped > 0 {
                    debug!(
                        "{}: {} of {} samples have no integer representation, skipped",
                        path.display(),
                        skipped,
                        sample_count
                    );
                }
                extraction.outcomes.push(FileOutcome::Decoded {
                    path,
                    sample_count,
                    skipped,
                });
            }
            Err(e) => {
                warn!("Error processing file {}: {}", path.display(), e);
                extraction.outcomes.push(FileOutcome::Failed {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(extraction)
}

/// Returns if the given path has the label image extension.
pub fn is_label_image(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(LABEL_IMAGE_EXT)
}

/// Decode all pages of one TIFF and union coerced samples into `values`.
///
/// Returns the total sample count and how many samples coercion rejected.
fn decode_file_values(
    path: &Path,
    values: &mut HashSet<LabelValue>,
) -> core::result::Result<(u64, u64), tiff::TiffError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let mut sample_count = 0;
    let mut skipped = 0;
    loop {
        let page = decoder.read_image()?;
        accumulate_samples(&page, values, &mut sample_count, &mut skipped);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    Ok((sample_count, skipped))
}

/// Union one decoded page into `values`, coercing each sample.
fn accumulate_samples(
    page: &DecodingResult,
    values: &mut HashSet<LabelValue>,
    sample_count: &mut u64,
    skipped: &mut u64,
) {
    macro_rules! ingest {
        ($buf:expr, $coerce:expr) => {
            for &sample in $buf.iter() {
                *sample_count += 1;
                match $coerce(sample) {
                    Some(value) => {
                        values.insert(value);
                    }
                    None => *skipped += 1,
                }
            }
        };
    }

    match page {
        DecodingResult::U8(buf) => ingest!(buf, |v: u8| Some(LabelValue::from(v))),
        DecodingResult::U16(buf) => ingest!(buf, |v: u16| Some(LabelValue::from(v))),
        DecodingResult::U32(buf) => ingest!(buf, |v: u32| Some(LabelValue::from(v))),
        DecodingResult::U64(buf) => ingest!(buf, coerce_unsigned),
        DecodingResult::I8(buf) => ingest!(buf, |v: i8| Some(LabelValue::from(v))),
        DecodingResult::I16(buf) => ingest!(buf, |v: i16| Some(LabelValue::from(v))),
        DecodingResult::I32(buf) => ingest!(buf, |v: i32| Some(LabelValue::from(v))),
        DecodingResult::I64(buf) => ingest!(buf, Some),
        DecodingResult::F32(buf) => ingest!(buf, |v: f32| coerce_float(f64::from(v))),
        DecodingResult::F64(buf) => ingest!(buf, coerce_float),
    }
}

/// Coerce one floating sample into the label domain.
///
/// Accepted only if finite, with zero fractional part, and exactly
/// representable as a signed 64-bit integer. Fractional values are
/// rejected, never rounded.
pub fn coerce_float(value: f64) -> Option<LabelValue> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    // i64::MAX is not exactly representable as f64; bound by the first
    // power of two outside the range on each side instead
    if value < -(2f64.powi(63)) || value >= 2f64.powi(63) {
        return None;
    }
    Some(value as LabelValue)
}

/// Coerce one unsigned 64-bit sample, rejecting values above the label
/// domain's maximum.
pub fn coerce_unsigned(value: u64) -> Option<LabelValue> {
    LabelValue::try_from(value).ok()
}

// -- Tests --
