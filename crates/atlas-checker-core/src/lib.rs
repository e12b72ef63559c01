//! Core functionality for validating atlas label images.
//!
//! This library provides the scan-extract-reconcile pipeline:
//! - Catalog loading: the reference CSV becomes an immutable ID set
//! - Discovery: recursive search for label directories
//! - Extraction: decoding label images into sets of distinct values
//! - Reconciliation: per-directory set difference against the catalog

// -- External Dependencies --

use log::{info, warn};
use rayon::prelude::*;

// -- Standard Library --
use std::path::{Path, PathBuf};

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::Config;
pub use error::{Error, Result};
pub use report::{Diagnostic, ScanOutcome, ScanReport};

// -- Public Modules --
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod extraction;
pub mod reconcile;
pub mod report;

use catalog::{LabelCatalog, LabelValue};
use extraction::FileOutcome;

/// Main entry point for the label checking process
pub struct AtlasChecker {
    catalog: LabelCatalog,
    pool: rayon::ThreadPool,
}

/// Per-directory result produced by a worker, merged by the collecting
/// owner after the parallel phase.
enum DirectoryResult {
    Checked {
        directory: String,
        missing: Vec<LabelValue>,
        failures: Vec<Diagnostic>,
    },
    Skipped {
        path: PathBuf,
        reason: String,
    },
}

impl AtlasChecker {
    /// Create a new AtlasChecker with the provided configuration.
    ///
    /// The catalog is loaded here, before any scanning can start; a
    /// missing or unparsable catalog fails construction and no directory
    /// work is ever dispatched.
    pub fn new(config: &Config) -> Result<Self> {
        let catalog = catalog::load_catalog(&config.csv_path)?;
        info!(
            "Loaded {} catalog IDs from {}",
            catalog.len(),
            config.csv_path.display()
        );

        let num_threads = if config.threads == 0 {
            num_cpus::get()
        } else {
            config.threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .expect("Failed to build thread pool");

        Ok(Self { catalog, pool })
    }

    /// Number of registered identifiers in the loaded catalog.
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// Run the full pipeline over the tree rooted at `root`.
    ///
    /// Directories are processed in parallel; every worker reads the same
    /// catalog and owns its extraction state, so results merge once,
    /// after the parallel phase. Fatal errors are an invalid root here
    /// and catalog problems in [`AtlasChecker::new`]; everything else is
    /// isolated per directory or per file and lands in the diagnostics.
    pub fn run(&self, root: &Path) -> Result<ScanOutcome> {
        let directories = discovery::find_label_directories(root)?;
        info!(
            "Found {} label directories under {}",
            directories.len(),
            root.display()
        );

        let results: Vec<DirectoryResult> = self.pool.install(|| {
            directories
                .par_iter()
                .map(|dir| self.process_directory(dir))
                .collect()
        });

        let mut outcome = ScanOutcome::default();
        for result in results {
            match result {
                DirectoryResult::Checked {
                    directory,
                    missing,
                    failures,
                } => {
                    outcome.report.insert(directory, missing);
                    outcome.diagnostics.extend(failures);
                }
                DirectoryResult::Skipped { path, reason } => {
                    outcome
                        .diagnostics
                        .push(Diagnostic::DirectorySkipped { path, reason });
                }
            }
        }

        Ok(outcome)
    }

    /// Extract and reconcile one label directory.
    fn process_directory(&self, dir: &Path) -> DirectoryResult {
        let extraction = match extraction::extract_directory_values(dir) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Error processing directory {}: {}", dir.display(), e);
                return DirectoryResult::Skipped {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                };
            }
        };

        let missing = reconcile::missing_ids(&extraction.values, &self.catalog);
        let failures = extraction
            .outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                FileOutcome::Failed { path, reason } => {
                    Some(Diagnostic::FileFailed { path, reason })
                }
                FileOutcome::Decoded { .. } => None,
            })
            .collect();

        DirectoryResult::Checked {
            directory: dir.to_string_lossy().into_owned(),
            missing,
            failures,
        }
    }
}
