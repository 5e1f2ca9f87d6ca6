//! Bulk seed loader
//!
//! # Concurrency
//!
//! JSON files are parsed on up to [`MAX_CONCURRENT_WORKERS`] blocking
//! workers pulling paths from a shared queue. Every file produces exactly one
//! message on the results channel, parsed records or the error that stopped
//! the file, so the single consumer accounts for every file. When the last
//! worker exits its sender is dropped and the drain ends.
//!
//! The consumer batches records and writes each batch in its own
//! transaction; a failed batch is logged and loading continues.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{AuditEvent, AuditSink};
use domain_claims::{Claim, ClaimValidator, ClaimsPort, Pharmacy, Reversal, SeedTable};

use crate::entity::{JsonSeed, SeedEntity};
use crate::error::LoaderError;
use crate::files::{self, ParsedFile};
use crate::report::LoadReport;

/// Batch size used when none or an invalid one is configured
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Upper bound on concurrent file parsers
pub const MAX_CONCURRENT_WORKERS: usize = 10;

const PHARMACY_SUBDIR: &str = "pharmacies";
const PHARMACY_PATTERN: &str = "*.csv";

/// Returns `requested` if it lies in `1..=MAX_BATCH_SIZE`, else the default
pub fn effective_batch_size(requested: usize) -> usize {
    if requested == 0 || requested > MAX_BATCH_SIZE {
        warn!(
            requested,
            default = DEFAULT_BATCH_SIZE,
            max = MAX_BATCH_SIZE,
            "Invalid batch size, using default"
        );
        DEFAULT_BATCH_SIZE
    } else {
        requested
    }
}

enum FileOutcome<T> {
    Parsed(ParsedFile<T>),
    Failed { path: PathBuf, error: LoaderError },
}

/// Seeds the claims tables from a data directory
pub struct Loader {
    port: Arc<dyn ClaimsPort>,
    audit: Arc<dyn AuditSink>,
    validator: ClaimValidator,
    batch_size: usize,
}

impl Loader {
    /// Creates a loader with the default batch size
    ///
    /// # Arguments
    ///
    /// * `port` - Persistence gateway the batches are written through
    /// * `audit` - Receives one event per inserted record
    /// * `validator` - Field-format rules applied to every record
    pub fn new(port: Arc<dyn ClaimsPort>, audit: Arc<dyn AuditSink>, validator: ClaimValidator) -> Self {
        Self {
            port,
            audit,
            validator,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the batch size, falling back to the default if out of range
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = effective_batch_size(batch_size);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Loads pharmacies, then claims, then reversals
    ///
    /// Each step runs regardless of how the previous one went; the caller
    /// decides what to do with failures.
    pub async fn load_all(&self, data_dir: &Path) -> Vec<(SeedTable, Result<LoadReport, LoaderError>)> {
        vec![
            (SeedTable::Pharmacies, self.load_pharmacies(data_dir).await),
            (SeedTable::Claims, self.load_claims(data_dir).await),
            (SeedTable::Reversals, self.load_reversals(data_dir).await),
        ]
    }

    /// Loads `pharmacies/*.csv`
    ///
    /// # Errors
    ///
    /// Unlike claims and reversals, missing pharmacy data is fatal:
    ///
    /// * `MissingDirectory` / `NoFiles` - no pharmacy files
    /// * `NothingLoaded` - files were present but no row was inserted
    #[instrument(skip_all, fields(data_dir = %data_dir.display()))]
    pub async fn load_pharmacies(&self, data_dir: &Path) -> Result<LoadReport, LoaderError> {
        if self.already_populated(SeedTable::Pharmacies).await {
            return Ok(LoadReport::default());
        }

        let paths = files::discover(data_dir, PHARMACY_SUBDIR, PHARMACY_PATTERN)?;
        let mut report = LoadReport {
            files: paths.len(),
            ..LoadReport::default()
        };

        for path in paths {
            let (tx, mut rx) = mpsc::channel::<Vec<Pharmacy>>(2);
            let validator = self.validator;
            let batch_size = self.batch_size;
            let reader_path = path.clone();

            let reader = tokio::task::spawn_blocking(move || {
                files::read_pharmacy_csv(&reader_path, &validator, batch_size, |chunk| {
                    tx.blocking_send(chunk).is_ok()
                })
            });

            while let Some(chunk) = rx.recv().await {
                self.flush(chunk, &mut report).await;
            }

            match reader.await {
                Ok(Ok(stats)) => {
                    report.parsed += stats.parsed;
                    report.skipped += stats.skipped;
                    debug!(file = %path.display(), parsed = stats.parsed, skipped = stats.skipped, "Pharmacy file read");
                }
                Ok(Err(e)) => {
                    warn!(file = %path.display(), error = %e, "Failed to load pharmacy file");
                    report.failed_files += 1;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Pharmacy reader task failed");
                    report.failed_files += 1;
                }
            }
        }

        log_report(SeedTable::Pharmacies, &report);

        if report.inserted == 0 {
            return Err(LoaderError::NothingLoaded(SeedTable::Pharmacies));
        }
        Ok(report)
    }

    /// Loads `claims/*.json`; absent files are not an error
    #[instrument(skip_all, fields(data_dir = %data_dir.display()))]
    pub async fn load_claims(&self, data_dir: &Path) -> Result<LoadReport, LoaderError> {
        self.load_json::<Claim>(data_dir).await
    }

    /// Loads `reverts/*.json`; absent files are not an error
    #[instrument(skip_all, fields(data_dir = %data_dir.display()))]
    pub async fn load_reversals(&self, data_dir: &Path) -> Result<LoadReport, LoaderError> {
        self.load_json::<Reversal>(data_dir).await
    }

    async fn load_json<T: JsonSeed>(&self, data_dir: &Path) -> Result<LoadReport, LoaderError> {
        if self.already_populated(T::TABLE).await {
            return Ok(LoadReport::default());
        }

        let paths = match files::discover(data_dir, T::SUBDIR, T::PATTERN) {
            Ok(paths) => paths,
            Err(e) if e.is_no_data() => {
                info!(table = %T::TABLE, reason = %e, "No seed data found");
                return Ok(LoadReport::default());
            }
            Err(e) => return Err(e),
        };

        let mut report = LoadReport {
            files: paths.len(),
            ..LoadReport::default()
        };

        let workers = MAX_CONCURRENT_WORKERS.min(paths.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(paths)));
        let (tx, mut rx) = mpsc::channel::<FileOutcome<T>>(workers * 2);

        info!(table = %T::TABLE, files = report.files, workers, "Loading seed files");

        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let validator = self.validator;

            tokio::task::spawn_blocking(move || loop {
                let next = queue
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();
                let Some(path) = next else {
                    debug!(worker, "Seed worker finished");
                    break;
                };

                let outcome = match files::read_json_records::<T>(&path, &validator) {
                    Ok(parsed) => FileOutcome::Parsed(parsed),
                    Err(error) => FileOutcome::Failed { path, error },
                };
                if tx.blocking_send(outcome).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut batch: Vec<T> = Vec::with_capacity(self.batch_size);
        while let Some(outcome) = rx.recv().await {
            match outcome {
                FileOutcome::Parsed(parsed) => {
                    debug!(
                        file = %parsed.path.display(),
                        parsed = parsed.records.len(),
                        skipped = parsed.skipped,
                        "Seed file parsed"
                    );
                    report.parsed += parsed.records.len();
                    report.skipped += parsed.skipped;

                    for record in parsed.records {
                        batch.push(record);
                        if batch.len() >= self.batch_size {
                            let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                            self.flush(full, &mut report).await;
                        }
                    }
                }
                FileOutcome::Failed { path, error } => {
                    warn!(file = %path.display(), error = %error, "Failed to load seed file");
                    report.failed_files += 1;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(batch, &mut report).await;
        }

        log_report(T::TABLE, &report);
        Ok(report)
    }

    async fn already_populated(&self, table: SeedTable) -> bool {
        match self.port.count(table).await {
            Ok(0) => false,
            Ok(rows) => {
                info!(%table, rows, "Table already populated, skipping load");
                true
            }
            Err(e) => {
                warn!(%table, error = %e, "Failed to count rows, loading anyway");
                false
            }
        }
    }

    async fn flush<T: SeedEntity>(&self, batch: Vec<T>, report: &mut LoadReport) {
        match T::insert_batch(self.port.as_ref(), &batch).await {
            Ok(outcome) => {
                report.inserted += outcome.inserted_count();
                report.duplicates += outcome.duplicates;
                for record in outcome.inserted.iter().filter_map(|&i| batch.get(i)) {
                    self.audit.record(AuditEvent::new(T::AUDIT_KIND, record.audit_payload()));
                }
                debug!(
                    table = %T::TABLE,
                    rows = batch.len(),
                    inserted = outcome.inserted_count(),
                    duplicates = outcome.duplicates,
                    "Batch committed"
                );
            }
            Err(e) => {
                warn!(table = %T::TABLE, rows = batch.len(), error = %e, "Batch insert failed, continuing");
                report.failed_batches += 1;
            }
        }
    }
}

fn log_report(table: SeedTable, report: &LoadReport) {
    info!(
        %table,
        files = report.files,
        failed_files = report.failed_files,
        parsed = report.parsed,
        skipped = report.skipped,
        inserted = report.inserted,
        duplicates = report.duplicates,
        failed_batches = report.failed_batches,
        "Seed load complete"
    );
}
