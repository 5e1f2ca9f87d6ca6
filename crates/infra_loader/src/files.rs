//! Seed file discovery and parsing
//!
//! Everything here is blocking and runs on the blocking thread pool.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use domain_claims::{ClaimValidator, Pharmacy, PharmacyChain};

use crate::entity::JsonSeed;
use crate::error::LoaderError;

/// Records parsed from one file
#[derive(Debug)]
pub struct ParsedFile<T> {
    pub path: PathBuf,
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Counters from a streamed CSV read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvStats {
    pub parsed: usize,
    pub skipped: usize,
}

/// Lists the files in `data_dir/subdir` matching `pattern`, sorted by path
///
/// # Errors
///
/// * `MissingDirectory` - the subdirectory does not exist
/// * `NoFiles` - nothing matches the pattern
pub fn discover(data_dir: &Path, subdir: &str, pattern: &'static str) -> Result<Vec<PathBuf>, LoaderError> {
    let dir = data_dir.join(subdir);
    if !dir.is_dir() {
        return Err(LoaderError::MissingDirectory(dir));
    }

    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!(path = %e.path().display(), error = %e.error(), "Unreadable seed path skipped"),
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(LoaderError::NoFiles { dir, pattern });
    }
    Ok(files)
}

/// Drops a trailing `%` left behind by some shell redirections
pub fn strip_trailing_percent(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    match trimmed.strip_suffix('%') {
        Some(rest) => rest.trim_end(),
        None => trimmed,
    }
}

/// Reads a JSON array file into validated records
///
/// Elements that fail to deserialize or validate are logged and counted,
/// never fatal for the file.
///
/// # Errors
///
/// * `Io` - the file cannot be read
/// * `Json` - the file is not a JSON array
pub fn read_json_records<T: JsonSeed>(path: &Path, validator: &ClaimValidator) -> Result<ParsedFile<T>, LoaderError> {
    let raw = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let elements: Vec<serde_json::Value> =
        serde_json::from_str(strip_trailing_percent(&raw)).map_err(|source| LoaderError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::with_capacity(elements.len());
    let mut skipped = 0;

    for (index, element) in elements.into_iter().enumerate() {
        let record = match serde_json::from_value::<T>(element) {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %path.display(), index, error = %e, "Malformed {} record skipped", T::TABLE);
                skipped += 1;
                continue;
            }
        };
        if let Err(e) = record.check(validator) {
            warn!(file = %path.display(), index, error = %e, "Invalid {} record skipped", T::TABLE);
            skipped += 1;
            continue;
        }
        records.push(record);
    }

    Ok(ParsedFile {
        path: path.to_path_buf(),
        records,
        skipped,
    })
}

/// Streams a `chain,npi` CSV file, handing full chunks to `sink`
///
/// The header row is skipped. Lines with the wrong field count, an unknown
/// chain or a malformed NPI are logged and counted. Reading stops early if
/// `sink` returns `false`.
///
/// # Errors
///
/// * `Csv` - the file cannot be opened
pub fn read_pharmacy_csv<F>(
    path: &Path,
    validator: &ClaimValidator,
    chunk_size: usize,
    mut sink: F,
) -> Result<CsvStats, LoaderError>
where
    F: FnMut(Vec<Pharmacy>) -> bool,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut stats = CsvStats::default();
    let mut chunk = Vec::with_capacity(chunk_size);

    for (index, result) in reader.records().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %path.display(), line, error = %e, "Unreadable pharmacy line skipped");
                stats.skipped += 1;
                continue;
            }
        };

        match pharmacy_from_record(&record, validator) {
            Ok(pharmacy) => {
                stats.parsed += 1;
                chunk.push(pharmacy);
            }
            Err(reason) => {
                warn!(file = %path.display(), line, error = %reason, "Invalid pharmacy line skipped");
                stats.skipped += 1;
                continue;
            }
        }

        if chunk.len() >= chunk_size && !sink(std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size))) {
            return Ok(stats);
        }
    }

    if !chunk.is_empty() {
        sink(chunk);
    }
    Ok(stats)
}

fn pharmacy_from_record(record: &csv::StringRecord, validator: &ClaimValidator) -> Result<Pharmacy, String> {
    if record.len() != 2 {
        return Err(format!("expected 2 fields, got {}", record.len()));
    }
    let chain: PharmacyChain = record[0].parse().map_err(|e: domain_claims::ValidationError| e.message)?;
    let npi = &record[1];
    validator.validate_npi(npi).map_err(|e| e.message)?;
    Ok(Pharmacy::new(npi, chain))
}
