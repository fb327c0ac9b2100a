//! Pool construction and CSV persistence
//!
//! The pool file is the system of record for issuance: one row per code
//! with assignment-status columns. These tools only ever append a fresh
//! pool; the registration system fills the assignment columns later.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Code, RedeemError, Result};

/// Assignment status of a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    Free,
    Assigned,
}

/// One row of the code pool file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    pub code: Code,
    pub status: CodeStatus,
    pub assigned_to_email: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl PoolEntry {
    /// A freshly generated, unassigned entry.
    pub fn free(code: Code) -> Self {
        Self {
            code,
            status: CodeStatus::Free,
            assigned_to_email: None,
            assigned_at: None,
        }
    }
}

/// Default cap on random draws per requested code.
pub const DEFAULT_ATTEMPTS_PER_CODE: u64 = 1000;

/// Draw random codes until `count` distinct, non-easy codes are collected.
///
/// Rejection sampling over the ~1.4M-code pattern space. The draw count is
/// bounded by `max_attempts`; hitting the bound yields
/// [`RedeemError::PoolExhausted`] instead of looping forever.
pub fn build_pool<R: Rng + ?Sized>(
    count: usize,
    max_attempts: u64,
    rng: &mut R,
) -> Result<Vec<Code>> {
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    let mut attempts: u64 = 0;

    while out.len() < count {
        if attempts >= max_attempts {
            return Err(RedeemError::PoolExhausted {
                wanted: count,
                got: out.len(),
                attempts,
            });
        }
        attempts += 1;

        let candidate = Code::sample(rng);
        if candidate.is_easy() || !seen.insert(candidate.clone()) {
            continue;
        }
        out.push(candidate);
    }

    debug!(count, attempts, "pool sampling finished");
    Ok(out)
}

/// Write a fresh pool: header row plus one `free` row per code.
///
/// Parent directories are created as needed; an existing file at `path`
/// is overwritten.
pub fn write_pool(path: &Path, codes: &[Code]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for code in codes {
        writer.serialize(PoolEntry::free(code.clone()))?;
    }
    writer.flush()?;
    Ok(())
}

// Read-side row: the code column is taken as raw text first so it can be
// trimmed and uppercased before validation.
#[derive(Debug, Deserialize)]
struct RawEntry {
    code: String,
    status: CodeStatus,
    assigned_to_email: Option<String>,
    assigned_at: Option<DateTime<Utc>>,
}

/// Read every entry of a pool file.
///
/// A malformed row is fatal and reported with its 1-based record number
/// (the header is record 1). There is no per-row recovery.
pub fn read_pool(path: &Path) -> Result<Vec<PoolEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();

    for (idx, row) in reader.deserialize::<RawEntry>().enumerate() {
        let record = idx as u64 + 2;
        let raw = row.map_err(|e| RedeemError::MalformedRow {
            record,
            reason: e.to_string(),
        })?;
        let code = raw
            .code
            .trim()
            .to_ascii_uppercase()
            .parse::<Code>()
            .map_err(|e| RedeemError::MalformedRow {
                record,
                reason: e.to_string(),
            })?;
        entries.push(PoolEntry {
            code,
            status: raw.status,
            assigned_to_email: raw.assigned_to_email,
            assigned_at: raw.assigned_at,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pool_has_distinct_valid_codes() {
        let mut rng = StdRng::seed_from_u64(42);
        let codes = build_pool(500, 500_000, &mut rng).unwrap();

        assert_eq!(codes.len(), 500);
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|c| !c.is_easy()));
    }

    #[test]
    fn exhaustion_is_an_error_not_a_hang() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_pool(100, 10, &mut rng).unwrap_err();
        match err {
            RedeemError::PoolExhausted { wanted, got, attempts } => {
                assert_eq!(wanted, 100);
                assert!(got <= 10);
                assert_eq!(attempts, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool/code_pool.csv");
        let mut rng = StdRng::seed_from_u64(3);
        let codes = build_pool(25, 25_000, &mut rng).unwrap();

        write_pool(&path, &codes).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("code,status,assigned_to_email,assigned_at"));

        let entries = read_pool(&path).unwrap();
        assert_eq!(entries.len(), 25);
        for (entry, code) in entries.iter().zip(&codes) {
            assert_eq!(&entry.code, code);
            assert_eq!(entry.status, CodeStatus::Free);
            assert!(entry.assigned_to_email.is_none());
            assert!(entry.assigned_at.is_none());
        }
    }

    #[test]
    fn reader_normalizes_code_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.csv");
        std::fs::write(
            &path,
            "code,status,assigned_to_email,assigned_at\n 5k2m9 ,free,,\n",
        )
        .unwrap();

        let entries = read_pool(&path).unwrap();
        assert_eq!(entries[0].code.to_string(), "5K2M9");
    }

    #[test]
    fn reader_parses_assigned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.csv");
        std::fs::write(
            &path,
            "code,status,assigned_to_email,assigned_at\n\
             5K2M9,assigned,guest@example.test,2026-08-01T10:00:00Z\n",
        )
        .unwrap();

        let entries = read_pool(&path).unwrap();
        assert_eq!(entries[0].status, CodeStatus::Assigned);
        assert_eq!(
            entries[0].assigned_to_email.as_deref(),
            Some("guest@example.test")
        );
        assert!(entries[0].assigned_at.is_some());
    }

    #[test]
    fn malformed_row_is_fatal_with_record_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.csv");
        std::fs::write(
            &path,
            "code,status,assigned_to_email,assigned_at\n5K2M9,free,,\nBOGUS,free,,\n",
        )
        .unwrap();

        let err = read_pool(&path).unwrap_err();
        match err {
            RedeemError::MalformedRow { record, .. } => assert_eq!(record, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
