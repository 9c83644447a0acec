//! FG-009: Emitted-program artifact persistence.
//!
//! The engine itself persists nothing; callers that want a file artifact
//! (the CLI does) get a timestamped, content-hashed `.py` path and an
//! atomic write here. Filenames are `<problem>_<timestamp>_<hash8>.py`
//! where the hash is the BLAKE3 digest of the emitted text, so re-running
//! an identical assembly collides onto the same name instead of piling up
//! copies.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Civil UTC date-time split out of a Unix timestamp.
struct Civil {
    year: i64,
    month: usize,
    day: i64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

fn civil_from_unix(secs: u64) -> Civil {
    let days = secs / 86400;
    let time_secs = secs % 86400;

    // Days since epoch to Y-M-D (simplified Gregorian)
    let mut year = 1970i64;
    let mut remaining = days as i64;
    loop {
        let year_days = if is_leap(year) { 366 } else { 365 };
        if remaining < year_days {
            break;
        }
        remaining -= year_days;
        year += 1;
    }
    let leap = is_leap(year);
    let month_days = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 0;
    for (i, &md) in month_days.iter().enumerate() {
        if remaining < md as i64 {
            month = i + 1;
            break;
        }
        remaining -= md as i64;
    }

    Civil {
        year,
        month,
        day: remaining + 1,
        hours: time_secs / 3600,
        minutes: (time_secs % 3600) / 60,
        seconds: time_secs % 60,
    }
}

fn is_leap(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate an ISO 8601 timestamp.
pub fn now_iso8601() -> String {
    let c = civil_from_unix(unix_now());
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        c.year, c.month, c.day, c.hours, c.minutes, c.seconds
    )
}

/// Generate a filename-safe compact timestamp (yyyymmdd_hhmmss).
pub fn now_compact() -> String {
    let c = civil_from_unix(unix_now());
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        c.year, c.month, c.day, c.hours, c.minutes, c.seconds
    )
}

/// Short content hash of the emitted text.
pub fn content_hash(source: &str) -> String {
    blake3::hash(source.as_bytes()).to_hex()[..8].to_string()
}

/// Derive the artifact path for an emitted program.
pub fn artifact_path(out_dir: &Path, problem: &str, timestamp: &str, source: &str) -> PathBuf {
    let stem: String = problem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    out_dir.join(format!(
        "{}_{}_{}.py",
        stem,
        timestamp,
        content_hash(source)
    ))
}

/// Write the emitted program atomically (temp file + rename) and return
/// its path.
pub fn write_artifact(
    out_dir: &Path,
    problem: &str,
    timestamp: &str,
    source: &str,
) -> Result<PathBuf, String> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("cannot create dir {}: {}", out_dir.display(), e))?;
    let path = artifact_path(out_dir, problem, timestamp, source);

    let tmp_path = path.with_extension("py.tmp");
    std::fs::write(&tmp_path, source)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, &path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;

    Ok(path)
}
