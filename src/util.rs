use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    utc_string(Utc::now())
}

pub fn utc_string(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn backup_stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d_%H%M%S").to_string()
}

pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sha256_hex_is_lowercase_64_chars() {
        let digest = sha256_hex("California|Anaheim|Disneyland|Castle|h");
        assert_eq!(digest.len(), 64);
        assert!(!digest.chars().any(|c| c.is_ascii_uppercase()));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn backup_stamp_uses_compact_date_and_time() {
        let ts = Utc
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("valid timestamp");
        assert_eq!(backup_stamp(ts), "20240309_070501");
        assert_eq!(utc_string(ts), "2024-03-09T07:05:01Z");
    }

    #[test]
    fn ensure_parent_directory_creates_missing_parents() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("a").join("b").join("out.csv");
        ensure_parent_directory(&path).expect("parents should be created");
        assert!(dir.path().join("a").join("b").is_dir());
        ensure_parent_directory(Path::new("out.csv")).expect("bare file name is fine");
    }
}
