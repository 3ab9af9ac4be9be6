//! Archive packaging: batch output files into one ZIP.
//!
//! Entries are copied into the archive one at a time from open file
//! handles, and the compressed stream goes straight to the destination
//! file, so peak memory tracks a single entry rather than the whole
//! batch (1000 certificates at ~300 KB each would otherwise be ~300 MB
//! of buffering).

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::LaurelError;

/// Deflate level 4: good speed/size tradeoff for already-compressed PNGs.
const COMPRESSION_LEVEL: i64 = 4;

/// Package the given files into `certificates_<timestamp>.zip` under
/// `dest_dir`, flattened to their file names, and return the archive
/// path once it is fully written and flushed.
///
/// Runs the blocking ZIP work on the blocking pool. Any read or write
/// failure propagates; there is no retry.
pub async fn package_to_archive(
    file_paths: &[PathBuf],
    dest_dir: &Path,
) -> Result<PathBuf, LaurelError> {
    tokio::fs::create_dir_all(dest_dir).await?;
    let archive_path = dest_dir.join(format!("certificates_{}.zip", Utc::now().timestamp_millis()));

    let paths = file_paths.to_vec();
    let out = archive_path.clone();
    tokio::task::spawn_blocking(move || write_archive(&paths, &out))
        .await
        .map_err(|e| LaurelError::Archive(format!("archive task failed: {e}")))??;

    Ok(archive_path)
}

fn write_archive(file_paths: &[PathBuf], archive_path: &Path) -> Result<(), LaurelError> {
    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for path in file_paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                LaurelError::Archive(format!("unusable file name: {}", path.display()))
            })?;
        writer
            .start_file(name, options)
            .map_err(|e| LaurelError::Archive(format!("failed to add {name}: {e}")))?;
        // One entry in flight at a time; io::copy streams in 8 KB reads.
        let mut entry = File::open(path)?;
        io::copy(&mut entry, &mut writer)?;
    }

    let mut inner = writer
        .finish()
        .map_err(|e| LaurelError::Archive(format!("failed to finish archive: {e}")))?;
    io::Write::flush(&mut inner)?;
    Ok(())
}

/// Remove the loose per-row files (and their batch directory) after the
/// archive is written. Best-effort: the archive is authoritative, so
/// failures here are swallowed.
pub async fn cleanup_batch(file_paths: &[PathBuf]) {
    for path in file_paths {
        let _ = tokio::fs::remove_file(path).await;
    }
    if let Some(batch_dir) = file_paths.first().and_then(|p| p.parent()) {
        let _ = tokio::fs::remove_dir(batch_dir).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    async fn write_sample_files(dir: &Path, count: usize) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for i in 0..count {
            let path = dir.join(format!("cert_{i}.png"));
            tokio::fs::write(&path, format!("payload {i}").repeat(50))
                .await
                .unwrap();
            paths.push(path);
        }
        paths
    }

    #[tokio::test]
    async fn test_archive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_files(dir.path(), 3).await;

        let archive_path = package_to_archive(&paths, dir.path()).await.unwrap();
        assert!(archive_path.is_file());

        let file = File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 3);
        let mut entry = archive.by_name("cert_1.png").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert!(contents.starts_with("payload 1"));
    }

    #[tokio::test]
    async fn test_archive_entries_are_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batch_123");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        let paths = write_sample_files(&nested, 2).await;

        let archive_path = package_to_archive(&paths, dir.path()).await.unwrap();
        let file = File::open(&archive_path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"cert_0.png"));
        assert!(names.iter().all(|n| !n.contains('/')));
    }

    #[tokio::test]
    async fn test_packages_a_thousand_entries() {
        // The streaming guarantee itself (one entry in flight) is
        // structural; this exercises it at batch scale and checks
        // nothing is dropped or reordered along the way.
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample_files(dir.path(), 1000).await;

        let archive_path = package_to_archive(&paths, dir.path()).await.unwrap();
        let file = File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1000);
        let mut entry = archive.by_name("cert_999.png").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert!(contents.starts_with("payload 999"));
    }

    #[tokio::test]
    async fn test_missing_input_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = vec![dir.path().join("nope.png")];
        assert!(package_to_archive(&missing, dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_removes_files_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batch_999");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        let paths = write_sample_files(&nested, 2).await;

        cleanup_batch(&paths).await;
        assert!(!paths[0].exists());
        assert!(!nested.exists());
    }
}
