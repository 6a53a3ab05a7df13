use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::SourceConfig;
use crate::error::{ReportError, Result};

/// A cached source artifact on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    pub path: PathBuf,
    pub url: String,
    /// Hex-encoded SHA-256 of the cached bytes
    pub sha256: String,
    pub bytes: u64,
    /// False when the artifact was already present in the cache
    pub downloaded: bool,
}

/// Ensure the artifact named by `source` is in the cache, downloading it when
/// missing or when `refresh` is set.
#[instrument(skip(source), fields(url = %source.url))]
pub fn ensure_source(source: &SourceConfig, refresh: bool) -> Result<SourceArtifact> {
    let path = source.cache_dir.join(&source.file_name);

    let downloaded = if refresh || !path.exists() {
        download(&source.url, &path, Duration::from_secs(source.timeout_seconds))?;
        true
    } else {
        info!(path = %path.display(), "Using cached source artifact");
        false
    };

    let (sha256, bytes) = digest_file(&path)?;
    info!(path = %path.display(), sha256 = %sha256, bytes, downloaded, "Source artifact ready");

    Ok(SourceArtifact {
        path,
        url: source.url.clone(),
        sha256,
        bytes,
        downloaded,
    })
}

/// Download `url` to `dest`. The body is written to a sibling `.part` file and
/// renamed into place only after the transfer completes.
pub fn download(url: &str, dest: &Path, timeout: Duration) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    info!(url, dest = %dest.display(), "Downloading source artifact");
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("storm_report/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ReportError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    let partial = partial_path(dest);
    let written = {
        let mut file = File::create(&partial)?;
        match response.copy_to(&mut file) {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e.into());
            }
        }
    };
    fs::rename(&partial, dest)?;

    info!(bytes = written, "Download complete");
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// SHA-256 of the file at `path` plus its length in bytes.
pub fn digest_file(path: &Path) -> Result<(String, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        total += read as u64;
    }

    Ok((hex::encode(hasher.finalize()), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_file_matches_known_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();

        let (hex, bytes) = digest_file(&path).unwrap();
        assert_eq!(bytes, 3);
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_cached_artifact_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceConfig {
            // Unroutable on purpose; the cache hit means it is never contacted
            url: "http://127.0.0.1:9/StormData.csv".to_string(),
            cache_dir: dir.path().to_path_buf(),
            file_name: "StormData.csv".to_string(),
            timeout_seconds: 1,
        };
        fs::write(dir.path().join("StormData.csv"), b"BGN_DATE\n").unwrap();

        let artifact = ensure_source(&source, false).unwrap();
        assert!(!artifact.downloaded);
        assert_eq!(artifact.bytes, 9);
        assert_eq!(artifact.path, dir.path().join("StormData.csv"));
    }

    #[test]
    fn test_failed_download_leaves_no_cache_entry() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceConfig {
            url: "http://127.0.0.1:9/StormData.csv".to_string(),
            cache_dir: dir.path().to_path_buf(),
            file_name: "StormData.csv".to_string(),
            timeout_seconds: 1,
        };

        assert!(ensure_source(&source, false).is_err());
        assert!(!dir.path().join("StormData.csv").exists());
        assert!(!dir.path().join("StormData.csv.part").exists());
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("data/StormData.csv.bz2")),
            PathBuf::from("data/StormData.csv.bz2.part")
        );
    }
}
