use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub hash: String,
    pub output: String,
}

/// Compiled output keyed by a hash of everything that decides it.
pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Hash of the source together with the settings it is compiled under
    /// (context, mode, indentation).
    pub fn compute_hash(source: &str, settings: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(settings.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, file_path: &str) -> PathBuf {
        let safe_name = file_path
            .replace('/', "_")
            .replace('\\', "_")
            .replace(':', "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn get(&self, file_path: &str, hash: &str) -> Option<String> {
        let cache_path = self.get_cache_path(file_path);
        let data = fs::read_to_string(&cache_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(e) => e,
            Err(e) => {
                warn!(file = file_path, error = %e, "discarding corrupt cache entry");
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        (entry.hash == hash).then_some(entry.output)
    }

    pub fn set(&self, file_path: &str, hash: &str, output: &str) {
        let cache_path = self.get_cache_path(file_path);
        let entry = CacheEntry {
            hash: hash.to_string(),
            output: output.to_string(),
        };

        match serde_json::to_string(&entry) {
            Ok(data) => {
                if let Err(e) = fs::write(&cache_path, data) {
                    warn!(file = file_path, error = %e, "failed to write cache entry");
                }
            }
            Err(e) => warn!(file = file_path, error = %e, "failed to encode cache entry"),
        }
    }
}
