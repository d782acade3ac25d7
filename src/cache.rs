//! Incremental output cache for the CLI.
//!
//! Entries are keyed by file path and validated by a digest of the source,
//! the compile options and the flag layout, so any change to one of them
//! recompiles the file.

use log::warn;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::flags::FLAGS_LAYOUT_VERSION;
use crate::options::CompileOptions;
use crate::transform::TransformOutput;

pub const DEFAULT_CACHE_DIR: &str = ".vnodec/cache";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub code: String,
    /// JSX literals compiled into `code`.
    #[serde(default)]
    pub sites: usize,
    #[serde(default)]
    pub blueprints: usize,
}

pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).ok();
        }
        Self { cache_dir }
    }

    pub fn compute_hash(source: &str, options: &CompileOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        hasher.update(FLAGS_LAYOUT_VERSION.to_le_bytes());
        hasher.update(serde_json::to_string(options).unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, file_path: &str) -> PathBuf {
        let safe_name = file_path
            .replace("/", "_")
            .replace("\\", "_")
            .replace(":", "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, file_path: &str, source: &str, options: &CompileOptions) -> Option<CacheEntry> {
        let cache_path = self.get_cache_path(file_path);
        let data = fs::read_to_string(&cache_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(e) => e,
            Err(e) => {
                warn!("cache entry for {} is corrupt: {}", file_path, e);
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(source, options) {
            Some(entry)
        } else {
            None
        }
    }

    pub fn set(
        &self,
        file_path: &str,
        source: &str,
        options: &CompileOptions,
        output: &TransformOutput,
    ) {
        let cache_path = self.get_cache_path(file_path);
        let entry = CacheEntry {
            hash: Self::compute_hash(source, options),
            code: output.code.clone(),
            sites: output.sites,
            blueprints: output.blueprints.len(),
        };

        if let Ok(data) = serde_json::to_string(&entry) {
            if let Err(e) = fs::write(&cache_path, data) {
                warn!("could not write cache entry {}: {}", cache_path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: &str, sites: usize) -> TransformOutput {
        TransformOutput {
            code: code.to_string(),
            sites,
            blueprints: vec![],
            helpers: vec![],
        }
    }

    #[test]
    fn test_roundtrip_and_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::new(dir.path());
        let options = CompileOptions::default();

        assert!(cache.get("src/app.jsx", "<a/>", &options).is_none());
        cache.set("src/app.jsx", "<a/>", &options, &output("createVNode(1, \"a\")", 1));
        let entry = cache.get("src/app.jsx", "<a/>", &options).unwrap();
        assert_eq!(entry.code, "createVNode(1, \"a\")");
        assert_eq!((entry.sites, entry.blueprints), (1, 0));

        assert!(cache.get("src/app.jsx", "<b/>", &options).is_none());
        let other = CompileOptions {
            define_all_arguments: true,
            ..Default::default()
        };
        assert!(cache.get("src/app.jsx", "<a/>", &other).is_none());
    }

    #[test]
    fn test_hit_reports_compiled_counts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::new(dir.path());
        let options = CompileOptions {
            optimize_static_vnodes: true,
            ..Default::default()
        };
        let source = "function f() { return <p>hi</p>; }\nfunction g() { return <p>hi</p>; }";
        let compiled = crate::transform::transform_source(source, "two.jsx", &options).unwrap();
        cache.set("two.jsx", source, &options, &compiled);

        let entry = cache.get("two.jsx", source, &options).unwrap();
        assert_eq!(entry.sites, 2);
        assert_eq!(entry.blueprints, 1);
        assert_eq!(entry.code, compiled.code);
    }

    #[test]
    fn test_entries_without_counts_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::new(dir.path());
        let options = CompileOptions::default();
        let entry = serde_json::json!({
            "hash": IncrementalCache::compute_hash("<a/>", &options),
            "code": "x",
        });
        fs::write(cache.get_cache_path("old.jsx"), entry.to_string()).unwrap();
        let loaded = cache.get("old.jsx", "<a/>", &options).unwrap();
        assert_eq!((loaded.code.as_str(), loaded.sites), ("x", 0));
    }

    #[test]
    fn test_corrupt_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::new(dir.path());
        let path = cache.get_cache_path("x.jsx");
        fs::write(&path, "not json").unwrap();
        assert!(cache.get("x.jsx", "", &CompileOptions::default()).is_none());
        assert!(!path.exists());
    }
}
