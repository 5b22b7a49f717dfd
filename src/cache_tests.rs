#[cfg(test)]
mod tests {
    use crate::cache::IncrementalCache;
    use crate::discovery::{discover_sources, output_path};
    use crate::validate::ErrorKind;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // ═══════════════════════════════════════════════════════════════════════════════
    // CACHE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_cache_hit_requires_matching_hash() {
        let dir = TempDir::new().unwrap();
        let cache = IncrementalCache::new(dir.path().join("cache")).unwrap();
        assert!(cache.cache_dir().is_dir());

        let hash = IncrementalCache::compute_hash("x = 1\n", "indent=4");
        cache.set("src/a.py", &hash, "var x = 1;\n");

        assert_eq!(cache.get("src/a.py", &hash).as_deref(), Some("var x = 1;\n"));
        let other = IncrementalCache::compute_hash("x = 1\n", "indent=2");
        assert_ne!(hash, other);
        assert_eq!(cache.get("src/a.py", &other), None);
        assert_eq!(cache.get("src/b.py", &hash), None);
    }

    #[test]
    fn test_corrupt_entry_is_discarded() {
        let dir = TempDir::new().unwrap();
        let cache = IncrementalCache::new(dir.path()).unwrap();
        let hash = IncrementalCache::compute_hash("x = 1\n", "");
        cache.set("a.py", &hash, "var x = 1;\n");

        let entry = dir.path().join("a.py.json");
        assert!(entry.exists());
        fs::write(&entry, "{not json").unwrap();

        assert_eq!(cache.get("a.py", &hash), None);
        assert!(!entry.exists());
    }

    #[test]
    fn test_hash_is_stable() {
        let a = IncrementalCache::compute_hash("source", "settings");
        let b = IncrementalCache::compute_hash("source", "settings");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        // Boundary between source and settings is part of the key.
        assert_ne!(
            IncrementalCache::compute_hash("ab", "c"),
            IncrementalCache::compute_hash("a", "bc")
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DISCOVERY
    // ═══════════════════════════════════════════════════════════════════════════════

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "pass\n").unwrap();
    }

    #[test]
    fn test_directories_are_scanned_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("b.py"));
        touch(&root.join("a.py"));
        touch(&root.join("nested/c.py"));
        touch(&root.join("notes.txt"));

        let found = discover_sources(&[root.to_path_buf()]).unwrap();
        let names: Vec<PathBuf> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.py"),
                PathBuf::from("b.py"),
                PathBuf::from("nested/c.py")
            ]
        );
    }

    #[test]
    fn test_explicit_files_keep_their_order() {
        let dir = TempDir::new().unwrap();
        let z = dir.path().join("z.py");
        let a = dir.path().join("a.txt");
        touch(&z);
        touch(&a);

        let found = discover_sources(&[z.clone(), a.clone()]).unwrap();
        assert_eq!(found, vec![z, a]);
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.py");
        let err = discover_sources(&[missing]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.file.ends_with("missing.py"));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("src/widget.py"), None),
            PathBuf::from("src/widget.js")
        );
        assert_eq!(
            output_path(Path::new("src/widget.py"), Some(Path::new("dist"))),
            PathBuf::from("dist/widget.js")
        );
    }
}
