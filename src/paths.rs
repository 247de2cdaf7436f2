use std::path::{Path, PathBuf};

use crate::cache::{CachePaths, PathResolver};

/// Maps asset names to a source file and a sidecar cache file.
///
/// A bare file name is looked up in `source_dir`; anything with a directory
/// component is used as given, so `./wall.obj` resolves against the process
/// working directory, not `source_dir`.
///
/// The cache file is named after the source's full file stem plus the cache
/// extension. `wall.obj` and `wall.dae` share `wall.ngl`, while `wall.v2.obj`
/// gets `wall.v2.ngl`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SidecarResolver {
    pub source_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub extension: String,
}

impl SidecarResolver {
    pub fn new(source_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            cache_dir: cache_dir.into(),
            extension: crate::FILE_EXTENSION.to_owned(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    fn original_path(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() || path.components().count() > 1 {
            path.to_path_buf()
        } else {
            self.source_dir.join(path)
        }
    }
}

impl PathResolver for SidecarResolver {
    fn resolve(&self, name: &str) -> CachePaths {
        let original = self.original_path(name);
        let mut file_name = original
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| name.into());
        file_name.push(".");
        file_name.push(&self.extension);
        CachePaths {
            cache: self.cache_dir.join(file_name),
            original,
        }
    }
}
