//! Decides whether a cache file can stand in for its source, and keeps
//! cache files up to date.
//!
//! A cache file is usable when it exists and was modified no earlier than
//! the source it was made from. Anything that prevents a cache file from
//! being decoded is a miss; the caller parses the source instead.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::HashMap;
use crate::mesh::ParsedMesh;
use crate::read::{ReadError, ReaderSettings, decode_with_settings};
use crate::write::{WriteError, encode};

/// Source file and cache file belonging to one asset name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePaths {
    pub original: PathBuf,
    pub cache: PathBuf,
}

pub trait PathResolver {
    fn resolve(&self, name: &str) -> CachePaths;
}

impl<T: PathResolver + ?Sized> PathResolver for &T {
    fn resolve(&self, name: &str) -> CachePaths {
        (**self).resolve(name)
    }
}

/// Parser for the source format, used whenever no usable cache exists.
pub trait MeshParser {
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    fn parse(&self, path: &Path) -> Result<ParsedMesh, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// No cache file, or no source to compare it with.
    Missing,
    /// The source was modified after the cache file was written.
    Stale,
    Valid,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheSettings {
    /// Only accept cache files strictly newer than their source.
    ///
    /// By default equal modification times count as fresh.
    pub require_newer: bool,
    pub reader: ReaderSettings,
}

#[derive(Debug)]
pub enum CacheLookup {
    Hit(ParsedMesh),
    Miss(CacheMiss),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheMiss {
    #[error("No cache file")]
    Missing,
    #[error("Cache file is older than its source")]
    Stale,
    #[error("Cannot read cache file: {0}")]
    Unreadable(std::io::Error),
    #[error("Cache file rejected: {0}")]
    Rejected(ReadError),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot encode mesh: {0}")]
    Encode(#[from] WriteError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    pub mesh: ParsedMesh,
    /// Whether the mesh was decoded from the cache file.
    pub from_cache: bool,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_mesh(self) -> Option<ParsedMesh> {
        match self {
            Self::Hit(mesh) => Some(mesh),
            Self::Miss(_) => None,
        }
    }
}

/// Serializes work on the same name; different names do not contend.
#[derive(Debug, Default)]
pub struct NameLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NameLocks {
    pub fn with_lock<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let lock = self.locks.lock().entry(name.to_owned()).or_default().clone();
        let r = {
            let _guard = lock.lock();
            f()
        };
        let mut locks = self.locks.lock();
        // one reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(name);
        }
        r
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct CachePolicy<R> {
    resolver: R,
    settings: CacheSettings,
    locks: NameLocks,
}

impl<R: PathResolver> CachePolicy<R> {
    pub fn new(resolver: R) -> Self {
        Self::new_with_settings(Default::default(), resolver)
    }

    pub fn new_with_settings(settings: CacheSettings, resolver: R) -> Self {
        Self {
            resolver,
            settings,
            locks: NameLocks::default(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn paths(&self, name: &str) -> CachePaths {
        self.resolver.resolve(name)
    }

    pub fn state(&self, name: &str) -> CacheState {
        self.state_of(&self.paths(name))
    }

    pub fn has_cache(&self, name: &str) -> bool {
        self.state(name) == CacheState::Valid
    }

    /// Decodes the cache file for `name` if it is fresh.
    #[tracing::instrument(skip(self))]
    pub fn decode_cache(&self, name: &str) -> CacheLookup {
        self.lookup(&self.paths(name))
    }

    /// Encodes `mesh` and atomically replaces the cache file for `name`.
    #[tracing::instrument(skip(self, mesh))]
    pub fn encode_cache(&self, mesh: &ParsedMesh, name: &str) -> Result<PathBuf, CacheError> {
        let paths = self.paths(name);
        self.store(&paths, mesh)?;
        Ok(paths.cache)
    }

    /// Loads a mesh from its cache file, or parses the source and refreshes
    /// the cache.
    ///
    /// Calls for the same name are serialized. Failing to write the cache
    /// does not fail the load.
    #[tracing::instrument(skip(self, parser))]
    pub fn load<P: MeshParser + ?Sized>(
        &self,
        name: &str,
        parser: &P,
    ) -> Result<LoadedMesh, LoadError> {
        self.locks.with_lock(name, || {
            let paths = self.paths(name);
            match self.lookup(&paths) {
                CacheLookup::Hit(mesh) => {
                    return Ok(LoadedMesh {
                        mesh,
                        from_cache: true,
                    });
                }
                CacheLookup::Miss(reason) => {
                    tracing::debug!(%reason, "Parsing source file");
                }
            }
            let mesh = parser
                .parse(&paths.original)
                .map_err(|e| LoadError::Parse {
                    path: paths.original.clone(),
                    source: e.into(),
                })?;
            if let Err(e) = self.store(&paths, &mesh) {
                tracing::warn!(
                    cache = %paths.cache.display(),
                    "Cannot write mesh cache: {e}"
                );
            }
            Ok(LoadedMesh {
                mesh,
                from_cache: false,
            })
        })
    }

    fn state_of(&self, paths: &CachePaths) -> CacheState {
        let Some(original) = modified(&paths.original) else {
            return CacheState::Missing;
        };
        let Some(cache) = modified(&paths.cache) else {
            return CacheState::Missing;
        };
        let fresh = if self.settings.require_newer {
            cache > original
        } else {
            cache >= original
        };
        if fresh {
            CacheState::Valid
        } else {
            CacheState::Stale
        }
    }

    fn lookup(&self, paths: &CachePaths) -> CacheLookup {
        match self.state_of(paths) {
            CacheState::Missing => return CacheLookup::Miss(CacheMiss::Missing),
            CacheState::Stale => return CacheLookup::Miss(CacheMiss::Stale),
            CacheState::Valid => {}
        }
        let bytes = match std::fs::read(&paths.cache) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(cache = %paths.cache.display(), "Cannot read mesh cache: {e}");
                return CacheLookup::Miss(CacheMiss::Unreadable(e));
            }
        };
        match decode_with_settings(self.settings.reader, &bytes) {
            Ok(mesh) => {
                tracing::debug!(
                    cache = %paths.cache.display(),
                    len = bytes.len(),
                    "Mesh cache hit"
                );
                CacheLookup::Hit(mesh)
            }
            Err(e @ ReadError::UnsupportedVersion(_)) => {
                tracing::debug!(cache = %paths.cache.display(), "Ignoring mesh cache: {e}");
                CacheLookup::Miss(CacheMiss::Rejected(e))
            }
            Err(e) => {
                tracing::warn!(cache = %paths.cache.display(), "Corrupt mesh cache: {e}");
                CacheLookup::Miss(CacheMiss::Rejected(e))
            }
        }
    }

    fn store(&self, paths: &CachePaths, mesh: &ParsedMesh) -> Result<(), CacheError> {
        let bytes = encode(mesh)?;
        let dir = match paths.cache.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&paths.cache).map_err(|e| e.error)?;
        tracing::debug!(
            cache = %paths.cache.display(),
            len = bytes.len(),
            "Wrote mesh cache"
        );
        Ok(())
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot query modification time: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use super::*;
    use crate::paths::SidecarResolver;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn setup() -> (tempfile::TempDir, CachePolicy<SidecarResolver>) {
        let dir = tempfile::tempdir().unwrap();
        let resolver = SidecarResolver::new(dir.path().join("src"), dir.path().join("cache"));
        std::fs::create_dir_all(&resolver.source_dir).unwrap();
        std::fs::write(resolver.source_dir.join("box.obj"), b"v 0 0 0").unwrap();
        (dir, CachePolicy::new(resolver))
    }

    #[test]
    fn missing_until_written() {
        let (_dir, policy) = setup();
        assert_eq!(policy.state("box.obj"), CacheState::Missing);
        assert!(!policy.has_cache("box.obj"));
        assert!(matches!(
            policy.decode_cache("box.obj"),
            CacheLookup::Miss(CacheMiss::Missing)
        ));

        let path = policy.encode_cache(&ParsedMesh::default(), "box.obj").unwrap();
        assert!(path.ends_with("cache/box.ngl"));
        assert!(policy.has_cache("box.obj"));
        assert_eq!(
            policy.decode_cache("box.obj").into_mesh(),
            Some(ParsedMesh::default())
        );
    }

    #[test]
    fn missing_original_means_missing_cache() {
        let (_dir, policy) = setup();
        policy.encode_cache(&ParsedMesh::default(), "gone.obj").unwrap();
        assert_eq!(policy.state("gone.obj"), CacheState::Missing);
    }

    #[test]
    fn equal_times_are_fresh_unless_strict() {
        let (_dir, policy) = setup();
        let paths = policy.encode_cache(&ParsedMesh::default(), "box.obj").unwrap();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        set_mtime(&policy.paths("box.obj").original, t);
        set_mtime(&paths, t);
        assert_eq!(policy.state("box.obj"), CacheState::Valid);

        let strict = CachePolicy::new_with_settings(
            CacheSettings {
                require_newer: true,
                ..Default::default()
            },
            policy.resolver(),
        );
        assert_eq!(strict.state("box.obj"), CacheState::Stale);

        set_mtime(&paths, t - Duration::from_millis(1));
        assert_eq!(policy.state("box.obj"), CacheState::Stale);
        assert!(matches!(
            policy.decode_cache("box.obj"),
            CacheLookup::Miss(CacheMiss::Stale)
        ));
    }

    #[test]
    fn name_locks_are_released() {
        let locks = NameLocks::default();
        let v = locks.with_lock("a", || {
            assert_eq!(locks.len(), 1);
            locks.with_lock("b", || 5)
        });
        assert_eq!(v, 5);
        assert!(locks.is_empty());
    }
}
