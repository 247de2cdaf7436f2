pub mod checksum;
pub mod descriptor;
pub mod stream;
pub mod version;

pub mod read;
pub mod write;

pub mod mesh;

pub mod cache;
pub mod paths;

pub use version::FORMAT_VERSION;

/// File extension used for cache files.
pub const FILE_EXTENSION: &str = "ngl";

pub type HashMap<K, V> = rapidhash::RapidHashMap<K, V>;
