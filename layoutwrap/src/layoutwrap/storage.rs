use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

/// Where layout templates live. Locations are opaque strings to the cache.
pub trait Storage: Send + Sync {
    /// Current modification time of `location`.
    fn modified(&self, location: &str) -> io::Result<SystemTime>;

    /// Full contents of `location`.
    fn read_all(&self, location: &str) -> io::Result<Vec<u8>>;
}

/// Filesystem storage; locations are paths.
///
/// Times come straight from file metadata, so resolution is whatever the
/// filesystem records: nanoseconds on ext4, btrfs, xfs and APFS, but two
/// seconds on FAT. Edits landing inside one tick of a coarse filesystem
/// are not distinguishable.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn modified(&self, location: &str) -> io::Result<SystemTime> {
        fs::metadata(location)?.modified()
    }

    fn read_all(&self, location: &str) -> io::Result<Vec<u8>> {
        fs::read(location)
    }
}

/// In-process storage with caller-controlled modification times.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, (SystemTime, Vec<u8>)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `contents` stamped with the current time.
    pub fn put(&self, location: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.put_at(location, contents, SystemTime::now());
    }

    pub fn put_at(
        &self,
        location: impl Into<String>,
        contents: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.into(), (modified, contents.into()));
    }

    pub fn remove(&self, location: &str) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(location)
            .is_some()
    }
}

fn not_found(location: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{location} not found"))
}

impl Storage for MemoryStorage {
    fn modified(&self, location: &str) -> io::Result<SystemTime> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .map(|(modified, _)| *modified)
            .ok_or_else(|| not_found(location))
    }

    fn read_all(&self, location: &str) -> io::Result<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| not_found(location))
    }
}
