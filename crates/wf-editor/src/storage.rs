//! Host persistence seams.
//!
//! The session never touches browser APIs directly. Saving goes through a
//! `KeyValueStore` (browser `localStorage` in the WASM bridge) and exporting
//! through a `FileSink` (a client-side download). The in-memory versions
//! here back native use and tests.

use std::collections::HashMap;
use wf_core::Result;

/// A scoped string key-value store.
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Destination for exported documents.
pub trait FileSink {
    /// Offer `contents` to the user as a file named `file_name`.
    fn download(&mut self, file_name: &str, contents: &str) -> Result<()>;
}

/// `HashMap`-backed store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Collects downloads instead of saving them anywhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// `(file_name, contents)` in download order.
    pub files: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&(String, String)> {
        self.files.last()
    }
}

impl FileSink for MemorySink {
    fn download(&mut self, file_name: &str, contents: &str) -> Result<()> {
        self.files.push((file_name.to_string(), contents.to_string()));
        Ok(())
    }
}
