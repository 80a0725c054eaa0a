//! Whole-store persistence
//!
//! The store is written as a single pretty-printed JSON document. Saving
//! replaces the file wholesale and loading replaces the in-memory state
//! wholesale; nothing is ever appended incrementally.
//!
//! ## Locking
//!
//! Reads take a shared lock and writes an exclusive lock on the store file, so
//! two processes never observe a half-written store.

use crate::areas::store::Store;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::Path;

/// Default location of the store file, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = ".folio/store.json";

#[derive(Debug, Clone, new)]
pub struct StoreFile {
    path: Box<Path>,
}

impl StoreFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the store, or start a fresh one when the file does not exist yet
    pub fn load(&self) -> anyhow::Result<Store> {
        if !self.exists() {
            tracing::debug!(path = ?self.path, "no store file, starting fresh");
            return Ok(Store::init()?);
        }

        let mut store_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("failed to open store file at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut store_file, Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut().read_to_string(&mut content)?;

        let store = serde_json::from_str(&content)
            .with_context(|| format!("corrupt store file at {:?}", self.path))?;
        tracing::debug!(path = ?self.path, bytes = content.len(), "loaded store");

        Ok(store)
    }

    pub fn save(&self, store: &Store) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directories for {:?}", self.path)
            })?;
        }

        let content = serde_json::to_string_pretty(store)?;

        let mut store_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("failed to open store file at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut store_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;

        tracing::debug!(path = ?self.path, bytes = content.len(), "saved store");
        Ok(())
    }
}
