use crate::areas::store::Store;
use crate::areas::store_file::StoreFile;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serialized entry point to the versioned state
///
/// Every operation locks the store once and keeps the lock until it has
/// finished mutating, so no other caller can observe or change state between
/// planning and applying. Operations take their branch context explicitly;
/// see [`Session`](crate::commands::session::Session) for the variant that
/// tracks a current branch.
#[derive(Debug, Clone)]
pub struct Repository {
    store_file: Option<StoreFile>,
    store: Arc<Mutex<Store>>,
}

impl Repository {
    /// A repository that lives only in memory
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Repository {
            store_file: None,
            store: Arc::new(Mutex::new(Store::init()?)),
        })
    }

    /// Open the store file at `path`, starting fresh when it does not exist
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let store_file = StoreFile::new(path.into());
        let store = store_file.load()?;

        Ok(Repository {
            store_file: Some(store_file),
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn store_file(&self) -> Option<&StoreFile> {
        self.store_file.as_ref()
    }

    pub fn store(&self) -> Arc<Mutex<Store>> {
        self.store.clone()
    }

    /// Write the current state back to the store file, if there is one
    pub async fn persist(&self) -> anyhow::Result<()> {
        if let Some(store_file) = &self.store_file {
            let store = self.store.lock().await;
            store_file.save(&store)?;
        }

        Ok(())
    }

    /// A deep copy of the current state
    pub async fn snapshot(&self) -> Store {
        self.store.lock().await.clone()
    }

    /// Replace the whole state
    pub async fn restore(&self, store: Store) {
        *self.store.lock().await = store;
    }
}
