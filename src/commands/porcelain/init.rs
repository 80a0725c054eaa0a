use crate::areas::repository::Repository;
use anyhow::Context;

impl Repository {
    /// Write the store file if it does not exist yet
    ///
    /// Returns `false` when the store file was already there; its content is
    /// left untouched in that case.
    pub async fn init(&self) -> anyhow::Result<bool> {
        let store_file = self
            .store_file()
            .context("an in-memory repository has no store file to initialize")?;

        if store_file.exists() {
            tracing::debug!(path = ?store_file.path(), "store already initialized");
            return Ok(false);
        }

        self.persist()
            .await
            .with_context(|| format!("failed to initialize store at {:?}", store_file.path()))?;
        tracing::info!(path = ?store_file.path(), "initialized store");

        Ok(true)
    }
}
