//! The plugin contract a document-ingestion host drives.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::Result;

/// A document store the ingestion host can push files into.
///
/// The host first asks which credentials are needed, supplies them to
/// [`init`](RagPlugin::init), then calls the file operations in whatever
/// order it likes. Implementations hold no state beyond what `init` set.
///
/// # Example
///
/// ```rust,ignore
/// use adk_universe::{RagPlugin, UniverseConfig, UniverseStore};
///
/// let mut store = UniverseStore::new(config)?;
/// let wanted = store.required_credentials(None)?;
/// store.init(&credentials_from_host(&wanted), None).await?;
/// store.add_file("doc1", "hello world").await?;
/// store.finalize().await?;
/// ```
#[async_trait]
pub trait RagPlugin: Send + Sync {
    /// Plugin-specific configuration passed by the host.
    type Config: Send + Sync;

    /// Map of credential name to an operator-facing description.
    ///
    /// `config` is used when the plugin was constructed without one.
    fn required_credentials(
        &self,
        config: Option<&Self::Config>,
    ) -> Result<BTreeMap<String, String>>;

    /// Validate configuration and take the credentials. Calling again replaces
    /// the previous state.
    async fn init(
        &mut self,
        credentials: &HashMap<String, String>,
        config: Option<Self::Config>,
    ) -> Result<()>;

    /// Store `content` under `file_id`, overwriting any existing item.
    async fn add_file(&self, file_id: &str, content: &str) -> Result<()>;

    /// Replace the content stored under `file_id`.
    async fn update_file(&self, file_id: &str, content: &str) -> Result<()>;

    /// Remove the item stored under `file_id`.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Remove every item in the store.
    async fn delete_all_files(&self) -> Result<()>;

    /// Called once the host has issued all operations for a run.
    async fn finalize(&self) -> Result<()>;
}
