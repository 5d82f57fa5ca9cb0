use async_trait::async_trait;
use nb_core::{ArticleRepository, Error, Result, SubscriberRegistry};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleRepository + SubscriberRegistry {
    fn get_error_message() -> &'static str;
    async fn connect(url: Option<&str>) -> Result<Self> where Self: Sized;
}

/// Both stores, usually backed by the same connection.
#[derive(Clone)]
pub struct Storage {
    pub articles: Arc<dyn ArticleRepository>,
    pub subscribers: Arc<dyn SubscriberRegistry>,
}

impl Storage {
    pub fn from_backend<T: StorageBackend + 'static>(backend: T) -> Self {
        let backend = Arc::new(backend);
        Self {
            articles: backend.clone(),
            subscribers: backend,
        }
    }
}

async fn open<T: StorageBackend + 'static>(url: Option<&str>) -> Result<Storage> {
    let backend = T::connect(url).await.map_err(|e| {
        Error::Persistence(format!("{} ({})", T::get_error_message(), e))
    })?;
    Ok(Storage::from_backend(backend))
}

/// Opens the storage backend named by `kind` ("memory" or "sqlite").
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Storage> {
    let storage = match kind {
        "memory" => open::<InMemoryStorage>(url).await?,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(url).await?,
        other => {
            return Err(Error::Config(format!("Unsupported storage backend: {}", other)));
        }
    };
    info!("🏦 Storage backend initialized successfully (using {})", kind);
    Ok(storage)
}
