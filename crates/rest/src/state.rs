//! Application state shared by all request handlers.

use std::sync::Arc;

use marquee_persistence::core::MovieStorage;

use crate::config::ServerConfig;

/// Shared application state for the API.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`MovieStorage`])
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use marquee_persistence::backends::memory::MemoryStorage;
/// use marquee_rest::{AppState, ServerConfig};
///
/// let state = AppState::new(Arc::new(MemoryStorage::new()), ServerConfig::default());
/// assert_eq!(state.default_page_size(), 20);
/// ```
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// S sits behind an Arc and need not be Clone.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: MovieStorage> AppState<S> {
    /// Creates a new AppState with the given storage and configuration.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Page size used when a listing omits `limit`.
    pub fn default_page_size(&self) -> u32 {
        self.config.default_page_size
    }

    /// Largest page size a listing may request.
    pub fn max_page_size(&self) -> u32 {
        self.config.max_page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_persistence::backends::memory::MemoryStorage;

    #[test]
    fn test_app_state_config_access() {
        let config = ServerConfig {
            default_page_size: 50,
            max_page_size: 500,
            ..Default::default()
        };
        let state = AppState::new(Arc::new(MemoryStorage::new()), config);

        assert_eq!(state.storage().backend_name(), "memory");
        assert_eq!(state.default_page_size(), 50);
        assert_eq!(state.max_page_size(), 500);
    }

    #[test]
    fn test_app_state_clone_shares_storage() {
        let state = AppState::new(Arc::new(MemoryStorage::new()), ServerConfig::default());
        let cloned = state.clone();

        assert!(std::ptr::eq(state.storage(), cloned.storage()));
    }
}
