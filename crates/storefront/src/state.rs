//! Application state shared across handlers.

use std::sync::Arc;

use trizen_core::Price;

use crate::config::StorefrontConfig;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the Supabase client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, supabase }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Supabase client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Flat delivery charge added to every order.
    #[must_use]
    pub fn delivery_charge(&self) -> Price {
        self.inner.config.delivery_charge
    }
}
