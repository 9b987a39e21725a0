//! Supabase API client.
//!
//! # Architecture
//!
//! - `PostgREST` (`/rest/v1`) for catalog and order data - plain REST+JSON
//! - `GoTrue` (`/auth/v1`) for email/password authentication
//! - Supabase is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL)
//!
//! User-scoped queries (orders, addresses, owned tools) send the signed-in
//! user's access token as the bearer so row level security applies; public
//! catalog reads use the anon key for both headers.

mod auth;
mod cache;
mod rest;
pub mod types;

pub use rest::SupabaseClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed (bad credentials, rejected signup).
    #[error("Auth error: {0}")]
    Auth(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SupabaseError::NotFound("product p1".to_string());
        assert_eq!(err.to_string(), "Not found: product p1");

        let err = SupabaseError::Api {
            status: 409,
            message: "duplicate key value".to_string(),
        };
        assert_eq!(err.to_string(), "API error (409): duplicate key value");
    }
}
