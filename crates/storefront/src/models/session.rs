//! Session-related types.
//!
//! Everything client-side in the reference UI - the signed-in user, the
//! cart, the wishlist - lives in the server-side session here. All of it is
//! ephemeral: the in-memory store drops it on restart, the same way the
//! reference lost it on reload.

use serde::{Deserialize, Serialize};

use trizen_core::{Email, UserId};

/// Session-stored user identity.
///
/// The access token is the `GoTrue` bearer token; user-scoped data queries
/// send it so row level security applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub access_token: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart (`trizen_core::CartStore`).
    pub const CART: &str = "cart";

    /// Key for the wishlist (set of product IDs).
    pub const WISHLIST: &str = "wishlist";
}
