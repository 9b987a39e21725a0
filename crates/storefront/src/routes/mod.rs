//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}          - Product detail
//! GET  /search                 - Search by term or category
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update            - Step quantity by delta (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Toggle a product (fragment)
//!
//! # Checkout & Orders (require auth)
//! GET  /checkout               - Checkout page
//! POST /checkout               - Place order
//! GET  /orders                 - Order history (optional status tab)
//! GET  /orders/confirmation    - Order confirmation
//! GET  /orders/{id}/tracking   - Order tracking timeline
//!
//! # Digital tools (require auth)
//! GET  /tools                  - Purchased tools with countdown
//! GET  /tools/{id}             - Tool access screen
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account/addresses      - Address list
//! GET  /account/addresses/new  - New address form
//! POST /account/addresses      - Create address
//! GET  /account/addresses/{id}/edit - Edit address form
//! POST /account/addresses/{id} - Update address
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod tools;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::history))
        .route("/confirmation", get(orders::confirmation))
        .route("/{id}/tracking", get(orders::tracking))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/new", get(account::new_address))
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/edit", get(account::edit_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/products/{id}", get(products::show))
        .route("/search", get(products::search))
        // Cart
        .nest("/cart", cart_routes())
        // Wishlist
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/toggle", post(wishlist::toggle))
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place))
        // Orders
        .nest("/orders", order_routes())
        // Digital tools
        .route("/tools", get(tools::index))
        .route("/tools/{id}", get(tools::show))
        // Auth
        .nest("/auth", auth_routes())
        // Account
        .nest("/account", account_routes())
}
