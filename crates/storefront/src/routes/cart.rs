//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session as a `trizen_core::CartStore`; the
//! merge/floor semantics are all in core, the handlers only glue forms to it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use trizen_core::{CartStore, LineKey, ProductId};

use crate::filters;
use crate::models::session_keys;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product.id.to_string(),
                    name: line.product.name.clone(),
                    image_url: line.product.image_url.clone(),
                    quantity: line.quantity,
                    size: line.size.clone(),
                    color: line.color.clone(),
                    price: line.product.price.to_string(),
                    line_total: line.line_total().to_string(),
                })
                .collect(),
            subtotal: cart.subtotal().to_string(),
            item_count: cart.total_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the cart from the session, defaulting to empty.
pub(crate) async fn get_cart(session: &Session) -> CartStore {
    session
        .get::<CartStore>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(
    session: &Session,
    cart: &CartStore,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Cart line form data (update/remove address a line by its key).
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: String,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Quantity step, `1` or `-1` from the +/- buttons.
    pub delta: Option<i64>,
}

impl CartLineForm {
    fn key(&self) -> LineKey {
        LineKey {
            product_id: ProductId::new(self.product_id.clone()),
            size: self.size.clone().filter(|s| !s.is_empty()),
            color: self.color.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = get_cart(&session).await;
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add item to cart (HTMX).
///
/// Fetches the product to capture its snapshot, merges into the cart, and
/// returns the count badge with a trigger for the other cart fragments.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id.clone());

    let product = match state.supabase().get_product(&product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to fetch product for cart add: {e}");
            return (
                StatusCode::BAD_GATEWAY,
                Html("<span class=\"cart-error\">পণ্যটি যোগ করা যায়নি</span>"),
            )
                .into_response();
        }
    };

    let mut cart = get_cart(&session).await;
    cart.add_item(
        product.snapshot(),
        form.quantity.unwrap_or(1),
        form.size.filter(|s| !s.is_empty()),
        form.color.filter(|s| !s.is_empty()),
    );

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.total_count(),
        },
    )
        .into_response()
}

/// Step a line's quantity by the form delta (HTMX).
///
/// The floor-at-one rule lives in `CartStore::update_quantity`; stepping an
/// absent line is a no-op.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<CartLineForm>) -> Response {
    let mut cart = get_cart(&session).await;
    cart.update_quantity(&form.key(), form.delta.unwrap_or(0));

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartLineForm>) -> Response {
    let mut cart = get_cart(&session).await;
    cart.remove_item(&form.key());

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    let mut cart = get_cart(&session).await;
    cart.clear();

    if let Err(e) = save_cart(&session, &cart).await {
        tracing::error!("Failed to save cart to session: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = get_cart(&session).await;
    CartCountTemplate {
        count: cart.total_count(),
    }
}
