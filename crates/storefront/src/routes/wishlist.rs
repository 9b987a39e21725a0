//! Wishlist route handlers.
//!
//! The wishlist is a session-held set of product IDs with toggle semantics.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use trizen_core::ProductId;

use crate::filters;
use crate::models::session_keys;
use crate::routes::products::{ProductCardView, get_wishlist};
use crate::state::AppState;

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub products: Vec<ProductCardView>,
}

/// Wishlist heart button fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: String,
    pub in_wishlist: bool,
}

/// Toggle a product in the wishlist (HTMX).
#[instrument(skip(session))]
pub async fn toggle(session: Session, Form(form): Form<ToggleForm>) -> Response {
    let product_id = ProductId::new(form.product_id.clone());

    let mut wishlist = get_wishlist(&session).await;
    let in_wishlist = if wishlist.remove(&product_id) {
        false
    } else {
        wishlist.insert(product_id.clone());
        true
    };

    if let Err(e) = session
        .insert(session_keys::WISHLIST, &wishlist)
        .await
    {
        tracing::error!("Failed to save wishlist to session: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    WishlistButtonTemplate {
        product_id: form.product_id,
        in_wishlist,
    }
    .into_response()
}

/// Display the wishlist page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let wishlist: BTreeSet<ProductId> = get_wishlist(&session).await;

    let products = if wishlist.is_empty() {
        Vec::new()
    } else {
        state.supabase().get_products().await.map_or_else(
            |e| {
                tracing::error!("Failed to fetch products for wishlist: {e}");
                Vec::new()
            },
            |products| {
                products
                    .iter()
                    .filter(|p| wishlist.contains(&p.id))
                    .map(ProductCardView::from)
                    .collect()
            },
        )
    };

    WishlistTemplate { products }
}
