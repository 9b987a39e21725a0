//! Product catalog route handlers.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use trizen_core::{CategoryId, ProductId};

use crate::filters;
use crate::models::session_keys;
use crate::supabase::types::Product;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_label: Option<String>,
    pub image_url: String,
    pub rating: String,
    pub review_count: i64,
    pub in_stock: bool,
    pub is_digital_tool: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            original_price: product.original_price.map(|p| p.to_string()),
            discount_label: product.discount_label.clone(),
            image_url: product.image_url.clone(),
            rating: format!("{:.1}", product.rating),
            review_count: product.review_count,
            in_stock: product.is_in_stock,
            is_digital_tool: product.is_digital_tool,
        }
    }
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub validity_days: u32,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            features: product.features.clone().unwrap_or_default(),
            sizes: product.sizes.clone().unwrap_or_default(),
            colors: product.colors.clone().unwrap_or_default(),
            validity_days: product.validity_days(),
        }
    }
}

/// Read the wishlist set from the session.
pub(crate) async fn get_wishlist(session: &Session) -> BTreeSet<ProductId> {
    session
        .get::<BTreeSet<ProductId>>(session_keys::WISHLIST)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub in_wishlist: bool,
}

/// "Product not found" escape-hatch page.
#[derive(Template, WebTemplate)]
#[template(path = "error/not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

/// Display a product detail page.
///
/// A missing product renders the not-found page with a way back home, never
/// a bare 500.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let product_id = ProductId::new(id);

    match state.supabase().get_product(&product_id).await {
        Ok(product) => {
            let in_wishlist = get_wishlist(&session).await.contains(&product.id);
            ProductShowTemplate {
                product: ProductDetailView::from(&product),
                in_wishlist,
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!("Product {product_id} unavailable: {e}");
            NotFoundTemplate {
                message: "পণ্যটি খুঁজে পাওয়া যায়নি।".to_string(),
            }
            .into_response()
        }
    }
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text search term.
    pub q: Option<String>,
    /// Category filter.
    pub category: Option<String>,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/search.html")]
pub struct SearchTemplate {
    pub heading: String,
    pub products: Vec<ProductCardView>,
}

/// Search products by term or browse a category.
#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let (heading, result) = match (&params.q, &params.category) {
        (Some(term), _) if !term.trim().is_empty() => {
            let term = term.trim();
            (
                format!("\"{term}\" এর ফলাফল"),
                state.supabase().search_products(term).await,
            )
        }
        (_, Some(category)) if !category.is_empty() => (
            "ক্যাটাগরি".to_string(),
            state
                .supabase()
                .get_products_by_category(&CategoryId::new(category.clone()))
                .await,
        ),
        _ => (
            "সকল পণ্য".to_string(),
            state.supabase().get_products().await,
        ),
    };

    let products = result.map_or_else(
        |e| {
            tracing::error!("Search failed: {e}");
            Vec::new()
        },
        |products| products.iter().map(ProductCardView::from).collect(),
    );

    SearchTemplate { heading, products }.into_response()
}
