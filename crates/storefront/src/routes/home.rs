//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::products::ProductCardView;
use crate::state::AppState;
use crate::supabase::types::{Banner, Category};

/// Category chip display data.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub slug: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// Promotional banner display data.
#[derive(Clone)]
pub struct BannerView {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
}

impl From<&Banner> for BannerView {
    fn from(banner: &Banner) -> Self {
        Self {
            title: banner.title.clone(),
            subtitle: banner.subtitle.clone(),
            image_url: banner.image_url.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub banners: Vec<BannerView>,
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductCardView>,
    /// Signed-in user's email, for the greeting.
    pub user_email: Option<String>,
}

/// Display the home page.
///
/// A failed fetch for any section renders that section's empty state rather
/// than failing the whole page.
#[instrument(skip(state, user))]
pub async fn home(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let banners = state.supabase().get_active_banners().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch banners: {e}");
            Vec::new()
        },
        |banners| banners.iter().map(BannerView::from).collect(),
    );

    let categories = state.supabase().get_categories().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| categories.iter().map(CategoryView::from).collect(),
    );

    let products = state.supabase().get_products().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch products: {e}");
            Vec::new()
        },
        |products| products.iter().map(ProductCardView::from).collect(),
    );

    HomeTemplate {
        banners,
        categories,
        products,
        user_email: user.map(|u| u.email.to_string()),
    }
}
