//! Order history, confirmation and tracking route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use trizen_core::timeline::{StepState, order_timeline};
use trizen_core::{OrderId, OrderStatus};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::products::NotFoundTemplate;
use crate::state::AppState;
use crate::supabase::SupabaseError;
use crate::supabase::types::Order;

/// Order summary display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    pub status_label: String,
    pub status_class: String,
    pub total: String,
    pub placed_on: String,
    pub items: Vec<OrderItemView>,
}

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: order.id.short().to_string(),
            status_label: order.status.label_bn().to_string(),
            status_class: order.status.to_string().to_lowercase(),
            total: order.total_amount.to_string(),
            placed_on: order.created_at.format("%d/%m/%Y").to_string(),
            items: order
                .order_items
                .iter()
                .map(|item| OrderItemView {
                    name: item
                        .product_name
                        .clone()
                        .or_else(|| item.products.as_ref().map(|p| p.name.clone()))
                        .unwrap_or_default(),
                    image_url: item
                        .product_image
                        .clone()
                        .or_else(|| item.products.as_ref().map(|p| p.image_url.clone()))
                        .unwrap_or_default(),
                    quantity: item.quantity,
                    price: item.price_at_purchase.to_string(),
                    size: item.selected_size.clone(),
                    color: item.selected_color.clone(),
                })
                .collect(),
        }
    }
}

/// Status tab for the history page.
#[derive(Clone)]
pub struct StatusTab {
    pub key: String,
    pub label: String,
    pub active: bool,
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub status: Option<String>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/history.html")]
pub struct OrderHistoryTemplate {
    pub tabs: Vec<StatusTab>,
    pub orders: Vec<OrderView>,
}

/// Display the order history, optionally filtered to one status tab.
#[instrument(skip(state, user))]
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<HistoryParams>,
) -> Result<Response, AppError> {
    let filter = params
        .status
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok());

    let orders = state
        .supabase()
        .get_orders(&user.access_token, &user.id, filter)
        .await?;

    let tabs = [
        (None, "সব"),
        (Some(OrderStatus::Pending), OrderStatus::Pending.label_bn()),
        (Some(OrderStatus::Shipped), OrderStatus::Shipped.label_bn()),
        (
            Some(OrderStatus::Delivered),
            OrderStatus::Delivered.label_bn(),
        ),
    ]
    .into_iter()
    .map(|(status, label)| StatusTab {
        key: status.map(|s| s.to_string()).unwrap_or_default(),
        label: label.to_string(),
        active: status == filter,
    })
    .collect();

    Ok(OrderHistoryTemplate {
        tabs,
        orders: orders.iter().map(OrderView::from).collect(),
    }
    .into_response())
}

/// Confirmation query parameters.
#[derive(Debug, Deserialize)]
pub struct ConfirmationParams {
    pub id: Option<String>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub short_id: Option<String>,
    pub tracking_url: Option<String>,
}

/// Display the post-checkout confirmation page.
#[instrument]
pub async fn confirmation(Query(params): Query<ConfirmationParams>) -> impl IntoResponse {
    let short_id = params
        .id
        .as_deref()
        .map(|id| OrderId::new(id).short().to_string());
    let tracking_url = params.id.as_deref().map(|id| format!("/orders/{id}/tracking"));

    ConfirmationTemplate {
        short_id,
        tracking_url,
    }
}

/// One tracker step, preformatted for the template.
#[derive(Clone)]
pub struct TimelineStepView {
    pub title: String,
    pub state_class: String,
    pub timestamp: Option<String>,
}

/// Order tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/tracking.html")]
pub struct TrackingTemplate {
    pub order: OrderView,
    pub steps: Vec<TimelineStepView>,
    pub estimated_delivery: Option<String>,
}

const fn step_class(state: StepState) -> &'static str {
    match state {
        StepState::Done => "done",
        StepState::Active => "active",
        StepState::Upcoming => "upcoming",
        StepState::Cancelled => "cancelled",
    }
}

/// Display the tracking timeline for one order.
///
/// An unknown or foreign order ID renders the not-found page with a way
/// back, never a 500.
#[instrument(skip(state, user))]
pub async fn tracking(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);

    let order = match state
        .supabase()
        .get_order(&user.access_token, &user.id, &order_id)
        .await
    {
        Ok(order) => order,
        Err(SupabaseError::NotFound(_)) => {
            return Ok(NotFoundTemplate {
                message: "অর্ডারটি খুঁজে পাওয়া যায়নি।".to_string(),
            }
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let timeline = order_timeline(order.status, order.created_at);

    let steps = timeline
        .steps
        .iter()
        .map(|step| TimelineStepView {
            title: step.title.to_string(),
            state_class: step_class(step.state).to_string(),
            timestamp: step.timestamp.map(|t| t.format("%d/%m/%Y").to_string()),
        })
        .collect();

    Ok(TrackingTemplate {
        order: OrderView::from(&order),
        steps,
        estimated_delivery: timeline
            .estimated_delivery
            .map(|t| t.format("%d/%m/%Y").to_string()),
    }
    .into_response())
}
