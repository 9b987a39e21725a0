//! Digital tool route handlers.
//!
//! "My tools" lists every entitlement from non-cancelled orders; the access
//! screen gates the external link on the entitlement still having days left.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::instrument;

use trizen_core::ProductId;
use trizen_core::entitlement::Entitlement;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::supabase::types::OwnedTool;

/// Purchased tool display data.
#[derive(Clone)]
pub struct ToolView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub order_short_id: String,
    pub days_remaining: u32,
    pub validity_days: u32,
    pub expired: bool,
}

fn tool_view(tool: &OwnedTool, entitlement: &Entitlement) -> ToolView {
    let now = Utc::now();
    ToolView {
        product_id: tool.product_id.to_string(),
        name: tool.products.name.clone(),
        image_url: tool.products.image_url.clone(),
        order_short_id: tool.order_id.short().to_string(),
        days_remaining: entitlement.days_remaining(now),
        validity_days: entitlement.validity_days,
        expired: entitlement.is_expired(now),
    }
}

/// The external link, withheld once the entitlement has expired.
fn access_url(tool: &OwnedTool, view: &ToolView) -> Option<String> {
    if view.expired {
        None
    } else {
        tool.products.tool_external_url.clone()
    }
}

/// My-tools page template.
#[derive(Template, WebTemplate)]
#[template(path = "tools/index.html")]
pub struct ToolsIndexTemplate {
    pub tools: Vec<ToolView>,
}

/// Display the user's purchased digital tools with their countdowns.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let owned = state
        .supabase()
        .get_owned_tools(&user.access_token, &user.id)
        .await?;

    let tools = owned
        .iter()
        .map(|tool| {
            let entitlement = tool.entitlement();
            tool_view(tool, &entitlement)
        })
        .collect();

    Ok(ToolsIndexTemplate { tools }.into_response())
}

/// Tool access page template.
#[derive(Template, WebTemplate)]
#[template(path = "tools/show.html")]
pub struct ToolAccessTemplate {
    pub tool: ToolView,
    /// External access link; `None` once the entitlement has expired.
    pub access_url: Option<String>,
}

/// Access-blocked page template (no entitlement, or not a digital tool).
#[derive(Template, WebTemplate)]
#[template(path = "tools/blocked.html")]
pub struct ToolBlockedTemplate {}

/// Display the access screen for one purchased tool.
///
/// The external link is only rendered while the entitlement is active.
/// Expired entitlements show the renewal prompt; products the user never
/// bought (or that are not digital tools) get the blocked page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(id);

    let owned = state
        .supabase()
        .get_owned_tools(&user.access_token, &user.id)
        .await?;

    // Several purchases of the same tool may exist; the freshest grant wins.
    let Some(tool) = owned
        .iter()
        .filter(|t| t.product_id == product_id && t.products.is_digital_tool)
        .max_by_key(|t| t.orders.created_at)
    else {
        return Ok(ToolBlockedTemplate {}.into_response());
    };

    let entitlement = tool.entitlement();
    let view = tool_view(tool, &entitlement);
    let access_url = access_url(tool, &view);

    Ok(ToolAccessTemplate {
        tool: view,
        access_url,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use trizen_core::{OrderId, OrderStatus};

    use crate::supabase::types::{OwnedToolOrder, OwnedToolProduct};

    fn owned_tool(granted_days_ago: i64) -> OwnedTool {
        OwnedTool {
            product_id: ProductId::new("t1"),
            order_id: OrderId::new("o1"),
            orders: OwnedToolOrder {
                created_at: Utc::now() - Duration::days(granted_days_ago),
                status: OrderStatus::Delivered,
            },
            products: OwnedToolProduct {
                name: "Design Suite".to_string(),
                image_url: "https://cdn.example.com/t1.jpg".to_string(),
                is_digital_tool: true,
                tool_external_url: Some("https://tools.example.com/design".to_string()),
                validity_days: Some(30),
            },
        }
    }

    #[test]
    fn test_expired_entitlement_withholds_access_url() {
        let tool = owned_tool(45);
        let entitlement = tool.entitlement();
        let view = tool_view(&tool, &entitlement);

        assert!(view.expired);
        assert_eq!(view.days_remaining, 0);
        assert_eq!(access_url(&tool, &view), None);
    }

    #[test]
    fn test_active_entitlement_links_out() {
        let tool = owned_tool(5);
        let entitlement = tool.entitlement();
        let view = tool_view(&tool, &entitlement);

        assert!(!view.expired);
        assert_eq!(view.days_remaining, 25);
        assert_eq!(
            access_url(&tool, &view).as_deref(),
            Some("https://tools.example.com/design")
        );
    }
}
