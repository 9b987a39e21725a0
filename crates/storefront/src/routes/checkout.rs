//! Checkout route handlers.
//!
//! Both validations (non-empty cart, signed-in user) are enforced here
//! before anything reaches the data service. The order write itself is the
//! client's `place_order`, which compensates for a failed item insert.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use trizen_core::{CartStore, OrderStatus};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::cart::{CartView, get_cart, save_cart};
use crate::state::AppState;
use crate::supabase::types::{DeliveryAddress, NewOrder, OrderLine, PaymentMethod};

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub address: Option<AddressView>,
    /// Raw taka amounts, formatted with the `taka` filter in the template.
    pub delivery_charge: i64,
    pub total: i64,
}

/// Delivery address display data.
#[derive(Clone)]
pub struct AddressView {
    pub name: String,
    pub phone: String,
    pub details: String,
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub payment_method: PaymentMethod,
}

/// Display the checkout page.
///
/// Requires auth; an empty cart bounces back to the cart page, and a user
/// without a saved address is sent to create one first.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let cart = get_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let address = state
        .supabase()
        .get_default_address(&user.access_token, &user.id)
        .await?
        .map(|a| AddressView {
            name: a.name,
            phone: a.phone,
            details: format!("{}, {}", a.details, a.area),
        });

    let total = cart
        .subtotal()
        .saturating_add(state.delivery_charge());

    Ok(CheckoutTemplate {
        cart: CartView::from(&cart),
        address,
        delivery_charge: state.delivery_charge().amount(),
        total: total.amount(),
    }
    .into_response())
}

/// Place the order.
///
/// Writes the order with a `Pending` status and a full snapshot of the
/// delivery address and of each line's price/name/image, then clears the
/// cart and lands on the confirmation page.
#[instrument(skip(state, session, user))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response, AppError> {
    let cart = get_cart(&session).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let Some(address) = state
        .supabase()
        .get_default_address(&user.access_token, &user.id)
        .await?
    else {
        return Ok(Redirect::to("/account/addresses/new").into_response());
    };

    let total = cart
        .subtotal()
        .saturating_add(state.delivery_charge());

    let order = NewOrder {
        user_id: user.id.clone(),
        total_amount: total,
        payment_method: form.payment_method,
        status: OrderStatus::Pending,
        delivery_address: DeliveryAddress {
            name: address.name,
            phone: address.phone,
            details: format!("{}, {}", address.details, address.area),
        },
    };

    let lines = order_lines(&cart);

    let created = state
        .supabase()
        .place_order(&user.access_token, &order, &lines)
        .await?;

    let mut cart = cart;
    cart.clear();
    save_cart(&session, &cart).await?;

    tracing::info!(order_id = %created.id, "Order placed");
    Ok(Redirect::to(&format!("/orders/confirmation?id={}", created.id)).into_response())
}

/// Snapshot the cart lines for insertion.
///
/// `place_order` attaches the order ID once the order row exists.
fn order_lines(cart: &CartStore) -> Vec<OrderLine> {
    cart.lines()
        .iter()
        .map(|line| OrderLine {
            product_id: line.product.id.clone(),
            quantity: line.quantity,
            price_at_purchase: line.product.price,
            selected_size: line.size.clone(),
            selected_color: line.color.clone(),
            product_name: line.product.name.clone(),
            product_image: line.product.image_url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trizen_core::{Price, ProductId, ProductSnapshot};

    fn snapshot(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(price),
            image_url: format!("https://cdn.example.com/{id}.jpg"),
            is_digital_tool: false,
        }
    }

    #[test]
    fn test_order_lines_snapshot_the_cart() {
        let mut cart = CartStore::new();
        cart.add_item(snapshot("p1", 1250), 3, Some("M".into()), None);
        cart.add_item(snapshot("t1", 500), 1, None, None);

        let lines = order_lines(&cart);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].price_at_purchase, Price::new(1250));
        assert_eq!(lines[0].selected_size.as_deref(), Some("M"));
        assert_eq!(lines[1].product_name, "Product t1");
    }
}
