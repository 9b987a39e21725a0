//! Wire types for the Supabase tables.
//!
//! Field names match the column names of the hosted schema, so every struct
//! deserializes straight from `PostgREST` JSON. Insert payloads are separate
//! types that serialize only the writable columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trizen_core::entitlement::{DEFAULT_VALIDITY_DAYS, Entitlement};
use trizen_core::{
    AddressId, BannerId, CategoryId, OrderId, OrderItemId, OrderStatus, Price, ProductId,
    ProductSnapshot, UserId,
};

/// A row of the `products` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub discount_label: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default = "default_in_stock")]
    pub is_in_stock: bool,
    #[serde(default)]
    pub is_digital_tool: bool,
    #[serde(default)]
    pub tool_external_url: Option<String>,
    #[serde(default)]
    pub validity_days: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// The fields the cart captures when this product is added.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            is_digital_tool: self.is_digital_tool,
        }
    }

    /// Access period for digital tools; rows without a value get the default.
    #[must_use]
    pub fn validity_days(&self) -> u32 {
        self.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS)
    }
}

/// A row of the `categories` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A row of the `banners_events` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image_url: String,
    pub is_active: bool,
    #[serde(default)]
    pub priority: i64,
}

/// How the buyer pays. Stored as the lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    /// Cash on delivery.
    #[default]
    Cod,
}

impl PaymentMethod {
    #[must_use]
    pub const fn label_bn(self) -> &'static str {
        match self {
            Self::Bkash => "বিকাশ",
            Self::Nagad => "নগদ",
            Self::Cod => "ক্যাশ অন ডেলিভারি",
        }
    }
}

/// Address snapshot embedded in an order row (JSON column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub name: String,
    pub phone: String,
    pub details: String,
}

/// A row of the `orders` table, optionally with embedded items.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Price,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub delivery_address: DeliveryAddress,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// A row of the `order_items` table with its price/name/image snapshots,
/// optionally with the embedded product row.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Price,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub products: Option<Product>,
}

/// Result row of the owned-tools query: an `order_items` row joined with
/// the granting order and the tool's product row.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedTool {
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub orders: OwnedToolOrder,
    pub products: OwnedToolProduct,
}

/// Embedded order fields of an owned-tool row.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedToolOrder {
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Embedded product fields of an owned-tool row.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedToolProduct {
    pub name: String,
    pub image_url: String,
    pub is_digital_tool: bool,
    #[serde(default)]
    pub tool_external_url: Option<String>,
    #[serde(default)]
    pub validity_days: Option<u32>,
}

impl OwnedTool {
    /// The entitlement this purchase grants.
    #[must_use]
    pub fn entitlement(&self) -> Entitlement {
        Entitlement {
            product_id: self.product_id.clone(),
            order_id: self.order_id.clone(),
            granted_at: self.orders.created_at,
            validity_days: self.products.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS),
        }
    }
}

/// A row of the `addresses` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub name: String,
    pub phone: String,
    pub area: String,
    pub details: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Insert payload for the `orders` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Price,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub delivery_address: DeliveryAddress,
}

/// One checkout line, before the order row it belongs to exists.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Price,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub product_name: String,
    pub product_image: String,
}

/// Insert payload for the `order_items` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Price,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub product_name: String,
    pub product_image: String,
}

impl NewOrderItem {
    /// Attach a checkout line to its created order row.
    #[must_use]
    pub fn for_order(order_id: &OrderId, line: OrderLine) -> Self {
        Self {
            order_id: order_id.clone(),
            product_id: line.product_id,
            quantity: line.quantity,
            price_at_purchase: line.price_at_purchase,
            selected_size: line.selected_size,
            selected_color: line.selected_color,
            product_name: line.product_name,
            product_image: line.product_image,
        }
    }
}

/// Insert/update payload for the `addresses` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub user_id: UserId,
    pub label: String,
    pub name: String,
    pub phone: String,
    pub area: String,
    pub details: String,
    pub is_default: bool,
}

/// Identity returned by `GoTrue`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_sparse_row() {
        // Older rows lack the digital-tool columns entirely.
        let json = r#"{
            "id": "p1",
            "name": "Polo Shirt",
            "price": 1250,
            "image_url": "https://cdn.example.com/p1.jpg"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Price::new(1250));
        assert!(product.is_in_stock);
        assert!(!product.is_digital_tool);
        assert_eq!(product.validity_days(), 30);
    }

    #[test]
    fn test_product_deserializes_tool_row() {
        let json = r#"{
            "id": "t1",
            "name": "Design Suite",
            "price": 500,
            "image_url": "https://cdn.example.com/t1.jpg",
            "is_digital_tool": true,
            "tool_external_url": "https://tools.example.com/design",
            "validity_days": 90,
            "sizes": null,
            "colors": null
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.is_digital_tool);
        assert_eq!(product.validity_days(), 90);
        assert!(product.sizes.is_none());
    }

    #[test]
    fn test_order_deserializes_with_nested_items() {
        let json = r#"{
            "id": "o1",
            "user_id": "u1",
            "status": "Shipped",
            "total_amount": 3810,
            "payment_method": "bkash",
            "delivery_address": {
                "name": "Arif Ahmed",
                "phone": "01700-000000",
                "details": "House 12, Road 5, Banani, Dhaka"
            },
            "created_at": "2024-06-01T10:00:00Z",
            "order_items": [
                {
                    "product_id": "p1",
                    "quantity": 3,
                    "price_at_purchase": 1250,
                    "selected_size": "M",
                    "selected_color": null,
                    "product_name": "Polo Shirt",
                    "product_image": "https://cdn.example.com/p1.jpg"
                }
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.payment_method, PaymentMethod::Bkash);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].quantity, 3);
    }

    #[test]
    fn test_payment_method_wire_strings() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).unwrap(),
            "\"cod\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"nagad\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Nagad);
    }

    #[test]
    fn test_owned_tool_entitlement() {
        let json = r#"{
            "product_id": "t1",
            "order_id": "o1",
            "quantity": 1,
            "price_at_purchase": 500,
            "orders": {
                "user_id": "u1",
                "created_at": "2024-06-01T10:00:00Z",
                "status": "Delivered"
            },
            "products": {
                "name": "Design Suite",
                "image_url": "https://cdn.example.com/t1.jpg",
                "is_digital_tool": true,
                "tool_external_url": "https://tools.example.com/design"
            }
        }"#;
        let tool: OwnedTool = serde_json::from_str(json).unwrap();
        let entitlement = tool.entitlement();
        assert_eq!(entitlement.validity_days, 30);
        assert_eq!(entitlement.order_id, OrderId::new("o1"));
    }

    #[test]
    fn test_for_order_attaches_the_order_id() {
        let line = OrderLine {
            product_id: ProductId::new("p1"),
            quantity: 2,
            price_at_purchase: Price::new(1250),
            selected_size: Some("M".to_string()),
            selected_color: None,
            product_name: "Polo Shirt".to_string(),
            product_image: "https://cdn.example.com/p1.jpg".to_string(),
        };
        let item = NewOrderItem::for_order(&OrderId::new("o9"), line);
        assert_eq!(item.order_id, OrderId::new("o9"));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.product_name, "Polo Shirt");
    }

    #[test]
    fn test_new_order_serializes_writable_columns() {
        let payload = NewOrder {
            user_id: UserId::new("u1"),
            total_amount: Price::new(3810),
            payment_method: PaymentMethod::Cod,
            status: OrderStatus::Pending,
            delivery_address: DeliveryAddress {
                name: "Arif Ahmed".to_string(),
                phone: "01700-000000".to_string(),
                details: "House 12, Road 5, Banani, Dhaka".to_string(),
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["payment_method"], "cod");
        assert_eq!(json["total_amount"], 3810);
    }
}
