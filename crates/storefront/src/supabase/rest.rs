//! `PostgREST` client implementation.
//!
//! Uses `reqwest` for HTTP with a 10 second timeout and no retries -
//! failures are terminal and surface to the caller (the handlers decide
//! what to show). Catalog reads are cached with `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use trizen_core::{AddressId, CategoryId, OrderId, OrderStatus, ProductId, UserId};

use crate::config::SupabaseConfig;
use crate::supabase::SupabaseError;
use crate::supabase::cache::CacheValue;
use crate::supabase::types::{
    Address, Banner, Category, NewAddress, NewOrder, NewOrderItem, Order, OrderLine, OwnedTool,
    Product,
};

/// Select clause embedding items and their product rows into each order.
const ORDER_SELECT: &str = "*,order_items(*,products(*))";

/// Select clause for the owned-tools query (items joined with the granting
/// order and the tool product).
const OWNED_TOOLS_SELECT: &str =
    "*,orders!inner(user_id,created_at,status),products!inner(name,image_url,is_digital_tool,tool_external_url,validity_days)";

/// Client for the Supabase data API.
///
/// Cheaply cloneable; all handlers share one HTTP connection pool and one
/// catalog cache.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    cache: Cache<String, CacheValue>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                http,
                base_url: config.url.clone(),
                anon_key: config.anon_key.expose_secret().to_string(),
                cache,
            }),
        })
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(super) fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(super) fn anon_key(&self) -> &str {
        &self.inner.anon_key
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base_url)
    }

    /// Attach the `apikey` and bearer headers.
    ///
    /// Public catalog reads pass `None` and authenticate as the anon role;
    /// user-scoped queries pass the signed-in user's access token so row
    /// level security applies.
    fn authed(
        &self,
        request: reqwest::RequestBuilder,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.inner.anon_key);
        request
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: extract_api_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse PostgREST response"
            );
            SupabaseError::Parse(e)
        })
    }

    /// Send a request where only the status matters (DELETE, bare inserts).
    async fn execute_no_content(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), SupabaseError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: extract_api_message(&body),
            });
        }

        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("categories"))
                .query(&[("select", "*")]),
            None,
        );
        let categories: Vec<Category> = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("products"))
                .query(&[("select", "*")]),
            None,
        );
        let products: Vec<Product> = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, SupabaseError> {
        let cache_key = format!("products:category:{category_id}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let category_filter = format!("eq.{category_id}");
        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("products"))
                .query(&[("select", "*"), ("category_id", category_filter.as_str())]),
            None,
        );
        let products: Vec<Product> = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Search products by name, case-insensitive substring match.
    ///
    /// Search results are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(term = %term))]
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>, SupabaseError> {
        let name_filter = format!("ilike.*{term}*");
        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("products"))
                .query(&[("select", "*"), ("name", name_filter.as_str())]),
            None,
        );
        self.execute(request).await
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such row exists, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, SupabaseError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let id_filter = format!("eq.{product_id}");
        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("products"))
                .query(&[("select", "*"), ("id", id_filter.as_str())]),
            None,
        );
        let mut rows: Vec<Product> = self.execute(request).await?;

        let product = if rows.is_empty() {
            return Err(SupabaseError::NotFound(format!(
                "product {product_id} not found"
            )));
        } else {
            rows.swap_remove(0)
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get active promotional banners, highest priority first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_active_banners(&self) -> Result<Vec<Banner>, SupabaseError> {
        let cache_key = "banners:active".to_string();

        if let Some(CacheValue::Banners(banners)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for banners");
            return Ok(banners);
        }

        let request = self.authed(
            self.inner
                .http
                .get(self.table_url("banners_events"))
                .query(&[
                    ("select", "*"),
                    ("is_active", "eq.true"),
                    ("order", "priority.desc"),
                ]),
            None,
        );
        let banners: Vec<Banner> = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Banners(banners.clone()))
            .await;

        Ok(banners)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Get a user's orders with embedded items, newest first, optionally
    /// filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_orders(
        &self,
        access_token: &str,
        user_id: &UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, SupabaseError> {
        let mut query = vec![
            ("select".to_string(), ORDER_SELECT.to_string()),
            ("user_id".to_string(), format!("eq.{user_id}")),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(status) = status {
            query.push(("status".to_string(), format!("eq.{status}")));
        }

        let request = self.authed(
            self.inner.http.get(self.table_url("orders")).query(&query),
            Some(access_token),
        );
        self.execute(request).await
    }

    /// Get one of the user's orders by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist or belongs to another
    /// user, or an error if the API request fails.
    #[instrument(skip(self, access_token), fields(order_id = %order_id))]
    pub async fn get_order(
        &self,
        access_token: &str,
        user_id: &UserId,
        order_id: &OrderId,
    ) -> Result<Order, SupabaseError> {
        let id_filter = format!("eq.{order_id}");
        let user_filter = format!("eq.{user_id}");
        let request = self.authed(
            self.inner.http.get(self.table_url("orders")).query(&[
                ("select", ORDER_SELECT),
                ("id", id_filter.as_str()),
                ("user_id", user_filter.as_str()),
            ]),
            Some(access_token),
        );
        let mut rows: Vec<Order> = self.execute(request).await?;

        if rows.is_empty() {
            return Err(SupabaseError::NotFound(format!(
                "order {order_id} not found"
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Get the user's purchased digital tools.
    ///
    /// Cancelled orders grant nothing, so they are excluded at the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_owned_tools(
        &self,
        access_token: &str,
        user_id: &UserId,
    ) -> Result<Vec<OwnedTool>, SupabaseError> {
        let user_filter = format!("eq.{user_id}");
        let request = self.authed(
            self.inner.http.get(self.table_url("order_items")).query(&[
                ("select", OWNED_TOOLS_SELECT),
                ("orders.user_id", user_filter.as_str()),
                ("products.is_digital_tool", "eq.true"),
                ("orders.status", "neq.Cancelled"),
            ]),
            Some(access_token),
        );
        self.execute(request).await
    }

    /// Create an order row and return the stored representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token, order))]
    pub async fn create_order(
        &self,
        access_token: &str,
        order: &NewOrder,
    ) -> Result<Order, SupabaseError> {
        let request = self
            .authed(
                self.inner.http.post(self.table_url("orders")),
                Some(access_token),
            )
            .header("Prefer", "return=representation")
            .json(order);
        let mut rows: Vec<Order> = self.execute(request).await?;

        if rows.is_empty() {
            return Err(SupabaseError::Api {
                status: 200,
                message: "order insert returned no rows".to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }

    /// Insert the order-item rows for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token, items), fields(count = items.len()))]
    pub async fn create_order_items(
        &self,
        access_token: &str,
        items: &[NewOrderItem],
    ) -> Result<(), SupabaseError> {
        let request = self
            .authed(
                self.inner.http.post(self.table_url("order_items")),
                Some(access_token),
            )
            .json(items);
        self.execute_no_content(request).await
    }

    /// Delete an order row. Used to clean up after a failed item insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(order_id = %order_id))]
    pub async fn delete_order(
        &self,
        access_token: &str,
        order_id: &OrderId,
    ) -> Result<(), SupabaseError> {
        let request = self.authed(
            self.inner
                .http
                .delete(self.table_url("orders"))
                .query(&[("id", &format!("eq.{order_id}"))]),
            Some(access_token),
        );
        self.execute_no_content(request).await
    }

    /// Place an order: insert the order row, then its item rows.
    ///
    /// The write is two requests and the service has no transactions over
    /// REST, so a failed item insert leaves an orphan order row. That row is
    /// deleted best-effort before the item error is surfaced; if the delete
    /// also fails it is logged and the original error still wins.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails. The returned error is always
    /// the first failure.
    #[instrument(skip_all, fields(user_id = %order.user_id, lines = lines.len()))]
    pub async fn place_order(
        &self,
        access_token: &str,
        order: &NewOrder,
        lines: &[OrderLine],
    ) -> Result<Order, SupabaseError> {
        let created = self.create_order(access_token, order).await?;

        let items: Vec<NewOrderItem> = lines
            .iter()
            .map(|line| NewOrderItem::for_order(&created.id, line.clone()))
            .collect();

        if let Err(item_error) = self.create_order_items(access_token, &items).await {
            tracing::error!(
                order_id = %created.id,
                error = %item_error,
                "Order item insert failed, removing orphan order"
            );
            if let Err(delete_error) = self.delete_order(access_token, &created.id).await {
                tracing::error!(
                    order_id = %created.id,
                    error = %delete_error,
                    "Failed to remove orphan order"
                );
            }
            return Err(item_error);
        }

        Ok(created)
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// List the user's saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn list_addresses(
        &self,
        access_token: &str,
        user_id: &UserId,
    ) -> Result<Vec<Address>, SupabaseError> {
        let user_filter = format!("eq.{user_id}");
        let request = self.authed(
            self.inner.http.get(self.table_url("addresses")).query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "is_default.desc"),
            ]),
            Some(access_token),
        );
        self.execute(request).await
    }

    /// Get the user's default address, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token), fields(user_id = %user_id))]
    pub async fn get_default_address(
        &self,
        access_token: &str,
        user_id: &UserId,
    ) -> Result<Option<Address>, SupabaseError> {
        let mut addresses = self.list_addresses(access_token, user_id).await?;
        if addresses.is_empty() {
            return Ok(None);
        }
        Ok(Some(addresses.swap_remove(0)))
    }

    /// Create an address and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token, address))]
    pub async fn create_address(
        &self,
        access_token: &str,
        address: &NewAddress,
    ) -> Result<Address, SupabaseError> {
        let request = self
            .authed(
                self.inner.http.post(self.table_url("addresses")),
                Some(access_token),
            )
            .header("Prefer", "return=representation")
            .json(address);
        let mut rows: Vec<Address> = self.execute(request).await?;

        if rows.is_empty() {
            return Err(SupabaseError::Api {
                status: 200,
                message: "address insert returned no rows".to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }

    /// Update an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token, address), fields(address_id = %address_id))]
    pub async fn update_address(
        &self,
        access_token: &str,
        address_id: &AddressId,
        address: &NewAddress,
    ) -> Result<(), SupabaseError> {
        let request = self
            .authed(
                self.inner
                    .http
                    .patch(self.table_url("addresses"))
                    .query(&[("id", &format!("eq.{address_id}"))]),
                Some(access_token),
            )
            .json(address);
        self.execute_no_content(request).await
    }
}

/// Pull the human-readable message out of a `PostgREST`/`GoTrue` error body.
pub(super) fn extract_api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_message_postgrest() {
        let body = r#"{"code":"23505","message":"duplicate key value","details":null}"#;
        assert_eq!(extract_api_message(body), "duplicate key value");
    }

    #[test]
    fn test_extract_api_message_gotrue() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(extract_api_message(body), "Invalid login credentials");
    }

    #[test]
    fn test_extract_api_message_opaque_body() {
        assert_eq!(extract_api_message("upstream timeout"), "upstream timeout");
    }
}
