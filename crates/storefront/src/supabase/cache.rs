//! Cache types for catalog responses.

use crate::supabase::types::{Banner, Category, Product};

/// Cached value types for the catalog reads.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Banners(Vec<Banner>),
}
