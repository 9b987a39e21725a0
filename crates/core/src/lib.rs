//! TriZen Core - Shared types and session computations.
//!
//! This crate provides the types and pure logic used by the TriZen Shop
//! storefront:
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   order statuses
//! - [`cart`] - The in-memory shopping cart with line-merge semantics
//! - [`timeline`] - Order lifecycle display timeline
//! - [`entitlement`] - Digital-tool entitlement windows
//!
//! # Architecture
//!
//! The core crate contains only types and computations - no I/O, no HTTP
//! clients, no async. Everything here is deterministic and runs to
//! completion on the calling event. All remote data lives in the external
//! data service and is fetched by the storefront crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod entitlement;
pub mod timeline;
pub mod types;

pub use cart::{CartLine, CartStore, LineKey, ProductSnapshot};
pub use types::*;
