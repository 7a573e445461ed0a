//! Delivery zones: countries, governorates and areas, with the delivery price
//! resolver.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET/POST | `/api/zones/countries` | list / create |
//! | GET/PATCH/DELETE | `/api/zones/countries/{id}` | |
//! | GET/POST | `/api/zones/countries/{id}/governorates` | list / create |
//! | GET/PATCH/DELETE | `/api/zones/governorates/{id}` | |
//! | PUT | `/api/zones/governorates/{id}/delivery-price` | audited price change |
//! | GET/POST | `/api/zones/governorates/{id}/areas` | list / create |
//! | GET/PATCH/DELETE | `/api/zones/areas/{id}` | |
//! | PUT | `/api/zones/areas/{id}/delivery-price` | override or reset |
//! | GET | `/api/zones/areas/{id}/effective-price` | resolved price |
//! | GET | `/api/zones/price-history` | audit trail |
//!
//! Writes require `RequireAdmin`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::{PricingService, ZoneService};
pub use stores::PgPricingStore;
