mod pricing_service;
mod zone_service;

pub use pricing_service::{EffectiveAreaPrice, PricingService};
pub use zone_service::ZoneService;
