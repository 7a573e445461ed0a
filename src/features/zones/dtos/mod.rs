mod pricing_dto;
mod zone_dto;

pub use pricing_dto::*;
pub use zone_dto::*;
