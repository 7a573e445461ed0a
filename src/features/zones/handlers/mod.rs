mod pricing_handler;
mod zone_handler;

pub use pricing_handler::*;
pub use zone_handler::*;
