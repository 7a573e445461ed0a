mod area;
mod country;
mod governorate;
mod price_change;

pub use area::Area;
pub use country::Country;
pub use governorate::Governorate;
pub use price_change::{PriceChangeRecord, PriceEntityType};
