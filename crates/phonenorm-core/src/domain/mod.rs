pub mod country;
pub mod registry;
pub mod rule;

pub use country::{normalize_country_id, CountryId};
pub use registry::Registry;
pub use rule::CountryRule;
