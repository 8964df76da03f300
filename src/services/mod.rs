//! Service layer
//!
//! Dashboard operations built on the API gateway, plus the standalone
//! pricing and country helpers used by the marketing pages.

pub mod contact;
pub mod country;
pub mod link_service;
pub mod pricing;
pub mod stats_period;

pub use contact::ContactService;
pub use country::CountryDetector;
pub use link_service::{LinkEndpoints, LinkQueryKey, LinkService};
pub use pricing::{Currency, PricingPlan, RegionalPricing, format_price, pricing_for_country};
pub use stats_period::StatsPeriod;
