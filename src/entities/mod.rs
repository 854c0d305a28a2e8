// Entity Models
//
// Two catalog shapes (providers, brokers) share one filtering contract: `Listing`.
// Testimonials are not filtered; they only feed the carousel.
//
// Identity: `id` is stable and unique within its catalog.
// Values are supplied whole by the data source and never mutated by the core.

pub mod broker;
pub mod provider;
pub mod testimonial;

pub use broker::Broker;
pub use provider::{Provider, RiskLevel};
pub use testimonial::Testimonial;

use crate::facets::FacetSpec;

/// Common capability of every browsable entity
pub trait Listing: Sized {
    /// Catalog name used in logs and routes ("providers", "brokers")
    const CATALOG: &'static str;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Category tags the free-text search looks into
    fn search_tags(&self) -> &[String];

    /// Outbound link for "subscribe" / "open account"
    fn affiliate_url(&self) -> &str;

    /// Range checks on the numeric attributes
    fn validate(&self) -> Result<(), String>;

    /// The fixed facet set of this catalog
    fn declared_facets() -> Vec<FacetSpec<Self>>;
}

pub(crate) fn check_rating(rating: f64) -> Result<(), String> {
    if rating.is_finite() && (0.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(format!("rating {} outside 0-5", rating))
    }
}

pub(crate) fn to_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
