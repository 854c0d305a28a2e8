// ⚠️ Catalog Errors - contract violations of the core
//
// Everything here is a rejected precondition. Nothing is transient, so nothing
// is retried: callers either fix the call or ignore the rejection.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Facet name not declared for the catalog
    #[error("unknown facet: {0}")]
    UnknownFacet(String),

    /// Numeric facet value that does not parse
    #[error("invalid value {value:?} for facet {facet}")]
    InvalidFacetValue { facet: String, value: String },

    /// Carousel jump outside `0..len`
    #[error("index {index} out of range for {len} slides")]
    IndexOutOfRange { index: usize, len: usize },

    /// Carousel built over zero slides
    #[error("carousel needs at least one slide")]
    EmptySequence,

    #[error("duplicate id in catalog: {0}")]
    DuplicateId(String),

    #[error("invalid entity {id}: {reason}")]
    InvalidEntity { id: String, reason: String },

    #[error("no entity with id {0}")]
    NotFound(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
