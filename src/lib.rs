// Signal Catalog - Core Library
// Exposes all modules for use in the terminal browser, the API server and tests

pub mod catalog;    // Catalog Store - immutable source collections
pub mod entities;   // Providers, brokers, testimonials
pub mod facets;     // Filter predicates (search + facets)
pub mod filter;     // Filter Engine - visible set recomputation
pub mod timer;      // Cancellable autoplay timer
pub mod carousel;   // Carousel State Machine
pub mod error;
pub mod config;
pub mod db;         // SQLite catalog source
pub mod seed;       // Launch data

#[cfg(feature = "server")]
pub mod api;        // REST surface over the filter engine

// Re-export commonly used types
pub use catalog::{Catalog, Navigator};
pub use entities::{Broker, Listing, Provider, RiskLevel, Testimonial};
pub use facets::{
    Criterion, FacetDescriptor, FacetKind, FacetOption, FacetSpec, SearchTerm, NO_CONSTRAINT,
};
pub use filter::{compute_visible, FilterEngine, FilterState};
pub use timer::{DeadlineClock, TickToken, TimerGuard, TimerSource};
pub use carousel::{Carousel, PlayState, DEFAULT_INTERVAL};
pub use error::{CatalogError, CatalogResult};
pub use config::Config;
pub use db::{
    CatalogSnapshot, SeedReport, Table,
    setup_database, seed_if_empty, load_snapshot, count_rows,
    insert_providers, insert_brokers, insert_testimonials,
    get_all_providers, get_all_brokers, get_approved_testimonials,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
