// 🧮 Filter Engine - mutate state, then recompute the visible set
//
// The visible set is a pure function of (source collection, FilterState).
// Every setter recomputes it in full before returning, so a reader never
// observes a half-applied filter. Collections are small (tens to hundreds),
// full recomputation is the whole strategy.

use crate::catalog::Catalog;
use crate::entities::Listing;
use crate::error::{CatalogError, CatalogResult};
use crate::facets::{Criterion, FacetDescriptor, FacetSpec, SearchTerm};
use std::sync::Arc;

/// Query key that carries the free-text search in `apply_params`
pub const SEARCH_PARAM: &str = "search";

// ============================================================================
// FILTER STATE
// ============================================================================

/// Search term plus one criterion per declared facet
pub struct FilterState<E> {
    search: SearchTerm,
    facets: Vec<(FacetSpec<E>, Criterion)>,
}

impl<E> Clone for FilterState<E> {
    fn clone(&self) -> Self {
        FilterState {
            search: self.search.clone(),
            facets: self.facets.clone(),
        }
    }
}

impl<E: Listing> FilterState<E> {
    /// Everything unconstrained
    pub fn new() -> Self {
        FilterState {
            search: SearchTerm::default(),
            facets: E::declared_facets()
                .into_iter()
                .map(|spec| (spec, Criterion::Any))
                .collect(),
        }
    }

    pub fn search_term(&self) -> &str {
        self.search.as_str()
    }

    pub fn criterion(&self, facet: &str) -> Option<&Criterion> {
        self.facets
            .iter()
            .find(|(spec, _)| spec.name == facet)
            .map(|(_, criterion)| criterion)
    }

    /// True when no predicate constrains anything
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty() && self.facets.iter().all(|(_, c)| c.is_any())
    }

    /// AND of the search predicate and every facet predicate
    pub fn matches(&self, entity: &E) -> bool {
        self.search.matches(entity)
            && self
                .facets
                .iter()
                .all(|(spec, criterion)| spec.matches(entity, criterion))
    }

    fn slot(&mut self, facet: &str) -> CatalogResult<&mut (FacetSpec<E>, Criterion)> {
        self.facets
            .iter_mut()
            .find(|(spec, _)| spec.name == facet)
            .ok_or_else(|| CatalogError::UnknownFacet(facet.to_string()))
    }
}

impl<E: Listing> Default for FilterState<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices of the entities passing every predicate, in source order
pub fn compute_visible<E: Listing>(source: &[E], state: &FilterState<E>) -> Vec<usize> {
    source
        .iter()
        .enumerate()
        .filter(|(_, entity)| state.matches(entity))
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// FILTER ENGINE
// ============================================================================

pub struct FilterEngine<E> {
    catalog: Arc<Catalog<E>>,
    state: FilterState<E>,
    visible: Vec<usize>,
}

impl<E: Listing> FilterEngine<E> {
    pub fn new(catalog: Arc<Catalog<E>>) -> Self {
        let state = FilterState::new();
        let visible = compute_visible(catalog.as_slice(), &state);

        FilterEngine {
            catalog,
            state,
            visible,
        }
    }

    /// Replace the search term. Empty clears it; whitespace is kept as typed.
    pub fn set_search_term(&mut self, text: &str) {
        self.state.search = SearchTerm::new(text);
        self.recompute("search");
    }

    /// Replace one facet's selection (`all` lifts the constraint)
    pub fn set_facet(&mut self, name: &str, value: &str) -> CatalogResult<()> {
        let slot = self.state.slot(name)?;
        // parse before touching state so a rejected value changes nothing
        let criterion = slot.0.parse(value)?;
        slot.1 = criterion;
        self.recompute(name);
        Ok(())
    }

    pub fn clear_facet(&mut self, name: &str) -> CatalogResult<()> {
        self.state.slot(name)?.1 = Criterion::Any;
        self.recompute(name);
        Ok(())
    }

    /// Drop the search term and every facet constraint
    pub fn reset(&mut self) {
        self.state = FilterState::new();
        self.recompute("reset");
    }

    /// Apply `search` and facet pairs in order. All or nothing: the first
    /// rejection leaves the current state untouched.
    pub fn apply_params<'a, I>(&mut self, params: I) -> CatalogResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut staged = self.state.clone();
        for (key, value) in params {
            if key == SEARCH_PARAM {
                staged.search = SearchTerm::new(value);
            } else {
                let slot = staged.slot(key)?;
                slot.1 = slot.0.parse(value)?;
            }
        }

        self.state = staged;
        self.recompute("params");
        Ok(())
    }

    /// The visible set: source order, possibly empty
    pub fn current_visible(&self) -> Vec<&E> {
        let source = self.catalog.as_slice();
        self.visible.iter().map(|&i| &source[i]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Whether any predicate is active
    pub fn is_filtered(&self) -> bool {
        !self.state.is_unconstrained()
    }

    pub fn declared_facets(&self) -> Vec<FacetDescriptor> {
        self.state.facets.iter().map(|(spec, _)| spec.descriptor()).collect()
    }

    /// Current control value of a facet (`all` when unconstrained)
    pub fn facet_value(&self, name: &str) -> Option<String> {
        self.state.criterion(name).map(Criterion::to_control_value)
    }

    pub fn state(&self) -> &FilterState<E> {
        &self.state
    }

    pub fn catalog(&self) -> &Arc<Catalog<E>> {
        &self.catalog
    }

    fn recompute(&mut self, cause: &str) {
        self.visible = compute_visible(self.catalog.as_slice(), &self.state);
        tracing::debug!(
            catalog = E::CATALOG,
            cause,
            search = self.state.search_term(),
            visible = self.visible.len(),
            total = self.catalog.len(),
            "visible set recomputed"
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
