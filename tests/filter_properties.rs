// Property checks for the visible-set computation over generated provider catalogs

use proptest::prelude::*;
use signal_catalog::{compute_visible, Catalog, FilterEngine, FilterState, Provider, RiskLevel};
use std::sync::Arc;

const TAGS: &[&str] = &["Forex", "Crypto", "CFDs", "Commodities", "Stocks"];
const NAMES: &[&str] = &["Alpha", "Crypto Wave", "Gold Desk", "Swing", "Scalper", "Pip Hunter"];
const TERMS: &[&str] = &["", "a", "crypto", "GOLD", "x", " ", "for"];
const RISKS: &[&str] = &["low", "medium", "high"];
const RANGES: &[&str] = &["0-100", "100-150", "150-9999"];

fn provider() -> impl Strategy<Value = Provider> {
    (
        0..NAMES.len(),
        proptest::sample::subsequence(TAGS.to_vec(), 0..=TAGS.len()),
        prop_oneof![Just(RiskLevel::Low), Just(RiskLevel::Medium), Just(RiskLevel::High)],
        0u32..300,
    )
        .prop_map(|(name, tags, risk, price)| Provider::new(NAMES[name], &tags, risk, price))
}

fn engine(providers: Vec<Provider>) -> FilterEngine<Provider> {
    FilterEngine::new(Arc::new(Catalog::new(providers).unwrap()))
}

fn ids(engine: &FilterEngine<Provider>) -> Vec<String> {
    engine.current_visible().iter().map(|p| p.id.clone()).collect()
}

proptest! {
    #[test]
    fn visible_is_an_ordered_subset(
        providers in proptest::collection::vec(provider(), 0..12),
        term in proptest::sample::select(TERMS),
        tag in proptest::sample::select(TAGS),
    ) {
        let mut engine = engine(providers);
        engine.set_search_term(term);
        engine.set_facet("signalType", tag).unwrap();

        let mut state = FilterState::new();
        let full = compute_visible(engine.catalog().as_slice(), &state);
        prop_assert_eq!(full.len(), engine.catalog().len());

        state = engine.state().clone();
        let visible = compute_visible(engine.catalog().as_slice(), &state);
        prop_assert!(visible.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(visible.iter().all(|&i| i < engine.catalog().len()));
        prop_assert_eq!(visible.len(), engine.visible_count());
    }

    #[test]
    fn search_is_idempotent(
        providers in proptest::collection::vec(provider(), 0..12),
        term in proptest::sample::select(TERMS),
    ) {
        let mut engine = engine(providers);
        engine.set_search_term(term);
        let once = ids(&engine);
        engine.set_search_term(term);
        prop_assert_eq!(once, ids(&engine));
    }

    #[test]
    fn adding_a_constraint_never_grows_the_set(
        providers in proptest::collection::vec(provider(), 0..12),
        term in proptest::sample::select(TERMS),
        risk in proptest::sample::select(RISKS),
        range in proptest::sample::select(RANGES),
    ) {
        let mut engine = engine(providers);
        engine.set_search_term(term);
        let before = ids(&engine);

        engine.set_facet("riskLevel", risk).unwrap();
        let narrowed = ids(&engine);
        prop_assert!(narrowed.iter().all(|id| before.contains(id)));

        engine.set_facet("priceRange", range).unwrap();
        prop_assert!(ids(&engine).iter().all(|id| narrowed.contains(id)));
    }

    #[test]
    fn facets_combine_as_intersection(
        providers in proptest::collection::vec(provider(), 0..12),
        tag in proptest::sample::select(TAGS),
        risk in proptest::sample::select(RISKS),
    ) {
        let mut engine = engine(providers);

        engine.set_facet("signalType", tag).unwrap();
        let by_tag = ids(&engine);
        engine.reset();

        engine.set_facet("riskLevel", risk).unwrap();
        let by_risk = ids(&engine);

        engine.set_facet("signalType", tag).unwrap();
        let both = ids(&engine);

        let expected: Vec<String> = by_tag.into_iter().filter(|id| by_risk.contains(id)).collect();
        prop_assert_eq!(both, expected);
    }

    #[test]
    fn sentinel_lifts_the_constraint(
        providers in proptest::collection::vec(provider(), 0..12),
        tag in proptest::sample::select(TAGS),
    ) {
        let mut engine = engine(providers);
        let all = ids(&engine);

        engine.set_facet("signalType", tag).unwrap();
        engine.set_facet("signalType", "ALL").unwrap();

        prop_assert_eq!(ids(&engine), all);
        prop_assert!(!engine.is_filtered());
    }
}
